use crate::config::SortOptions;
use crate::types::{ImportName, ImportStatement, StatementKind};
use std::cmp::Reverse;
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum MemberType {
    Constant,
    Class,
    Variable,
}

fn member_type(name: &str) -> MemberType {
    let mut chars = name.chars();
    if name.chars().count() > 1
        && name.chars().any(char::is_alphabetic)
        && !name.chars().any(char::is_lowercase)
    {
        MemberType::Constant
    } else if chars.next().is_some_and(char::is_uppercase) {
        MemberType::Class
    } else {
        MemberType::Variable
    }
}

type MemberKey = (Option<MemberType>, String, Option<String>);

fn member_key(member: &ImportName, options: &SortOptions) -> MemberKey {
    (
        options.order_by_type.then(|| member_type(&member.name)),
        options.normalize(&member.name).into_owned(),
        member.alias.as_deref().map(|alias| options.normalize(alias).into_owned()),
    )
}

type StatementKey = (
    bool,
    Reverse<usize>,
    Option<MemberType>,
    String,
    StatementKind,
    Option<String>,
    bool,
    Option<String>,
);

fn statement_key(statement: &ImportStatement, options: &SortOptions) -> StatementKey {
    (
        statement.is_relative(),
        Reverse(statement.level),
        options.order_by_type.then(|| member_type(&statement.module)),
        options.normalize(&statement.module).into_owned(),
        statement.kind,
        statement.alias.as_deref().map(|alias| options.normalize(alias).into_owned()),
        statement.wildcard,
        statement.names.first().map(|first| options.normalize(&first.name).into_owned()),
    )
}

/// Both statements import from the same place and can be written as one.
fn same_target(a: &ImportStatement, b: &ImportStatement) -> bool {
    a.kind == b.kind
        && a.level == b.level
        && a.module == b.module
        && match a.kind {
            StatementKind::Plain => a.alias == b.alias,
            StatementKind::From => a.wildcard == b.wildcard,
        }
}

fn absorb(into: &mut ImportStatement, other: ImportStatement) {
    into.names.extend(other.names);
    into.leading_comments.extend(other.leading_comments);
    into.trailing_comment = match (into.trailing_comment.take(), other.trailing_comment) {
        (Some(first), Some(second)) => Some(format!("{first} {second}")),
        (first, second) => first.or(second),
    };
    into.trailing_comma |= other.trailing_comma;
}

/// Merge, deduplicate and order the statements of one bucket.
///
/// Both sorts are stable, so entries whose keys compare equal keep their
/// input order.
pub fn sort_bucket(
    statements: Vec<ImportStatement>,
    options: &SortOptions,
) -> Vec<ImportStatement> {
    let mut merged: Vec<ImportStatement> = Vec::with_capacity(statements.len());
    for statement in statements {
        match merged.iter_mut().find(|existing| same_target(existing, &statement)) {
            Some(existing) => absorb(existing, statement),
            None => merged.push(statement),
        }
    }
    for statement in &mut merged {
        let mut seen = HashSet::new();
        statement.names.retain(|member| seen.insert(member.clone()));
        statement.names.sort_by_cached_key(|member| member_key(member, options));
    }
    merged.sort_by_cached_key(|statement| statement_key(statement, options));
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from(module: &str, level: usize, names: &[&str]) -> ImportStatement {
        let names = names.iter().map(|n| ImportName::new(*n, None)).collect();
        ImportStatement::from(module, level, names)
    }

    fn names(statement: &ImportStatement) -> Vec<&str> {
        statement.names.iter().map(|n| n.name.as_str()).collect()
    }

    fn rendered(statements: &[ImportStatement]) -> Vec<String> {
        statements
            .iter()
            .map(|s| match s.kind {
                StatementKind::Plain => format!("import {}", s.module),
                StatementKind::From => {
                    format!("from {} import {}", s.module_spec(), names(s).join(", "))
                }
            })
            .collect()
    }

    #[test]
    fn test_member_types() {
        assert_eq!(member_type("MAX_SIZE"), MemberType::Constant);
        assert_eq!(member_type("Z"), MemberType::Class);
        assert_eq!(member_type("Path"), MemberType::Class);
        assert_eq!(member_type("x"), MemberType::Variable);
        assert_eq!(member_type("_private"), MemberType::Variable);
    }

    #[test]
    fn test_members_by_type_then_name() {
        let sorted =
            sort_bucket(vec![from("m", 0, &["b", "CONST", "Alpha", "a"])], &SortOptions::default());
        assert_eq!(names(&sorted[0]), vec!["CONST", "Alpha", "a", "b"]);

        let flat = SortOptions { order_by_type: false, ..Default::default() };
        let sorted = sort_bucket(vec![from("m", 0, &["b", "CONST", "Alpha", "a"])], &flat);
        assert_eq!(names(&sorted[0]), vec!["Alpha", "CONST", "a", "b"]);
    }

    #[test]
    fn test_from_imports_merge() {
        let mut second = from("a", 0, &["b", "c"]);
        second.trailing_comma = true;
        let sorted = sort_bucket(vec![from("a", 0, &["c"]), second], &SortOptions::default());
        assert_eq!(sorted.len(), 1);
        assert_eq!(names(&sorted[0]), vec!["b", "c"]);
        assert!(sorted[0].trailing_comma);
    }

    #[test]
    fn test_repeated_members_of_one_statement_collapse() {
        let aliased = || ImportName::new("b", Some("c".to_string()));
        let statement =
            ImportStatement::from("a", 0, vec![aliased(), ImportName::new("b", None), aliased()]);
        let sorted = sort_bucket(vec![statement], &SortOptions::default());
        assert_eq!(sorted[0].names, vec![ImportName::new("b", None), aliased()]);
    }

    #[test]
    fn test_plain_imports_dedupe_by_alias() {
        let statements = vec![
            ImportStatement::plain("os", None),
            ImportStatement::plain("os", Some("o".to_string())),
            ImportStatement::plain("os", None),
        ];
        let sorted = sort_bucket(statements, &SortOptions::default());
        assert_eq!(sorted.len(), 2);
        assert_eq!(sorted[0].alias, None);
        assert_eq!(sorted[1].alias.as_deref(), Some("o"));
    }

    #[test]
    fn test_statement_order() {
        let statements = vec![
            from("", 1, &["x"]),
            from("", 2, &["y"]),
            ImportStatement::plain("b", None),
            from("a", 0, &["z"]),
            ImportStatement::plain("a", None),
        ];
        let sorted = sort_bucket(statements, &SortOptions::default());
        assert_eq!(
            rendered(&sorted),
            vec!["import a", "from a import z", "import b", "from .. import y", "from . import x"]
        );
    }

    #[test]
    fn test_case_insensitive_keeps_input_order() {
        let options =
            SortOptions { case_sensitive: false, order_by_type: false, ..Default::default() };
        let forward =
            vec![ImportStatement::plain("abc", None), ImportStatement::plain("Abc", None)];
        assert_eq!(rendered(&sort_bucket(forward, &options)), vec!["import abc", "import Abc"]);
        let backward =
            vec![ImportStatement::plain("Abc", None), ImportStatement::plain("abc", None)];
        assert_eq!(rendered(&sort_bucket(backward, &options)), vec!["import Abc", "import abc"]);

        let sensitive = SortOptions { order_by_type: false, ..Default::default() };
        let forward =
            vec![ImportStatement::plain("abc", None), ImportStatement::plain("Abc", None)];
        assert_eq!(rendered(&sort_bucket(forward, &sensitive)), vec!["import Abc", "import abc"]);
    }

    #[test]
    fn test_module_type_orders_statements_when_case_insensitive() {
        let statements = || {
            vec![
                ImportStatement::plain("alpha", None),
                ImportStatement::plain("Beta", None),
                ImportStatement::plain("GAMMA", None),
            ]
        };
        let by_type = SortOptions { case_sensitive: false, ..Default::default() };
        assert_eq!(
            rendered(&sort_bucket(statements(), &by_type)),
            vec!["import GAMMA", "import Beta", "import alpha"]
        );
        let flat = SortOptions {
            case_sensitive: false,
            order_by_type: false,
            ..Default::default()
        };
        assert_eq!(
            rendered(&sort_bucket(statements(), &flat)),
            vec!["import alpha", "import Beta", "import GAMMA"]
        );
    }
}
