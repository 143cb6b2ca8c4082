use crate::types::{ImportBlock, ImportName, ImportStatement, SortError, Trailer};
use log::{debug, trace};
use pytidy_core::ParsedModule;
use pytidy_core::syntax::{
    children, gap, is_comment, is_definition, is_import, last_row, leads_into_definition,
    line_after, line_start, next_line_start, suite_items,
};
use tree_sitter::Node;

/// An import block under construction
struct Run<'tree> {
    start: usize,
    leading: usize,
    indent: String,
    statements: Vec<ImportStatement>,
    /// Last import node of the run
    last: Node<'tree>,
    /// Index of the first statement produced by `last`
    head: usize,
    /// End of the last import line content, trailing comment included
    end: usize,
}

impl Run<'_> {
    fn finish(self, end: usize, trailer: Trailer) -> ImportBlock {
        let Run { start, leading, indent, statements, .. } = self;
        ImportBlock { start, leading, end, indent, statements, trailer }
    }
}

/// Find every import block of the module, in source order.
pub fn extract_blocks(parsed: &ParsedModule<'_>) -> Result<Vec<ImportBlock>, SortError> {
    let mut blocks = Vec::new();
    let mut stack = vec![parsed.root()];
    while let Some(node) = stack.pop() {
        if matches!(node.kind(), "module" | "block") {
            extract_suite(parsed, node, &mut blocks)?;
        }
        if !is_import(node) {
            stack.extend(children(node));
        }
    }
    blocks.sort_by_key(|block| block.start);
    debug!("Extracted {} import block(s)", blocks.len());
    Ok(blocks)
}

fn extract_suite<'tree>(
    parsed: &ParsedModule<'_>,
    suite: Node<'tree>,
    blocks: &mut Vec<ImportBlock>,
) -> Result<(), SortError> {
    let source = parsed.source();
    let items = suite_items(suite);
    let module_level = suite.kind() == "module";

    let mut run: Option<Run<'tree>> = None;
    // Own-line comments seen since the last statement
    let mut pending: Vec<usize> = Vec::new();
    let mut prev: Option<Node<'tree>> = None;
    // Last statement outside a block, with the end of its line content
    let mut before: Option<(Node<'tree>, usize)> = None;

    for (index, &item) in items.iter().enumerate() {
        if is_comment(item) {
            let trailing =
                prev.is_some_and(|p| !is_comment(p) && item.start_position().row == last_row(p));
            if !trailing {
                if !(module_level && is_file_header(parsed, &items, index)) {
                    pending.push(index);
                }
            } else if let Some(run) = run.as_mut()
                && Some(run.last) == prev
            {
                run.statements[run.head].trailing_comment = Some(parsed.text(item).to_string());
                run.end = item.end_byte();
            } else if let Some((node, end)) = before.as_mut()
                && Some(*node) == prev
            {
                *end = item.end_byte();
            }
            prev = Some(item);
            continue;
        }

        if is_standalone_import(source, &items, index) {
            let mut statements = parse_import(parsed, item)?;
            let comments: Vec<usize> = match &run {
                Some(_) => pending.clone(),
                None => directly_above(&items, &pending, item),
            };
            statements[0].leading_comments =
                comments.iter().map(|&i| parsed.text(items[i]).to_string()).collect();

            let run = run.get_or_insert_with(|| {
                let indent =
                    source[line_start(source, item.start_byte())..item.start_byte()].to_string();
                // Loose comments between the previous statement and the block keep their spacing
                let (start, leading) = match before {
                    Some((node, end)) if !is_import(node) && comments.len() == pending.len() => {
                        let blank = if module_level && is_definition(node) { 2 } else { 1 };
                        (line_after(source, end), blank)
                    }
                    _ => {
                        let first = comments.first().map_or(item, |&i| items[i]);
                        (line_start(source, first.start_byte()), 0)
                    }
                };
                trace!("Import block starts at byte {}", start);
                Run {
                    start,
                    leading,
                    indent,
                    statements: Vec::new(),
                    last: item,
                    head: 0,
                    end: item.end_byte(),
                }
            });
            run.head = run.statements.len();
            run.statements.extend(statements);
            run.last = item;
            run.end = item.end_byte();
        } else {
            if let Some(done) = run.take() {
                // Comments between the block and the barrier stay where they are
                let next = pending.first().copied().unwrap_or(index);
                let definition_follows =
                    is_definition(items[next]) || leads_into_definition(&items, next);
                let blank = if module_level && definition_follows { 2 } else { 1 };
                let end = line_start(source, items[next].start_byte());
                blocks.push(done.finish(end, Trailer::Blank(blank)));
            }
            before = Some((item, item.end_byte()));
        }
        pending.clear();
        prev = Some(item);
    }

    if let Some(done) = run {
        let end = next_line_start(source, done.end);
        blocks.push(done.finish(end, Trailer::Keep));
    }
    Ok(())
}

/// A shebang on the first line, or an encoding declaration on one of the first
/// two, ahead of any statement. These never move.
fn is_file_header(parsed: &ParsedModule<'_>, items: &[Node<'_>], index: usize) -> bool {
    let node = items[index];
    let text = parsed.text(node);
    let row = node.start_position().row;
    if !items[..index].iter().all(|item| is_comment(*item)) {
        return false;
    }
    (row == 0 && text.starts_with("#!")) || (row <= 1 && is_coding_cookie(text))
}

/// `# -*- coding: utf-8 -*-`, `# vim: set fileencoding=utf-8 :` and the like.
fn is_coding_cookie(text: &str) -> bool {
    text.match_indices("coding").any(|(i, _)| text[i + "coding".len()..].starts_with([':', '=']))
}

/// The trailing part of `pending` forming an unbroken comment run ending on
/// the line above `node`.
fn directly_above(items: &[Node<'_>], pending: &[usize], node: Node<'_>) -> Vec<usize> {
    let mut attached = Vec::new();
    let mut below = node;
    for &index in pending.iter().rev() {
        if gap(items[index], below) > 0 {
            break;
        }
        attached.push(index);
        below = items[index];
    }
    attached.reverse();
    attached
}

/// An import that owns its lines and can be moved.
fn is_standalone_import(source: &str, items: &[Node<'_>], index: usize) -> bool {
    let node = items[index];
    if !is_import(node) {
        return false;
    }
    let start = node.start_byte();
    if !source[line_start(source, start)..start].chars().all(|c| c == ' ' || c == '\t') {
        return false;
    }
    if let Some(next) = items.get(index + 1)
        && !is_comment(*next)
        && next.start_position().row <= last_row(node)
    {
        return false;
    }
    !has_comment(node)
}

fn has_comment(node: Node<'_>) -> bool {
    children(node).into_iter().any(|child| is_comment(child) || has_comment(child))
}

fn field_nodes<'tree>(node: Node<'tree>, field: &str) -> Vec<Node<'tree>> {
    let mut cursor = node.walk();
    node.children_by_field_name(field, &mut cursor).collect()
}

/// Dotted names may be written with inner whitespace or continuations
fn compact(text: &str) -> String {
    text.split(|c: char| c.is_whitespace() || c == '\\').collect()
}

fn malformed(node: Node<'_>, reason: &str) -> SortError {
    SortError::Malformed { offset: node.start_byte(), reason: reason.to_string() }
}

fn name_and_alias(
    parsed: &ParsedModule<'_>,
    node: Node<'_>,
) -> Result<(String, Option<String>), SortError> {
    if node.kind() != "aliased_import" {
        return Ok((compact(parsed.text(node)), None));
    }
    let name =
        node.child_by_field_name("name").ok_or_else(|| malformed(node, "alias without a name"))?;
    let alias = node.child_by_field_name("alias").map(|alias| parsed.text(alias).to_string());
    Ok((compact(parsed.text(name)), alias))
}

fn parse_import(
    parsed: &ParsedModule<'_>,
    node: Node<'_>,
) -> Result<Vec<ImportStatement>, SortError> {
    let span = node.byte_range();

    if node.kind() == "import_statement" {
        let mut statements = Vec::new();
        for name in field_nodes(node, "name") {
            let (module, alias) = name_and_alias(parsed, name)?;
            statements.push(ImportStatement {
                span: span.clone(),
                ..ImportStatement::plain(module, alias)
            });
        }
        if statements.is_empty() {
            return Err(malformed(node, "import without a module"));
        }
        return Ok(statements);
    }

    let (module, level) = if node.kind() == "future_import_statement" {
        (crate::constants::FUTURE_MODULE.to_string(), 0)
    } else {
        let target = node
            .child_by_field_name("module_name")
            .ok_or_else(|| malformed(node, "missing module name"))?;
        match target.kind() {
            "dotted_name" => (compact(parsed.text(target)), 0),
            "relative_import" => {
                let mut module = String::new();
                let mut level = 0;
                for part in children(target) {
                    match part.kind() {
                        "import_prefix" => level = parsed.text(part).matches('.').count(),
                        "dotted_name" => module = compact(parsed.text(part)),
                        _ => {}
                    }
                }
                (module, level)
            }
            other => return Err(malformed(node, &format!("unexpected module node {other}"))),
        }
    };

    let names = field_nodes(node, "name")
        .into_iter()
        .map(|name| name_and_alias(parsed, name).map(|(name, alias)| ImportName::new(name, alias)))
        .collect::<Result<Vec<_>, _>>()?;
    let kids = children(node);
    let wildcard = kids.iter().any(|kid| kid.kind() == "wildcard_import");
    if names.is_empty() && !wildcard {
        return Err(malformed(node, "from-import without names"));
    }
    let trailing_comma = kids.windows(2).any(|pair| pair[0].kind() == "," && pair[1].kind() == ")");

    let statement = ImportStatement {
        wildcard,
        trailing_comma,
        span,
        ..ImportStatement::from(module, level, names)
    };
    Ok(vec![statement])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StatementKind;
    use pytidy_core::parse_module;

    fn extract(source: &str) -> Vec<ImportBlock> {
        let parsed = parse_module(source).unwrap();
        extract_blocks(&parsed).unwrap()
    }

    #[test]
    fn test_run_followed_by_statement() {
        let source = "import os\nimport sys\n\nx = 1\n";
        let blocks = extract(source);
        assert_eq!(blocks.len(), 1);
        let block = &blocks[0];
        assert_eq!(block.start, 0);
        assert_eq!(block.end, source.find("x = 1").unwrap());
        assert_eq!(block.trailer, Trailer::Blank(1));
        assert_eq!(block.indent, "");
        let modules: Vec<&str> = block.statements.iter().map(|s| s.module.as_str()).collect();
        assert_eq!(modules, vec!["os", "sys"]);
    }

    #[test]
    fn test_multi_module_import_is_split() {
        let source = "import os, sys as system\n";
        let blocks = extract(source);
        let statements = &blocks[0].statements;
        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].module, "os");
        assert_eq!(statements[1].alias.as_deref(), Some("system"));
        assert_eq!(statements[0].span, statements[1].span);
        assert_eq!(blocks[0].trailer, Trailer::Keep);
        assert_eq!(blocks[0].end, source.len());
    }

    #[test]
    fn test_relative_from_import() {
        let blocks = extract("from ..pkg.mod import (b as c, a,)\n");
        let stmt = &blocks[0].statements[0];
        assert_eq!(stmt.kind, StatementKind::From);
        assert_eq!(stmt.level, 2);
        assert_eq!(stmt.module, "pkg.mod");
        assert_eq!(
            stmt.names,
            vec![ImportName::new("b", Some("c".to_string())), ImportName::new("a", None)]
        );
        assert!(stmt.trailing_comma);
        assert!(!stmt.wildcard);
    }

    #[test]
    fn test_pure_relative_and_wildcard() {
        let blocks = extract("from . import x\nfrom pkg import *\n");
        let statements = &blocks[0].statements;
        assert_eq!((statements[0].level, statements[0].module.as_str()), (1, ""));
        assert!(statements[1].wildcard);
        assert!(statements[1].names.is_empty());
    }

    #[test]
    fn test_future_import() {
        let blocks = extract("from __future__ import annotations\n");
        assert_eq!(blocks[0].statements[0].module, "__future__");
        assert_eq!(blocks[0].statements[0].names, vec![ImportName::new("annotations", None)]);
    }

    #[test]
    fn test_shared_line_is_a_barrier() {
        let blocks = extract("import os; x = 1\nimport sys\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].statements.len(), 1);
        assert_eq!(blocks[0].statements[0].module, "sys");
    }

    #[test]
    fn test_interior_comment_is_a_barrier() {
        assert!(extract("from a import (\n    b,  # why\n    c,\n)\n").is_empty());
    }

    #[test]
    fn test_comment_attachment() {
        let source = "# header\n\n# about b\nimport b  # trailing\n# about a\nimport a\n";
        let blocks = extract(source);
        let block = &blocks[0];
        assert_eq!(block.start, source.find("# about b").unwrap());
        assert_eq!(block.statements[0].leading_comments, vec!["# about b"]);
        assert_eq!(block.statements[0].trailing_comment.as_deref(), Some("# trailing"));
        assert_eq!(block.statements[1].leading_comments, vec!["# about a"]);
        assert_eq!(block.end, source.len());
    }

    #[test]
    fn test_nested_block() {
        let source = "def f():\n    import b\n    import a\n    return a\n";
        let blocks = extract(source);
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].indent, "    ");
        assert_eq!(blocks[0].start, source.find("    import b").unwrap());
        assert_eq!(blocks[0].trailer, Trailer::Blank(1));
    }

    #[test]
    fn test_definition_after_block_wants_two_lines() {
        let source = "import os\n# note\ndef f():\n    pass\n";
        let blocks = extract(source);
        assert_eq!(blocks[0].trailer, Trailer::Blank(2));
        assert_eq!(blocks[0].end, source.find("# note").unwrap());
    }

    #[test]
    fn test_file_header_stays_in_place() {
        let source = "#!/usr/bin/env python\n# -*- coding: utf-8 -*-\nimport os\n";
        let blocks = extract(source);
        assert_eq!(blocks[0].start, source.find("import os").unwrap());
        assert!(blocks[0].statements[0].leading_comments.is_empty());

        let source = "# vim: set fileencoding=latin-1 :\n# about os\nimport os\n";
        let blocks = extract(source);
        assert_eq!(blocks[0].start, source.find("# about os").unwrap());
        assert_eq!(blocks[0].statements[0].leading_comments, vec!["# about os"]);
    }

    #[test]
    fn test_coding_cookie_forms() {
        assert!(is_coding_cookie("# -*- coding: utf-8 -*-"));
        assert!(is_coding_cookie("# vim: set fileencoding=utf-8 :"));
        assert!(!is_coding_cookie("# encoding utf-8"));
        assert!(!is_coding_cookie("# decoding helpers"));
    }

    #[test]
    fn test_block_after_statement_takes_over_the_gap() {
        let source = "x = 1  # note\n\n\nimport os\n";
        let blocks = extract(source);
        assert_eq!(blocks[0].start, source.find('\n').unwrap() + 1);
        assert_eq!(blocks[0].leading, 1);

        assert_eq!(extract("class A:\n    pass\nimport os\n")[0].leading, 2);

        let source = "x = 1\n# loose\n\nimport os\n";
        let blocks = extract(source);
        assert_eq!((blocks[0].start, blocks[0].leading), (source.find("import os").unwrap(), 0));
    }
}
