//! Import sorting for Python source.
//!
//! Import blocks are extracted from the syntax tree, each statement is
//! classified into a [`Bucket`], buckets are sorted independently and the
//! blocks are written back in place. Code outside import blocks is never
//! touched.

mod classifier;
mod config;
mod constants;
mod extractor;
mod renderer;
mod sorter;
mod types;

pub use classifier::classify;
pub use config::SortOptions;
pub use constants::{DUNDER_MODULES, STDLIB_MODULES};
pub use extractor::extract_blocks;
pub use renderer::{Section, SortedBlock, render};
pub use sorter::sort_bucket;
pub use types::{
    Bucket, ImportBlock, ImportName, ImportStatement, SortError, StatementKind, Trailer,
};

use log::{debug, trace};
use pytidy_core::parse_module;
use pytidy_core::syntax::line_ending;
use std::collections::BTreeMap;
use std::path::Path;

/// Sort every import block of `source`.
///
/// `root`, when given, enables first-party detection from the project layout.
/// The result is re-parsed before it is returned.
pub fn sort_imports_source(
    source: &str,
    options: &SortOptions,
    root: Option<&Path>,
) -> Result<String, SortError> {
    let parsed = parse_module(source)?;
    let blocks = extract_blocks(&parsed)?;
    if blocks.is_empty() {
        debug!("No import blocks found");
        return Ok(source.to_string());
    }

    let sorted: Vec<SortedBlock> =
        blocks.into_iter().map(|block| sort_block(block, options, root)).collect();
    let output = render(source, &sorted, options, line_ending(source));

    parse_module(&output).map_err(SortError::Print)?;
    Ok(output)
}

fn sort_block(block: ImportBlock, options: &SortOptions, root: Option<&Path>) -> SortedBlock {
    let ImportBlock { start, leading, end, indent, statements, trailer } = block;

    let mut groups: BTreeMap<Bucket, Vec<ImportStatement>> = BTreeMap::new();
    for statement in statements {
        groups.entry(classify(&statement, options, root)).or_default().push(statement);
    }
    let sections: Vec<Section> = groups
        .into_iter()
        .map(|(bucket, statements)| {
            let statements = sort_bucket(statements, options);
            trace!("{:?}: {} statement(s)", bucket, statements.len());
            Section { bucket, statements }
        })
        .collect();

    SortedBlock { start, leading, end, indent, trailer, sections }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const CLASSIFY_INPUT: &str = "import sys, CUSTOMMOD\nfrom firstparty import a, c, b\n\
                                  from sysmod import Z, x\nimport __strict__\nimport somecustom\n\
                                  import __static__\nimport __future__\n";

    fn known(first: &[&str], third: &[&str]) -> SortOptions {
        SortOptions {
            known_first_party: first.iter().map(|s| s.to_string()).collect(),
            known_third_party: third.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    fn sort(source: &str) -> String {
        sort_imports_source(source, &SortOptions::default(), None).unwrap()
    }

    #[test]
    fn test_classification_scenario() {
        let options = known(&["firstparty"], &["sysmod"]);
        let out = sort_imports_source(CLASSIFY_INPUT, &options, None).unwrap();
        assert_eq!(
            out,
            "import __future__\n\nimport __static__\nimport __strict__\n\nimport sys\n\n\
             import CUSTOMMOD\nimport somecustom\n\nfrom firstparty import a, b, c\n\n\
             from sysmod import Z, x\n"
        );
    }

    #[test]
    fn test_without_known_third_party_sysmod_joins_default_bucket() {
        let with_sysmod = known(&["firstparty"], &["sysmod"]);
        let separated = sort_imports_source(CLASSIFY_INPUT, &with_sysmod, None).unwrap();
        let without_sysmod = known(&["firstparty"], &[]);
        let out = sort_imports_source(CLASSIFY_INPUT, &without_sysmod, None).unwrap();
        assert_ne!(out, separated);
        assert!(out.contains("import CUSTOMMOD\nimport somecustom\nfrom sysmod import Z, x\n"));
        assert!(out.ends_with("\n\nfrom firstparty import a, b, c\n"));
    }

    #[test]
    fn test_sorting_is_idempotent() {
        let options = known(&["firstparty"], &["sysmod"]);
        let once = sort_imports_source(CLASSIFY_INPUT, &options, None).unwrap();
        let twice = sort_imports_source(&once, &options, None).unwrap();
        assert_eq!(once, twice);

        let wrapped_options = SortOptions { line_width: 20, ..Default::default() };
        let source = "from package import beta, alpha\n";
        let once = sort_imports_source(source, &wrapped_options, None).unwrap();
        assert_eq!(once, "from package import (\n    alpha,\n    beta,\n)\n");
        assert_eq!(sort_imports_source(&once, &wrapped_options, None).unwrap(), once);
    }

    #[test]
    fn test_non_import_lines_pass_through() {
        let source = "\"\"\"Doc.\"\"\"\nimport sys\nimport os\nx = 1\ny = 2\n";
        assert_eq!(sort(source), "\"\"\"Doc.\"\"\"\n\nimport os\nimport sys\n\nx = 1\ny = 2\n");
    }

    #[test]
    fn test_block_after_code_is_separated() {
        assert_eq!(sort("x = 1\n\n\n\nimport b\nimport a\n"), "x = 1\n\nimport a\nimport b\n");
        assert_eq!(sort("x = 1  # note\nimport os\n"), "x = 1  # note\n\nimport os\n");
        assert_eq!(
            sort("def f():\n    pass\nimport b\nimport a\n"),
            "def f():\n    pass\n\n\nimport a\nimport b\n"
        );
        assert_eq!(
            sort("def f():\n    x = 1\n    # about os\n    import os\n"),
            "def f():\n    x = 1\n\n    # about os\n    import os\n"
        );

        let loose = "x = 1\n# loose\n\nimport b\nimport a\n";
        assert_eq!(sort(loose), "x = 1\n# loose\n\nimport a\nimport b\n");
    }

    #[test]
    fn test_shebang_stays_first() {
        let source = "#!/usr/bin/env python\nimport sys\nimport os\n";
        assert_eq!(sort(source), "#!/usr/bin/env python\nimport os\nimport sys\n");
    }

    #[test]
    fn test_coding_cookie_stays_first() {
        let source = "# -*- coding: utf-8 -*-\nimport sys\nimport os\n";
        assert_eq!(sort(source), "# -*- coding: utf-8 -*-\nimport os\nimport sys\n");
    }

    #[test]
    fn test_shebang_and_coding_cookie_stay_above_attached_comments() {
        let source =
            "#!/usr/bin/env python\n# -*- coding: utf-8 -*-\n# about sys\nimport sys\nimport os\n";
        assert_eq!(
            sort(source),
            "#!/usr/bin/env python\n# -*- coding: utf-8 -*-\nimport os\n# about sys\nimport sys\n"
        );
    }

    #[test]
    fn test_cookie_after_a_statement_is_an_ordinary_comment() {
        assert_eq!(
            sort("import b\n# coding: note\nimport a\n"),
            "# coding: note\nimport a\nimport b\n"
        );
    }

    #[test]
    fn test_two_blank_lines_before_definition() {
        let source = "import sys\nimport os\ndef f():\n    pass\n";
        assert_eq!(sort(source), "import os\nimport sys\n\n\ndef f():\n    pass\n");
    }

    #[test]
    fn test_nested_block_is_sorted_in_place() {
        let source = "if True:\n    import sys\n    import os\n    x = 1\n";
        assert_eq!(sort(source), "if True:\n    import os\n    import sys\n\n    x = 1\n");
    }

    #[test]
    fn test_comments_move_with_statements() {
        let source = "import sys  # system\n# operating\nimport os\n";
        assert_eq!(sort(source), "# operating\nimport os\nimport sys  # system\n");
    }

    #[test]
    fn test_separate_blocks_sort_independently() {
        let source = "import sys\nimport os\n\nprint(os)\n\nimport json\nimport abc\n";
        assert_eq!(sort(source), "import os\nimport sys\n\nprint(os)\n\nimport abc\nimport json\n");
    }

    #[test]
    fn test_duplicate_members_are_written_once() {
        assert_eq!(sort("from a import b as c, b as c\n"), "from a import b as c\n");
    }

    #[test]
    fn test_case_insensitive_module_order_follows_type() {
        let source = "import alpha, Beta, GAMMA\n";
        let by_type = SortOptions { case_sensitive: false, ..Default::default() };
        let out = sort_imports_source(source, &by_type, None).unwrap();
        assert_eq!(out, "import GAMMA\nimport Beta\nimport alpha\n");
        let flat = SortOptions { order_by_type: false, ..by_type };
        let out = sort_imports_source(source, &flat, None).unwrap();
        assert_eq!(out, "import alpha\nimport Beta\nimport GAMMA\n");
    }

    #[test]
    fn test_crlf_is_preserved() {
        let source = "import sys\r\nimport os\r\n";
        assert_eq!(sort(source), "import os\r\nimport sys\r\n");
    }

    #[test]
    fn test_source_without_imports_is_unchanged() {
        let source = "x = 1\n\n\nprint(x)\n";
        assert_eq!(sort(source), source);
        assert_eq!(sort(""), "");
    }

    #[test]
    fn test_root_detection() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("myapp")).unwrap();
        let source = "import myapp\nimport requests\nimport os\n";
        let out = sort_imports_source(source, &SortOptions::default(), Some(dir.path())).unwrap();
        assert_eq!(out, "import os\n\nimport requests\n\nimport myapp\n");
    }

    #[test]
    fn test_python2_source_is_a_parse_error() {
        let source = "print \"hello world!\"\n";
        let err = sort_imports_source(source, &SortOptions::default(), None).unwrap_err();
        assert!(matches!(err, SortError::Parse(_)), "got {err:?}");
    }
}
