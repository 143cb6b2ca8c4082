//! Unified diffs between a file and a tool's output.

use difference::{Changeset, Difference};

/// Unchanged lines shown around each change
const CONTEXT: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Op {
    Keep,
    Remove,
    Add,
}

impl Op {
    fn prefix(self) -> char {
        match self {
            Op::Keep => ' ',
            Op::Remove => '-',
            Op::Add => '+',
        }
    }
}

/// The changeset flattened to one entry per line, terminators stripped.
fn line_ops(changeset: &Changeset) -> Vec<(Op, &str)> {
    changeset
        .diffs
        .iter()
        .flat_map(|diff| {
            let (op, text) = match diff {
                Difference::Same(text) => (Op::Keep, text),
                Difference::Rem(text) => (Op::Remove, text),
                Difference::Add(text) => (Op::Add, text),
            };
            text.split('\n').map(move |line| (op, line.strip_suffix('\r').unwrap_or(line)))
        })
        .collect()
}

/// Start and length of a hunk side in `@@` notation.
fn hunk_range(start: usize, len: usize) -> String {
    match len {
        0 => format!("{start},0"),
        1 => (start + 1).to_string(),
        _ => format!("{},{len}", start + 1),
    }
}

/// Diff `original` against `modified` with labels `original` and `modified`.
///
/// Lines are compared with their terminators removed, so the result only
/// shows content changes; a changed final newline shows up as an empty line.
pub fn unified_diff(original: &str, modified: &str) -> String {
    let (old, new) = match (original.strip_suffix('\n'), modified.strip_suffix('\n')) {
        (Some(old), Some(new)) => (old, new),
        _ => (original, modified),
    };
    let changeset = Changeset::new(old, new, "\n");
    let ops = line_ops(&changeset);

    let mut groups: Vec<(usize, usize)> = Vec::new();
    for (i, _) in ops.iter().enumerate().filter(|(_, (op, _))| *op != Op::Keep) {
        match groups.last_mut() {
            Some((_, last)) if i - *last - 1 <= 2 * CONTEXT => *last = i,
            _ => groups.push((i, i)),
        }
    }

    let mut out = vec!["--- original".to_string(), "+++ modified".to_string()];
    for (first, last) in groups {
        let start = first.saturating_sub(CONTEXT);
        let end = (last + 1 + CONTEXT).min(ops.len());
        let count =
            |lines: &[(Op, &str)], skip: Op| lines.iter().filter(|(op, _)| *op != skip).count();
        let hunk = &ops[start..end];

        out.push(format!(
            "@@ -{} +{} @@",
            hunk_range(count(&ops[..start], Op::Add), count(hunk, Op::Add)),
            hunk_range(count(&ops[..start], Op::Remove), count(hunk, Op::Remove)),
        ));
        out.extend(hunk.iter().map(|(op, line)| format!("{}{line}", op.prefix())));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_change_with_context() {
        let diff = unified_diff("a\nb\nc\nd\ne\nf\ng\n", "a\nb\nc\nX\ne\nf\ng\n");
        assert_eq!(diff, "--- original\n+++ modified\n@@ -2,5 +2,5 @@\n b\n c\n-d\n+X\n e\n f");
    }

    #[test]
    fn test_distant_changes_get_separate_hunks() {
        let original = "1\n2\n3\n4\n5\n6\n7\n8\n9\n10\n";
        let modified = "one\n2\n3\n4\n5\n6\n7\n8\n9\nten\n";
        let diff = unified_diff(original, modified);
        let headers: Vec<&str> = diff.lines().filter(|line| line.starts_with("@@")).collect();
        assert_eq!(headers, vec!["@@ -1,3 +1,3 @@", "@@ -8,3 +8,3 @@"]);
    }

    #[test]
    fn test_insertion_into_empty_file() {
        let diff = unified_diff("", "x = 1\n");
        assert_eq!(diff, "--- original\n+++ modified\n@@ -0,0 +1,2 @@\n+x = 1\n+");
    }

    #[test]
    fn test_crlf_terminators_are_not_shown() {
        let diff = unified_diff("x=1\r\n", "x = 1\r\n");
        assert_eq!(diff, "--- original\n+++ modified\n@@ -1 +1 @@\n-x=1\n+x = 1");
    }
}
