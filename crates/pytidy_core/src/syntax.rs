//! Parsing Python source with tree-sitter.
//!
//! The grammar recovers from errors and still accepts the Python 2 `print` and
//! `exec` statements, so [`parse_module`] walks the whole tree and turns the
//! first `ERROR` node, `MISSING` node or legacy statement into a
//! [`SyntaxError`]. Everything downstream can assume a clean Python 3 tree.

use log::{debug, trace};
use thiserror::Error;
use tree_sitter::{Node, Parser, Tree};

/// Statements the grammar keeps for Python 2 compatibility
const LEGACY_STATEMENTS: &[&str] = &["print_statement", "exec_statement"];

const IMPORT_STATEMENTS: &[&str] =
    &["import_statement", "import_from_statement", "future_import_statement"];

const DEFINITIONS: &[&str] = &["function_definition", "class_definition", "decorated_definition"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("failed to load the Python grammar: {0}")]
    Grammar(String),

    #[error("parser produced no syntax tree")]
    NoTree,

    #[error("invalid syntax at line {line}, column {column}: {snippet}")]
    Invalid { line: usize, column: usize, snippet: String },

    #[error("expected {expected} at line {line}, column {column}")]
    Missing { expected: String, line: usize, column: usize },

    #[error("Python 2 {statement} at line {line} is not valid Python 3")]
    Legacy { statement: String, line: usize },
}

/// A syntax tree together with the source it was parsed from.
pub struct ParsedModule<'src> {
    source: &'src str,
    tree: Tree,
}

impl<'src> ParsedModule<'src> {
    pub fn source(&self) -> &'src str {
        self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    pub fn text(&self, node: Node<'_>) -> &'src str {
        &self.source[node.byte_range()]
    }
}

/// Parse `source` as a Python 3 module.
///
/// A fresh parser is created for every call; nothing is shared between
/// invocations.
pub fn parse_module(source: &str) -> Result<ParsedModule<'_>, SyntaxError> {
    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| SyntaxError::Grammar(e.to_string()))?;

    trace!("Parsing {} bytes of Python source", source.len());
    let tree = parser.parse(source, None).ok_or(SyntaxError::NoTree)?;

    if let Some(err) = first_error(tree.root_node(), source) {
        debug!("Rejecting source: {}", err);
        return Err(err);
    }
    Ok(ParsedModule { source, tree })
}

fn first_error(root: Node<'_>, source: &str) -> Option<SyntaxError> {
    // Pre-order walk so the reported error is the first one in the document
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let pos = node.start_position();
        if node.is_missing() {
            return Some(SyntaxError::Missing {
                expected: node.kind().to_string(),
                line: pos.row + 1,
                column: pos.column + 1,
            });
        }
        if node.is_error() {
            let snippet: String = source[node.byte_range()]
                .lines()
                .next()
                .unwrap_or_default()
                .chars()
                .take(40)
                .collect();
            return Some(SyntaxError::Invalid {
                line: pos.row + 1,
                column: pos.column + 1,
                snippet,
            });
        }
        if LEGACY_STATEMENTS.contains(&node.kind()) {
            return Some(SyntaxError::Legacy {
                statement: node.kind().replace('_', " "),
                line: pos.row + 1,
            });
        }
        let mut kids = children(node);
        kids.reverse();
        stack.extend(kids);
    }
    None
}

pub fn children<'tree>(node: Node<'tree>) -> Vec<Node<'tree>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

/// Statements and comments of a `module` or `block`, in source order.
pub fn suite_items<'tree>(suite: Node<'tree>) -> Vec<Node<'tree>> {
    children(suite)
        .into_iter()
        .filter(|n| n.is_named() && n.kind() != "line_continuation")
        .collect()
}

pub fn is_import(node: Node<'_>) -> bool {
    IMPORT_STATEMENTS.contains(&node.kind())
}

pub fn is_definition(node: Node<'_>) -> bool {
    DEFINITIONS.contains(&node.kind())
}

pub fn is_comment(node: Node<'_>) -> bool {
    node.kind() == "comment"
}

/// A bare string expression statement.
pub fn is_docstring(node: Node<'_>) -> bool {
    if node.kind() != "expression_statement" {
        return false;
    }
    let mut cursor = node.walk();
    let named: Vec<Node<'_>> = node.named_children(&mut cursor).collect();
    matches!(named.as_slice(), [only] if only.kind() == "string")
}

/// Row holding the last character of `node`.
pub fn last_row(node: Node<'_>) -> usize {
    let end = node.end_position();
    if end.column == 0 && end.row > node.start_position().row { end.row - 1 } else { end.row }
}

/// Number of source lines strictly between `prev` and `next`.
pub fn gap(prev: Node<'_>, next: Node<'_>) -> usize {
    next.start_position().row.saturating_sub(last_row(prev) + 1)
}

/// The line terminator used by `source`: `"\r\n"` when its first line ends with one.
pub fn line_ending(source: &str) -> &'static str {
    match source.find('\n') {
        Some(i) if source[..i].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

/// Byte offset of the start of the line containing `offset`.
pub fn line_start(source: &str, offset: usize) -> usize {
    source[..offset].rfind('\n').map_or(0, |i| i + 1)
}

/// Byte offset just past the line terminator of the line containing `offset`.
pub fn next_line_start(source: &str, offset: usize) -> usize {
    source[offset..].find('\n').map_or(source.len(), |i| offset + i + 1)
}

/// Start of the line after a node ending at `end`, which may already sit past
/// the terminator.
pub fn line_after(source: &str, end: usize) -> usize {
    if source[..end].ends_with('\n') { end } else { next_line_start(source, end) }
}

/// Whether `items[index]` starts a run of adjacent comments that ends directly
/// on a function or class definition.
pub fn leads_into_definition(items: &[Node<'_>], index: usize) -> bool {
    leads_into(items, index, is_definition)
}

/// Whether `items[index]` starts a run of adjacent comments that ends directly
/// on a node accepted by `target`.
pub fn leads_into(items: &[Node<'_>], index: usize, target: fn(Node<'_>) -> bool) -> bool {
    let mut current = match items.get(index) {
        Some(node) if is_comment(*node) => *node,
        _ => return false,
    };
    for next in &items[index + 1..] {
        if gap(current, *next) > 0 || next.start_position().row == last_row(current) {
            return false;
        }
        if !is_comment(*next) {
            return target(*next);
        }
        current = *next;
    }
    false
}
