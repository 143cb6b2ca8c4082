use crate::error::LayoutError;
use crate::line::layout_line;
use crate::tokens::{needs_verbatim, normalize_comment, tokenize};
use log::trace;
use pytidy_core::syntax::{
    children, gap, is_comment, is_definition, is_docstring, is_import, last_row, leads_into,
    leads_into_definition, suite_items,
};
use pytidy_core::{INDENT_WIDTH, ParsedModule};
use tree_sitter::Node;

/// Continuations of a compound statement, written at its own depth
const CLAUSES: &[&str] = &[
    "elif_clause",
    "else_clause",
    "except_clause",
    "except_group_clause",
    "finally_clause",
    "case_clause",
];

/// Writes suites statement by statement into physical lines.
pub(crate) struct Writer<'a, 'src> {
    parsed: &'a ParsedModule<'src>,
    width: usize,
    lines: Vec<String>,
}

impl<'a, 'src> Writer<'a, 'src> {
    pub(crate) fn new(parsed: &'a ParsedModule<'src>, width: usize) -> Self {
        Self { parsed, width, lines: Vec::new() }
    }

    pub(crate) fn finish(self) -> Vec<String> {
        self.lines
    }

    pub(crate) fn suite(&mut self, suite: Node<'_>, depth: usize) -> Result<(), LayoutError> {
        let items = suite_items(suite);
        let module_level = suite.kind() == "module";
        let mut prev: Option<usize> = None;
        let mut i = 0;
        while i < items.len() {
            let index = i;
            let item = items[index];
            if let Some(before) = prev {
                let blanks = blank_lines(&items, before, index, module_level);
                self.lines.extend(std::iter::repeat_n(String::new(), blanks));
            }
            self.item(item, depth)?;

            if let Some(&next) = items.get(index + 1)
                && is_comment(next)
                && !is_comment(item)
                && next.start_position().row == last_row(item)
            {
                self.append_comment(next);
                i += 1;
            }
            prev = Some(index);
            i += 1;
        }
        Ok(())
    }

    fn item(&mut self, node: Node<'_>, depth: usize) -> Result<(), LayoutError> {
        if is_comment(node) {
            self.comment(node, depth);
            return Ok(());
        }
        if node.kind() == "decorated_definition" {
            for child in children(node) {
                match child.kind() {
                    "decorator" => self.logical(&[child], depth)?,
                    "comment" => self.comment(child, depth),
                    _ => self.compound(child, depth)?,
                }
            }
            return Ok(());
        }
        if children(node).iter().any(|child| child.kind() == "block") {
            return self.compound(node, depth);
        }
        self.logical(&[node], depth)
    }

    /// A header line, its body and any clauses.
    fn compound(&mut self, node: Node<'_>, depth: usize) -> Result<(), LayoutError> {
        let mut header: Vec<Node<'_>> = Vec::new();
        let mut header_comment = None;
        let mut body_comments = Vec::new();
        let mut written = false;

        for child in children(node) {
            if child.kind() == "block" {
                self.logical(&header, depth)?;
                if let Some(comment) = header_comment.take() {
                    self.append_comment(comment);
                }
                for comment in body_comments.drain(..) {
                    self.comment(comment, depth + 1);
                }
                self.suite(child, depth + 1)?;
                written = true;
            } else if CLAUSES.contains(&child.kind()) {
                self.compound(child, depth)?;
            } else if is_comment(child) {
                let row = child.start_position().row;
                if written {
                    self.comment(child, depth);
                } else if header_comment.is_none()
                    && body_comments.is_empty()
                    && header.last().is_some_and(|last| last_row(*last) == row)
                {
                    header_comment = Some(child);
                } else {
                    body_comments.push(child);
                }
            } else if written {
                self.logical(&[child], depth)?;
            } else {
                header.push(child);
            }
        }
        Ok(())
    }

    /// One logical line made of sibling `nodes`.
    fn logical(&mut self, nodes: &[Node<'_>], depth: usize) -> Result<(), LayoutError> {
        let (Some(first), Some(last)) = (nodes.first(), nodes.last()) else {
            return Ok(());
        };
        if nodes.iter().any(|node| needs_verbatim(*node)) {
            trace!("Keeping line {} verbatim", first.start_position().row + 1);
            let text = &self.parsed.source()[first.start_byte()..last.end_byte()];
            self.lines.push(format!("{}{}", indent(depth), text.trim_end()));
            return Ok(());
        }
        let tokens = tokenize(self.parsed, nodes);
        layout_line(&tokens, depth, self.width, first.start_position().row + 1, &mut self.lines)
    }

    fn comment(&mut self, node: Node<'_>, depth: usize) {
        self.lines.push(format!("{}{}", indent(depth), normalize_comment(self.parsed.text(node))));
    }

    fn append_comment(&mut self, node: Node<'_>) {
        let comment = normalize_comment(self.parsed.text(node));
        match self.lines.last_mut() {
            Some(line) => {
                line.push_str("  ");
                line.push_str(&comment);
            }
            None => self.lines.push(comment),
        }
    }
}

fn indent(depth: usize) -> String {
    " ".repeat(INDENT_WIDTH * depth)
}

/// Blank lines written between `items[prev]` and `items[index]`.
fn blank_lines(items: &[Node<'_>], prev: usize, index: usize, module_level: bool) -> usize {
    let (before, item) = (items[prev], items[index]);
    let most = if module_level { 2 } else { 1 };

    if is_comment(before) && gap(before, item) == 0 && leads_into_definition(items, prev) {
        return 0;
    }
    if is_definition(item) || leads_into_definition(items, index) || is_definition(before) {
        return most;
    }
    if is_import(before) && !is_import(item) && !is_comment(item) {
        return 1;
    }
    if !is_import(before)
        && !is_comment(before)
        && (is_import(item) || leads_into(items, index, is_import))
    {
        return 1;
    }
    if module_level && prev == 0 && is_docstring(before) {
        return 1;
    }
    gap(before, item).min(most)
}
