use crate::config::SortOptions;
use crate::types::{Bucket, ImportName, ImportStatement, StatementKind, Trailer};
use pytidy_core::INDENT_WIDTH;

/// The statements of one bucket, already sorted.
#[derive(Debug, Clone)]
pub struct Section {
    pub bucket: Bucket,
    pub statements: Vec<ImportStatement>,
}

/// An import block ready to be written back over its source region.
#[derive(Debug, Clone)]
pub struct SortedBlock {
    pub start: usize,
    pub leading: usize,
    pub end: usize,
    pub indent: String,
    pub trailer: Trailer,
    pub sections: Vec<Section>,
}

/// Rewrite every block region of `source`; everything else is copied as is.
pub fn render(source: &str, blocks: &[SortedBlock], options: &SortOptions, eol: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for block in blocks {
        out.push_str(&source[cursor..block.start]);
        render_block(&mut out, block, options, eol);
        cursor = block.end;
    }
    out.push_str(&source[cursor..]);
    out
}

fn render_block(out: &mut String, block: &SortedBlock, options: &SortOptions, eol: &str) {
    out.push_str(&eol.repeat(block.leading));
    let sections = block.sections.iter().filter(|section| !section.statements.is_empty());
    for (i, section) in sections.enumerate() {
        if i > 0 {
            out.push_str(eol);
        }
        for statement in &section.statements {
            for comment in &statement.leading_comments {
                out.push_str(&block.indent);
                out.push_str(comment);
                out.push_str(eol);
            }
            render_statement(out, statement, &block.indent, options, eol);
        }
    }
    if let Trailer::Blank(lines) = block.trailer {
        out.push_str(&eol.repeat(lines));
    }
}

fn render_statement(
    out: &mut String,
    statement: &ImportStatement,
    indent: &str,
    options: &SortOptions,
    eol: &str,
) {
    let trailing = statement.trailing_comment.as_deref().map(|comment| format!("  {comment}"));
    let trailing = trailing.as_deref().unwrap_or_default();

    if statement.kind == StatementKind::Plain {
        let module = &statement.module;
        let alias = statement.alias.as_ref().map(|a| format!(" as {a}")).unwrap_or_default();
        out.push_str(&format!("{indent}import {module}{alias}{trailing}{eol}"));
        return;
    }

    let head = format!("{indent}from {} import", statement.module_spec());
    if statement.wildcard {
        out.push_str(&format!("{head} *{trailing}{eol}"));
        return;
    }

    let members: Vec<String> = statement.names.iter().map(member).collect();
    let single = format!("{head} {}", members.join(", "));
    if !statement.trailing_comma && single.chars().count() <= usize::from(options.line_width) {
        out.push_str(&format!("{single}{trailing}{eol}"));
        return;
    }

    let inner = format!("{indent}{}", " ".repeat(INDENT_WIDTH));
    out.push_str(&format!("{head} ({eol}"));
    for member in &members {
        out.push_str(&format!("{inner}{member},{eol}"));
    }
    out.push_str(&format!("{indent}){trailing}{eol}"));
}

fn member(name: &ImportName) -> String {
    match &name.alias {
        Some(alias) => format!("{} as {alias}", name.name),
        None => name.name.clone(),
    }
}
