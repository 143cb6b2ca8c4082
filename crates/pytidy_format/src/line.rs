//! Fitting one logical line into the configured width.

use crate::error::LayoutError;
use crate::tokens::{Class, Token, join};
use log::trace;
use pytidy_core::INDENT_WIDTH;

/// Bracket pairs of `tokens` as `(open, close)` index pairs, innermost first.
fn bracket_pairs(tokens: &[Token]) -> Result<Vec<(usize, usize)>, ()> {
    let mut stack = Vec::new();
    let mut pairs = Vec::new();
    for (i, token) in tokens.iter().enumerate() {
        match token.class {
            Class::Open => stack.push(i),
            Class::Close => pairs.push((stack.pop().ok_or(())?, i)),
            _ => {}
        }
    }
    if stack.is_empty() { Ok(pairs) } else { Err(()) }
}

/// Commas directly inside the pair that belong to the bracketed construct.
fn delimiters(tokens: &[Token], open: usize, close: usize) -> Vec<usize> {
    let mut depth = 0usize;
    let mut commas = Vec::new();
    for (i, token) in tokens.iter().enumerate().take(close).skip(open + 1) {
        match token.class {
            Class::Open => depth += 1,
            Class::Close => depth = depth.saturating_sub(1),
            Class::Comma if depth == 0 && token.owner == tokens[open].owner => commas.push(i),
            _ => {}
        }
    }
    commas
}

/// A comma before the closing bracket asks for one element per line, except
/// in a one-element tuple where it is required syntax.
fn is_magic(tokens: &[Token], open: usize, close: usize) -> bool {
    if tokens[open].force_split {
        return true;
    }
    let commas = delimiters(tokens, open, close);
    match commas.last() {
        Some(&last) if last + 1 == close => {
            !(tokens[open].owner_kind == "tuple" && commas.len() == 1)
        }
        _ => false,
    }
}

struct Layout<'a> {
    width: usize,
    out: &'a mut Vec<String>,
}

impl Layout<'_> {
    fn fits(&self, depth: usize, text: &str, suffix: &str) -> bool {
        INDENT_WIDTH * depth + text.chars().count() + suffix.len() <= self.width
    }

    fn push(&mut self, depth: usize, text: &str, suffix: &str) {
        self.out.push(format!("{}{text}{suffix}", " ".repeat(INDENT_WIDTH * depth)));
    }

    fn line(&mut self, tokens: &[Token], depth: usize, suffix: &str) {
        let joined = join(tokens, false);
        // Every slice laid out here comes from a balanced line and is balanced itself
        let pairs = bracket_pairs(tokens).unwrap_or_default();
        let top: Vec<(usize, usize)> = pairs
            .iter()
            .copied()
            .filter(|&(o, c)| !pairs.iter().any(|&(po, pc)| po < o && c < pc))
            .collect();
        let magic: Vec<(usize, usize)> = top
            .iter()
            .copied()
            .filter(|&(o, c)| {
                pairs.iter().any(|&(io, ic)| o <= io && ic <= c && is_magic(tokens, io, ic))
            })
            .collect();
        let multiline = tokens.iter().any(|token| token.text.contains('\n'));

        if magic.is_empty() && (multiline || self.fits(depth, &joined, suffix)) {
            self.push(depth, &joined, suffix);
            return;
        }

        let candidates: Vec<(usize, usize)> = if magic.is_empty() {
            top.into_iter().filter(|&(o, c)| c > o + 1).collect()
        } else {
            magic
        };
        let fitting = candidates.iter().rev().find(|&&(o, c)| {
            self.fits(depth, &join(&tokens[..=o], true), "")
                && self.fits(depth, &join(&tokens[c..], true), suffix)
        });
        let Some(&(open, close)) = fitting.or(candidates.last()) else {
            self.push(depth, &joined, suffix);
            return;
        };
        trace!("Splitting at bracket pair {}..{}", open, close);

        self.push(depth, &join(&tokens[..=open], true), "");
        let commas = delimiters(tokens, open, close);
        if commas.is_empty() && !tokens[open].synthetic {
            self.line(&tokens[open + 1..close], depth + 1, "");
        } else {
            let mut start = open + 1;
            for end in commas.into_iter().chain([close]) {
                if end > start {
                    self.line(&tokens[start..end], depth + 1, ",");
                }
                start = end + 1;
            }
        }
        self.push(depth, &join(&tokens[close..], true), suffix);
    }
}

/// Lay out one logical line at `depth`, appending the physical lines to `out`.
pub(crate) fn layout_line(
    tokens: &[Token],
    depth: usize,
    width: usize,
    line: usize,
    out: &mut Vec<String>,
) -> Result<(), LayoutError> {
    bracket_pairs(tokens).map_err(|_| LayoutError::Unbalanced { line })?;
    Layout { width, out }.line(tokens, depth, "");
    Ok(())
}
