use pytidy_core::SyntaxError;
use std::ops::Range;
use thiserror::Error;

/// Output section of an import. Declaration order is the rendering order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bucket {
    Future,
    DunderBuiltin,
    StandardLibrary,
    /// Default section for anything not otherwise classified
    ThirdParty,
    FirstParty,
    /// Modules listed in `known_third_party`
    KnownThirdParty,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatementKind {
    /// `import a.b [as c]`
    Plain,
    /// `from a.b import c [as d], ...`
    From,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ImportName {
    pub name: String,
    pub alias: Option<String>,
}

impl ImportName {
    pub fn new(name: impl Into<String>, alias: Option<String>) -> Self {
        Self { name: name.into(), alias }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportStatement {
    pub kind: StatementKind,
    /// Dotted module path, empty for `from . import x`
    pub module: String,
    /// Alias of a plain import
    pub alias: Option<String>,
    /// Imported members of a from-import
    pub names: Vec<ImportName>,
    /// Number of leading dots
    pub level: usize,
    pub wildcard: bool,
    /// The parenthesized member list ended with a comma
    pub trailing_comma: bool,
    /// Byte range of the source statement
    pub span: Range<usize>,
    pub leading_comments: Vec<String>,
    pub trailing_comment: Option<String>,
}

impl ImportStatement {
    pub fn plain(module: impl Into<String>, alias: Option<String>) -> Self {
        Self {
            kind: StatementKind::Plain,
            module: module.into(),
            alias,
            names: Vec::new(),
            level: 0,
            wildcard: false,
            trailing_comma: false,
            span: 0..0,
            leading_comments: Vec::new(),
            trailing_comment: None,
        }
    }

    pub fn from(module: impl Into<String>, level: usize, names: Vec<ImportName>) -> Self {
        Self { kind: StatementKind::From, level, names, ..Self::plain(module, None) }
    }

    pub fn top_level(&self) -> &str {
        self.module.split('.').next().unwrap_or_default()
    }

    pub fn is_relative(&self) -> bool {
        self.level > 0
    }

    /// The module as written after `from`, dots included.
    pub fn module_spec(&self) -> String {
        format!("{}{}", ".".repeat(self.level), self.module)
    }
}

/// A run of consecutive imports in one suite, rewritten as a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportBlock {
    /// Start of the line holding the first import or its leading comment
    pub start: usize,
    /// Blank lines written before the block, for a block that follows another
    /// statement of its suite
    pub leading: usize,
    /// End of the replaced region, see [`Trailer`]
    pub end: usize,
    pub indent: String,
    pub statements: Vec<ImportStatement>,
    pub trailer: Trailer,
}

/// What follows an import block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trailer {
    /// Another statement of the same suite follows; the region covers the gap
    /// up to it, which is rewritten as this many blank lines
    Blank(usize),
    /// The block ends its suite; the region stops after the last import line
    Keep,
}

#[derive(Debug, Error)]
pub enum SortError {
    #[error(transparent)]
    Parse(#[from] SyntaxError),

    #[error("malformed import statement at byte {offset}: {reason}")]
    Malformed { offset: usize, reason: String },

    #[error("sorted output is not valid Python: {0}")]
    Print(SyntaxError),
}
