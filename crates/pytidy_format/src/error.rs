use pytidy_core::SyntaxError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error(transparent)]
    Parse(#[from] SyntaxError),

    #[error("unbalanced brackets in the statement at line {line}")]
    Unbalanced { line: usize },

    #[error("formatted output is not valid Python: {0}")]
    Print(SyntaxError),
}
