use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// The kind of a pipeline failure.
///
/// `Generic` is the base kind: every other kind is a specialization of it, so
/// `kind.is_a(ErrorKind::Generic)` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The input could not be parsed as Python source
    Parse,
    /// Classification, sorting or layout hit an internal invariant violation
    Transform,
    /// The result could not be produced as valid source text
    Print,
    /// Anything not otherwise classified (invalid options, transport failures)
    Generic,
}

impl ErrorKind {
    pub fn is_a(self, other: ErrorKind) -> bool {
        self == other || other == ErrorKind::Generic
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Parse => "parse error",
            ErrorKind::Transform => "transform error",
            ErrorKind::Print => "print error",
            ErrorKind::Generic => "error",
        };
        f.write_str(name)
    }
}

/// A structured pipeline failure.
///
/// Plain data so it survives a process boundary unchanged: the worker protocol
/// serializes it as JSON and the caller sees the same kind it would have seen
/// in-process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{kind} in {filename}: {message}")]
pub struct PipelineError {
    pub kind: ErrorKind,
    pub filename: String,
    pub message: String,
}

impl PipelineError {
    pub fn new(kind: ErrorKind, filename: impl Into<String>, message: impl fmt::Display) -> Self {
        Self { kind, filename: filename.into(), message: message.to_string() }
    }

    pub fn parse(filename: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Parse, filename, message)
    }

    pub fn transform(filename: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Transform, filename, message)
    }

    pub fn print(filename: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Print, filename, message)
    }

    pub fn generic(filename: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::new(ErrorKind::Generic, filename, message)
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Rejected option values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OptionsError {
    #[error("line width must be between 1 and {max}, got {value}")]
    LineWidth { value: u16, max: u16 },

    #[error("invalid module name {0:?}")]
    ModuleName(String),
}
