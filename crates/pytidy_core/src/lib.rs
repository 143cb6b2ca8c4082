//! Core utilities for pytidy tools.
//!
//! This crate provides shared functionality for the formatter and the import
//! sorter, including:
//! - The structured error taxonomy shared by every pipeline entry point
//! - Parsing Python source with tree-sitter and rejecting invalid syntax
//! - Syntax helpers used by both the layout engine and the import extractor
//! - Collecting Python source files from one or more roots

mod collector;
mod constants;
mod error;
pub mod syntax;

// Re-export public API
pub use collector::{CollectorConfig, collect_sources};
pub use constants::{DEFAULT_LINE_WIDTH, INDENT_WIDTH, MAX_LINE_WIDTH, PYTHON_EXTENSIONS};
pub use error::{ErrorKind, OptionsError, PipelineError, PipelineResult};
pub use syntax::{ParsedModule, SyntaxError, parse_module};
