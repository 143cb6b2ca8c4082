//! The pytidy pipeline facade.
//!
//! [`format`] and [`sort_imports`] are the two entry points. Both are pure
//! functions of their arguments and report every failure as a
//! [`PipelineError`] carrying the filename it was given. The [`worker`]
//! module runs the same entry points behind a line-delimited JSON protocol so
//! callers can fan out to separate processes.

pub mod worker;

pub use pytidy_core::{ErrorKind, PipelineError, PipelineResult};
pub use pytidy_format::FormatOptions;
pub use pytidy_isort::SortOptions;

use log::debug;
use pytidy_format::{LayoutError, format_source};
use pytidy_isort::{SortError, sort_imports_source};
use std::path::Path;

/// Version of the formatting and sorting engine.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Lay out `text` with the given options, or the defaults.
pub fn format(
    filename: &str,
    text: &str,
    options: Option<&FormatOptions>,
) -> PipelineResult<String> {
    let defaults = FormatOptions::default();
    let options = options.unwrap_or(&defaults);
    options.validate().map_err(|e| PipelineError::generic(filename, e))?;

    debug!("Formatting {}", filename);
    format_source(text, options).map_err(|e| layout_failure(filename, e))
}

/// Sort the import blocks of `text`.
///
/// `root` enables first-party detection from the directory layout.
pub fn sort_imports(
    filename: &str,
    text: &str,
    options: Option<&SortOptions>,
    root: Option<&Path>,
) -> PipelineResult<String> {
    let defaults = SortOptions::default();
    let options = options.unwrap_or(&defaults);
    options.validate().map_err(|e| PipelineError::generic(filename, e))?;

    debug!("Sorting imports of {}", filename);
    sort_imports_source(text, options, root).map_err(|e| sort_failure(filename, e))
}

fn layout_failure(filename: &str, err: LayoutError) -> PipelineError {
    match err {
        LayoutError::Parse(e) => PipelineError::parse(filename, e),
        LayoutError::Unbalanced { .. } => PipelineError::transform(filename, err),
        LayoutError::Print(_) => PipelineError::print(filename, err),
    }
}

fn sort_failure(filename: &str, err: SortError) -> PipelineError {
    match err {
        SortError::Parse(e) => PipelineError::parse(filename, e),
        SortError::Malformed { .. } => PipelineError::transform(filename, err),
        SortError::Print(_) => PipelineError::print(filename, err),
    }
}
