use anyhow::{Context, Result};
use clap::Parser;
use log::debug;
use path_clean::PathClean;
use pytidy_api::{FormatOptions, SortOptions};
use pytidy_core::DEFAULT_LINE_WIDTH;
use std::{env, path::PathBuf};

#[derive(Debug, Clone, Parser)]
#[command(name = "check")]
#[command(about = "Verify that Python sources are formatted and their imports sorted")]
pub struct Config {
    /// Files or directories to check
    #[arg(required = true, value_name = "ROOT")]
    pub roots: Vec<PathBuf>,

    /// Maximum line width for formatting and import wrapping
    #[arg(long, default_value_t = DEFAULT_LINE_WIDTH)]
    pub line_width: u16,

    #[command(flatten)]
    pub sort: SortOptions,

    /// Project root for first-party detection and path labels (defaults to the current directory)
    #[arg(long)]
    pub project_root: Option<PathBuf>,

    /// Descend into hidden files and directories
    #[arg(long)]
    pub include_hidden: bool,
}

impl Config {
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions { line_width: self.line_width }
    }

    pub fn sort_options(&self) -> SortOptions {
        SortOptions { line_width: self.line_width, ..self.sort.clone() }
    }

    /// Absolute directory that finding labels are relative to.
    pub(crate) fn base_dir(&self) -> Result<PathBuf> {
        let base = match &self.project_root {
            Some(root) => std::path::absolute(root)
                .with_context(|| format!("Failed to resolve project root {}", root.display()))?,
            None => env::current_dir().context("Failed to read the current directory")?,
        };
        debug!("Labeling paths relative to {}", base.display());
        Ok(base.clean())
    }
}
