use anyhow::Result;
use log::{debug, info, trace, warn};
use pytidy_api::{FormatOptions, PipelineResult, SortOptions};
use pytidy_core::{CollectorConfig, collect_sources};
use rayon::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
    thread,
};

use crate::{
    config::Config,
    diff::unified_diff,
    paths::label,
    types::{CheckResult, Finding, Outcome, Tool},
};

/// Options shared by every file of one run.
struct Pipeline<'a> {
    format: FormatOptions,
    sort: SortOptions,
    project_root: Option<&'a Path>,
    base: PathBuf,
}

pub fn run_check(cfg: &Config) -> Result<CheckResult> {
    info!("Starting compliance check");

    let pipeline = Pipeline {
        format: cfg.format_options(),
        sort: cfg.sort_options(),
        project_root: cfg.project_root.as_deref(),
        base: cfg.base_dir()?,
    };

    let collector =
        CollectorConfig { roots: cfg.roots.clone(), include_hidden: cfg.include_hidden };
    let files = collect_sources(&collector)?;
    if files.is_empty() {
        warn!("No Python sources found under the given roots");
    }
    info!("Checking {} files in parallel", files.len());

    let findings: Vec<Finding> = files
        .par_iter()
        .flat_map(|path| {
            debug!("Thread {:?} checking: {}", thread::current().id(), path.display());
            pipeline.check_file(path)
        })
        .collect();

    info!("Compliance check complete. Found {} findings", findings.len());
    Ok(CheckResult { findings, files_checked: files.len() })
}

impl Pipeline<'_> {
    fn check_file(&self, path: &Path) -> Vec<Finding> {
        let name = label(path, &self.base);
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                warn!("Failed to read {}: {}", path.display(), e);
                let outcome = Outcome::Failure(format!("failed to read file: {e}"));
                return vec![Finding { tool: Tool::Format, path: name, outcome }];
            }
        };

        let formatted = pytidy_api::format(&name, &text, Some(&self.format));
        let sorted = pytidy_api::sort_imports(&name, &text, Some(&self.sort), self.project_root);
        [(Tool::Format, formatted), (Tool::Isort, sorted)]
            .into_iter()
            .filter_map(|(tool, result)| finding(tool, &name, &text, result))
            .collect()
    }
}

fn finding(tool: Tool, path: &str, text: &str, result: PipelineResult<String>) -> Option<Finding> {
    let outcome = match result {
        Ok(output) if output == text => {
            trace!("{} is {}-compliant", path, tool);
            return None;
        }
        Ok(output) => Outcome::Diff(unified_diff(text, &output)),
        Err(e) => {
            debug!("{} failed on {}: {}", tool, path, e);
            Outcome::Failure(e.to_string())
        }
    };
    Some(Finding { tool, path: path.to_string(), outcome })
}
