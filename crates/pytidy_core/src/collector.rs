use anyhow::{Result, anyhow};
use dashmap::DashSet;
use ignore::WalkBuilder;
use log::{debug, trace};
use path_clean::PathClean;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::constants::PYTHON_EXTENSIONS;

pub struct CollectorConfig {
    pub roots: Vec<PathBuf>,
    /// Descend into hidden files and directories (`.venv`, `.tox`, ...)
    pub include_hidden: bool,
}

/// Collect every Python source under `cfg.roots`, sorted and deduplicated.
///
/// Roots may be directories or individual files. Overlapping roots are walked
/// in parallel and each file is reported once.
pub fn collect_sources(cfg: &CollectorConfig) -> Result<Vec<PathBuf>> {
    debug!("Collecting Python sources from {} roots", cfg.roots.len());
    let seen: DashSet<PathBuf> = DashSet::new();

    cfg.roots.par_iter().try_for_each(|root| -> Result<()> {
        if !root.exists() {
            return Err(anyhow!("Source root does not exist: {}", root.display()));
        }
        debug!("Walking directory tree from root: {}", root.display());
        let walker = WalkBuilder::new(root)
            .hidden(!cfg.include_hidden)
            .ignore(true)
            .git_ignore(true)
            .build();

        for res in walker {
            let dent = res?;
            let p = dent.path();
            if !p.is_file() || !is_python_source(p) {
                continue;
            }
            let cleaned = p.to_path_buf().clean();
            trace!("Found source file: {}", cleaned.display());
            seen.insert(cleaned);
        }
        Ok(())
    })?;

    let mut files: Vec<PathBuf> = seen.into_iter().collect();
    files.sort();
    debug!("Collected {} source files", files.len());
    Ok(files)
}

fn is_python_source(p: &Path) -> bool {
    p.extension().and_then(|e| e.to_str()).is_some_and(|ext| PYTHON_EXTENSIONS.contains(&ext))
}
