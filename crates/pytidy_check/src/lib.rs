//! Compliance checking for Python source trees.
//!
//! Every Python file under the given roots is run through the formatter and
//! the import sorter. A file is compliant when both leave it unchanged;
//! otherwise a unified diff or the pipeline failure is reported. Files are
//! never written.
//!
//! # Examples
//!
//! ```no_run
//! use clap::Parser;
//! use pytidy_check::{Config, print_report, run_check};
//! use std::io::BufWriter;
//!
//! # fn main() -> anyhow::Result<()> {
//! let cfg = Config::parse_from(["check", "--project-root", ".", "src"]);
//! let result = run_check(&cfg)?;
//!
//! let mut stdout = BufWriter::new(std::io::stdout());
//! print_report(&mut stdout, &result)?;
//! if !result.is_compliant() {
//!     std::process::exit(1);
//! }
//! # Ok(())
//! # }
//! ```

mod checker;
mod config;
mod diff;
mod paths;
mod reporter;
mod types;

// Re-export public API
pub use checker::run_check;
pub use config::Config;
pub use diff::unified_diff;
pub use reporter::print_report;
pub use types::{CheckResult, Finding, Outcome, Tool};
