use std::io::{self, Write};

use colored::{ColoredString, Colorize};
use log::debug;

use crate::types::{CheckResult, Outcome};

fn colorize(line: &str) -> ColoredString {
    if line.starts_with("---") || line.starts_with("+++") {
        line.bold()
    } else if line.starts_with("@@") {
        line.cyan()
    } else if line.starts_with('+') {
        line.green()
    } else if line.starts_with('-') {
        line.red()
    } else {
        line.normal()
    }
}

/// Print every finding followed by the final `ok` or `error` line.
pub fn print_report<W: Write>(writer: &mut W, result: &CheckResult) -> io::Result<()> {
    debug!("Printing report for {} findings", result.findings.len());
    for finding in &result.findings {
        let header = format!("pytidy {} {}:", finding.tool, finding.path);
        match &finding.outcome {
            Outcome::Diff(diff) => {
                writeln!(writer, "{}", header.bold())?;
                for line in diff.lines() {
                    writeln!(writer, "{}", colorize(line))?;
                }
            }
            Outcome::Failure(message) => writeln!(writer, "{} {}", header.bold(), message.red())?,
        }
    }

    if result.is_compliant() {
        writeln!(writer, "{}", "ok".green().bold())?;
    } else {
        writeln!(writer, "{}", "error".red().bold())?;
    }
    writer.flush()?;
    Ok(())
}
