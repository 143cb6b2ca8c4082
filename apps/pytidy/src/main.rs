use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::{debug, info};
use pytidy_api::{FormatOptions, SortOptions};
use pytidy_core::DEFAULT_LINE_WIDTH;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "pytidy", version = pytidy_api::ENGINE_VERSION)]
#[command(about = "Format Python source and sort its imports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print a file laid out within the line width
    Format(FormatArgs),
    /// Print a file with its import blocks sorted
    Isort(IsortArgs),
    /// Check that Python sources are formatted and their imports sorted
    Check(pytidy_check::Config),
    /// Serve the line-delimited JSON worker protocol on stdin and stdout
    #[command(hide = true)]
    Worker,
}

#[derive(Debug, Args)]
struct FormatArgs {
    #[command(flatten)]
    options: FormatOptions,

    /// Python file to format
    file: PathBuf,
}

#[derive(Debug, Args)]
struct IsortArgs {
    #[command(flatten)]
    options: SortOptions,

    /// Width above which from-imports are wrapped
    #[arg(long, default_value_t = DEFAULT_LINE_WIDTH)]
    line_width: u16,

    /// Directory used to detect first-party modules
    #[arg(long)]
    project_root: Option<PathBuf>,

    /// Python file to sort
    file: PathBuf,
}

fn read_source(path: &Path) -> Result<(String, String)> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok((path.to_string_lossy().to_string(), text))
}

fn main() -> Result<()> {
    env_logger::init();

    // stdio is blocked by LineWriter, use a BufWriter to reduce syscalls.
    let mut stdout = BufWriter::new(io::stdout());

    let cli = Cli::parse();
    debug!("Parsed CLI arguments: {:?}", cli.command);

    match cli.command {
        Commands::Format(args) => {
            let (name, text) = read_source(&args.file)?;
            let output = pytidy_api::format(&name, &text, Some(&args.options))?;
            stdout.write_all(output.as_bytes())?;
            stdout.flush()?;
        }
        Commands::Isort(args) => {
            let (name, text) = read_source(&args.file)?;
            let options = SortOptions { line_width: args.line_width, ..args.options };
            let output = pytidy_api::sort_imports(
                &name,
                &text,
                Some(&options),
                args.project_root.as_deref(),
            )?;
            stdout.write_all(output.as_bytes())?;
            stdout.flush()?;
        }
        Commands::Check(cfg) => {
            let start = Instant::now();
            let num_threads = rayon::current_num_threads();
            info!(
                "Running compliance check on {} root(s) (using {} threads)",
                cfg.roots.len(),
                num_threads
            );

            let result = pytidy_check::run_check(&cfg)?;
            pytidy_check::print_report(&mut stdout, &result)?;
            info!(
                "Finished in {}ms on {} files (using {} threads)",
                start.elapsed().as_millis(),
                result.files_checked,
                num_threads
            );

            if !result.is_compliant() {
                // Non-zero exit to fail CI
                std::process::exit(1);
            }
        }
        Commands::Worker => {
            let served = pytidy_api::worker::serve(io::stdin().lock(), &mut stdout)?;
            debug!("Worker exiting after {} job(s)", served);
        }
    }

    Ok(())
}
