//! Line-delimited JSON worker protocol.
//!
//! A worker reads one [`Job`] per line and answers each with one
//! [`JobOutcome`] per line. Failures cross the process boundary as the same
//! [`PipelineError`] the in-process call would have returned.

use crate::{FormatOptions, PipelineError, SortOptions, format, sort_imports};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::io::{self, BufRead, BufReader, ErrorKind as IoErrorKind, Write};
use std::path::PathBuf;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

/// Filename reported for lines that could not be decoded as a job
const UNKNOWN_FILENAME: &str = "<worker>";

/// One unit of work for a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Job {
    Format {
        filename: String,
        source: String,
        #[serde(default)]
        options: Option<FormatOptions>,
    },
    SortImports {
        filename: String,
        source: String,
        #[serde(default)]
        options: Option<SortOptions>,
        #[serde(default)]
        root: Option<PathBuf>,
    },
}

impl Job {
    pub fn filename(&self) -> &str {
        match self {
            Job::Format { filename, .. } | Job::SortImports { filename, .. } => filename,
        }
    }
}

pub type JobOutcome = Result<String, PipelineError>;

pub fn run_job(job: &Job) -> JobOutcome {
    match job {
        Job::Format { filename, source, options } => format(filename, source, options.as_ref()),
        Job::SortImports { filename, source, options, root } => {
            sort_imports(filename, source, options.as_ref(), root.as_deref())
        }
    }
}

/// Answer jobs from `reader` until end of input, returning how many were served.
pub fn serve<R: BufRead, W: Write>(reader: R, mut writer: W) -> io::Result<usize> {
    let mut served = 0;
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let outcome = match serde_json::from_str::<Job>(&line) {
            Ok(job) => {
                trace!("Running job for {}", job.filename());
                run_job(&job)
            }
            Err(e) => {
                warn!("Rejecting undecodable job: {}", e);
                Err(PipelineError::generic(UNKNOWN_FILENAME, format_args!("invalid job: {e}")))
            }
        };
        serde_json::to_writer(&mut writer, &outcome)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        served += 1;
    }
    debug!("Served {} job(s)", served);
    Ok(served)
}

/// A worker child process speaking the protocol over its stdio.
pub struct WorkerProcess {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: BufReader<ChildStdout>,
}

impl WorkerProcess {
    pub fn spawn(mut command: Command) -> io::Result<Self> {
        let mut child = command.stdin(Stdio::piped()).stdout(Stdio::piped()).spawn()?;
        let stdin =
            child.stdin.take().ok_or_else(|| io::Error::other("worker stdin is not piped"))?;
        let stdout =
            child.stdout.take().ok_or_else(|| io::Error::other("worker stdout is not piped"))?;
        debug!("Spawned worker process {}", child.id());
        Ok(Self { child, stdin: Some(stdin), stdout: BufReader::new(stdout) })
    }

    /// Send `job` and wait for its outcome.
    pub fn dispatch(&mut self, job: &Job) -> JobOutcome {
        self.round_trip(job).unwrap_or_else(|e| {
            warn!("Worker transport failed for {}: {}", job.filename(), e);
            Err(PipelineError::generic(
                job.filename(),
                format_args!("worker transport failed: {e}"),
            ))
        })
    }

    fn round_trip(&mut self, job: &Job) -> io::Result<JobOutcome> {
        let stdin = self
            .stdin
            .as_mut()
            .ok_or_else(|| io::Error::new(IoErrorKind::BrokenPipe, "worker stdin closed"))?;
        let mut request = serde_json::to_string(job)?;
        request.push('\n');
        stdin.write_all(request.as_bytes())?;
        stdin.flush()?;

        let mut reply = String::new();
        if self.stdout.read_line(&mut reply)? == 0 {
            return Err(io::Error::new(IoErrorKind::UnexpectedEof, "worker exited before replying"));
        }
        Ok(serde_json::from_str(&reply)?)
    }
}

impl Drop for WorkerProcess {
    fn drop(&mut self) {
        drop(self.stdin.take());
        if let Err(e) = self.child.wait() {
            warn!("Failed to reap worker process: {}", e);
        }
    }
}
