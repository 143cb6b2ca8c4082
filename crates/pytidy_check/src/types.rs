use std::fmt;

/// The pipeline a finding came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Format,
    Isort,
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tool::Format => "format",
            Tool::Isort => "isort",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Unified diff from the file on disk to the tool's output
    Diff(String),
    /// The file could not be read or the pipeline failed
    Failure(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub tool: Tool,
    pub path: String,
    pub outcome: Outcome,
}

#[derive(Debug, Clone)]
pub struct CheckResult {
    pub findings: Vec<Finding>,
    pub files_checked: usize,
}

impl CheckResult {
    pub fn is_compliant(&self) -> bool {
        self.findings.is_empty()
    }
}
