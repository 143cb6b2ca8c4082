use clap::Args;
use pytidy_core::{DEFAULT_LINE_WIDTH, MAX_LINE_WIDTH, OptionsError};
use serde::{Deserialize, Serialize};

/// Options controlling the layout engine.
#[derive(Debug, Clone, PartialEq, Eq, Args, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatOptions {
    /// Maximum line width
    #[arg(long, default_value_t = DEFAULT_LINE_WIDTH)]
    pub line_width: u16,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self { line_width: DEFAULT_LINE_WIDTH }
    }
}

impl FormatOptions {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.line_width == 0 || self.line_width > MAX_LINE_WIDTH {
            return Err(OptionsError::LineWidth { value: self.line_width, max: MAX_LINE_WIDTH });
        }
        Ok(())
    }
}
