use clap::{ArgAction, Args};
use pytidy_core::{DEFAULT_LINE_WIDTH, MAX_LINE_WIDTH, OptionsError};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Options controlling import classification and ordering.
///
/// Immutable for the duration of a call and safe to share across threads.
#[derive(Debug, Clone, PartialEq, Eq, Args, Serialize, Deserialize)]
#[serde(default)]
pub struct SortOptions {
    /// Module to treat as first-party (repeatable)
    #[arg(long = "known-first-party", value_name = "MODULE")]
    pub known_first_party: Vec<String>,

    /// Module to place in the explicit third-party section (repeatable)
    #[arg(long = "known-third-party", value_name = "MODULE")]
    pub known_third_party: Vec<String>,

    /// Compare module and member names case-sensitively
    #[arg(long = "case-insensitive", action = ArgAction::SetFalse)]
    pub case_sensitive: bool,

    /// Group constants, then classes, then other names before alphabetizing
    #[arg(long = "no-order-by-type", action = ArgAction::SetFalse)]
    pub order_by_type: bool,

    /// Width above which from-imports are wrapped in parentheses
    #[clap(skip = DEFAULT_LINE_WIDTH)]
    pub line_width: u16,
}

impl Default for SortOptions {
    fn default() -> Self {
        Self {
            known_first_party: Vec::new(),
            known_third_party: Vec::new(),
            case_sensitive: true,
            order_by_type: true,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}

impl SortOptions {
    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.line_width == 0 || self.line_width > MAX_LINE_WIDTH {
            return Err(OptionsError::LineWidth { value: self.line_width, max: MAX_LINE_WIDTH });
        }
        for name in self.known_first_party.iter().chain(&self.known_third_party) {
            if !is_module_name(name) {
                return Err(OptionsError::ModuleName(name.clone()));
            }
        }
        Ok(())
    }

    /// The comparison form of `name` under the active case rule.
    pub(crate) fn normalize<'a>(&self, name: &'a str) -> Cow<'a, str> {
        if self.case_sensitive { Cow::Borrowed(name) } else { Cow::Owned(name.to_lowercase()) }
    }
}

fn is_module_name(name: &str) -> bool {
    !name.is_empty()
        && name.split('.').all(|part| {
            let mut chars = part.chars();
            chars.next().is_some_and(|c| c == '_' || c.is_alphabetic())
                && chars.all(|c| c == '_' || c.is_alphanumeric())
        })
}
