//! # Output Formats
//!
//! How a list of diagnostics is rendered into text for the caller:
//!
//! - `message`: one message per line, nothing else.
//! - `printify`: a numbered list with level and source line, for terminals.
//! - `lint`: `<line>:<level>:<key> <message>` rows, for editor integrations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::diagnostics::ValidationErrorDetail;
use crate::error::CoreError;

/// Rendering style for diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain messages joined by newlines.
    #[default]
    Message,
    /// Numbered, human-oriented listing.
    Printify,
    /// Machine-oriented rows.
    Lint,
}

impl OutputFormat {
    /// All formats, in declaration order.
    pub const ALL: [OutputFormat; 3] = [Self::Message, Self::Printify, Self::Lint];

    /// The format's name as accepted by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Message => "message",
            Self::Printify => "printify",
            Self::Lint => "lint",
        }
    }

    /// Render diagnostics in this format. An empty list renders as `""`.
    pub fn render(&self, details: &[ValidationErrorDetail]) -> String {
        let rows: Vec<String> = match self {
            Self::Message => details.iter().map(|d| d.message.clone()).collect(),
            Self::Printify => details
                .iter()
                .enumerate()
                .map(|(i, d)| {
                    let mut row = format!("{:>3}. [{}] {}", i + 1, d.level, d.message);
                    if d.lines > 0 {
                        row.push_str(&format!(" (line {})", d.lines));
                    }
                    if !d.action_items.is_empty() {
                        row.push_str(&format!("\n     {}", d.action_items));
                    }
                    row
                })
                .collect(),
            Self::Lint => details
                .iter()
                .map(|d| format!("{}:{}:{} {}", d.lines, d.level, d.key(), d.message))
                .collect(),
        };
        rows.join("\n")
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownOutputFormat(s.to_string()))
    }
}
