//! Generated video models.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Status of a generated video.
///
/// The caption pipeline only ever persists finished results, so a row
/// exists exactly when the run completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    #[default]
    Completed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Completed => "completed",
        }
    }

    /// Parse a stored status value.
    pub fn from_db(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(VideoStatus::Completed),
            _ => None,
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
