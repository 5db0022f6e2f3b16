//! Angiography stage classification.
//!
//! Each patient image belongs to one of three imaging timepoints. The stage
//! is inferred from the remote file name where possible, then from the name
//! of the folder the file sits in, and defaults to [`Stage::Mid`] when
//! neither carries a marker.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Matches a stage marker anywhere in a file or folder name.
static STAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(early|mid|late)").expect("valid regex"));

/// One of the three clinical imaging timepoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Early,
    Mid,
    Late,
}

impl Stage {
    /// Return the stage as its lowercase storage string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Early => "early",
            Self::Mid => "mid",
            Self::Late => "late",
        }
    }

    /// Parse a stage from its lowercase storage string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "early" => Ok(Self::Early),
            "mid" => Ok(Self::Mid),
            "late" => Ok(Self::Late),
            _ => Err(CoreError::Validation(format!(
                "Invalid stage '{s}'. Must be one of: early, mid, late"
            ))),
        }
    }

    /// Find a stage marker in an arbitrary name, case-insensitively.
    pub fn find_in(name: &str) -> Option<Self> {
        STAGE_RE.captures(name).map(|caps| {
            match caps.get(1).expect("group 1 present").as_str().to_lowercase().as_str() {
                "early" => Self::Early,
                "late" => Self::Late,
                _ => Self::Mid,
            }
        })
    }

    /// Classify an image file: file name first, then the immediate parent
    /// folder's name, falling back to `Mid`.
    pub fn classify(file_name: &str, parent_folder: &str) -> Self {
        Self::find_in(file_name)
            .or_else(|| Self::find_in(parent_folder))
            .unwrap_or(Self::Mid)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
