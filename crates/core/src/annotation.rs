//! Annotation field constraints and validation.
//!
//! A reviewer's judgment on a patient carries a presence flag, an activity
//! classification, a 1–10 image quality score, and a free-text comment.
//! Validation is field-level: every offending field is reported, and a
//! failed validation must leave the stored annotation untouched.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Minimum accepted image quality score.
pub const MIN_QUALITY: i32 = 1;
/// Maximum accepted image quality score.
pub const MAX_QUALITY: i32 = 10;

/// Disease activity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Activity {
    Active,
    Inactive,
    Unknown,
}

impl Activity {
    /// Return the activity as its lowercase storage string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Unknown => "unknown",
        }
    }

    /// Parse an activity from its lowercase storage string.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "unknown" => Ok(Self::Unknown),
            _ => Err(CoreError::Validation(format!(
                "Invalid activity '{s}'. Must be one of: active, inactive, unknown"
            ))),
        }
    }
}

/// What a submission does with the annotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveAction {
    /// Persist field changes without finalizing.
    Save,
    /// Persist, finalize, and advance the queue.
    SaveAndNext,
}

/// One field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Fields as submitted by a reviewer, before validation.
///
/// `activity` arrives as a raw string so an unknown value is reported as a
/// field error instead of a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotationFields {
    #[serde(default)]
    pub vasculitis_present: bool,
    pub activity: Option<String>,
    pub quality: Option<i32>,
    pub comment: Option<String>,
}

/// Validated annotation field values ready to persist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAnnotationFields {
    pub vasculitis_present: bool,
    pub activity: Option<Activity>,
    pub quality: Option<i32>,
    pub comment: Option<String>,
}

impl AnnotationFields {
    /// Validate all fields, collecting every failure.
    ///
    /// Empty strings for activity and comment are treated as unset, matching
    /// the form semantics of optional selects and textareas.
    pub fn validate(&self) -> Result<ValidAnnotationFields, Vec<FieldError>> {
        let mut errors = Vec::new();

        let activity = match self.activity.as_deref().filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => match Activity::parse(raw) {
                Ok(a) => Some(a),
                Err(e) => {
                    errors.push(FieldError {
                        field: "activity",
                        message: e.to_string(),
                    });
                    None
                }
            },
        };

        if let Some(q) = self.quality {
            if !(MIN_QUALITY..=MAX_QUALITY).contains(&q) {
                errors.push(FieldError {
                    field: "quality",
                    message: format!(
                        "quality must be between {MIN_QUALITY} and {MAX_QUALITY}, got {q}"
                    ),
                });
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(ValidAnnotationFields {
            vasculitis_present: self.vasculitis_present,
            activity,
            quality: self.quality,
            comment: self
                .comment
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(activity: Option<&str>, quality: Option<i32>) -> AnnotationFields {
        AnnotationFields {
            vasculitis_present: true,
            activity: activity.map(str::to_string),
            quality,
            comment: Some("looks inflamed".to_string()),
        }
    }

    #[test]
    fn test_valid_fields_pass() {
        let valid = fields(Some("active"), Some(7)).validate().unwrap();
        assert!(valid.vasculitis_present);
        assert_eq!(valid.activity, Some(Activity::Active));
        assert_eq!(valid.quality, Some(7));
        assert_eq!(valid.comment.as_deref(), Some("looks inflamed"));
    }

    #[test]
    fn test_unset_optionals_pass() {
        let valid = fields(None, None).validate().unwrap();
        assert_eq!(valid.activity, None);
        assert_eq!(valid.quality, None);
    }

    #[test]
    fn test_empty_activity_string_is_unset() {
        let valid = fields(Some(""), None).validate().unwrap();
        assert_eq!(valid.activity, None);
    }

    #[test]
    fn test_quality_out_of_range() {
        let errors = fields(None, Some(11)).validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "quality");

        assert!(fields(None, Some(0)).validate().is_err());
        assert!(fields(None, Some(1)).validate().is_ok());
        assert!(fields(None, Some(10)).validate().is_ok());
    }

    #[test]
    fn test_unknown_activity() {
        let errors = fields(Some("dormant"), None).validate().unwrap_err();
        assert_eq!(errors[0].field, "activity");
    }

    #[test]
    fn test_all_failures_reported() {
        let errors = fields(Some("dormant"), Some(99)).validate().unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["activity", "quality"]);
    }

    #[test]
    fn test_comment_trimmed_and_emptied() {
        let mut f = fields(None, None);
        f.comment = Some("   ".to_string());
        assert_eq!(f.validate().unwrap().comment, None);
    }
}
