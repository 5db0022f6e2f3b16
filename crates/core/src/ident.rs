//! Patient identifier conventions.

use crate::error::CoreError;

/// Maximum length of a patient identifier.
pub const MAX_PATIENT_ID_LEN: usize = 50;

/// Normalize a remote folder name into a patient identifier.
///
/// Convention: trim surrounding whitespace, uppercase. The folder name is
/// the identity, so an empty or oversized result is rejected rather than
/// silently truncated.
pub fn normalize_patient_id(folder_name: &str) -> Result<String, CoreError> {
    let id = folder_name.trim().to_uppercase();
    if id.is_empty() {
        return Err(CoreError::Validation(
            "patient identifier must not be empty".to_string(),
        ));
    }
    if id.len() > MAX_PATIENT_ID_LEN {
        return Err(CoreError::Validation(format!(
            "patient identifier exceeds {MAX_PATIENT_ID_LEN} characters"
        )));
    }
    Ok(id)
}
