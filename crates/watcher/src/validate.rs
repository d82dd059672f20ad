//! Structural validation of the decoded API response.

use serde_json::Value;

use statusbot_common::error::WatchError;

/// Keys that must be present at the top level of every response.
const REQUIRED_KEYS: [&str; 2] = ["homeworks", "current_date"];

/// Check the shape of a decoded API response.
///
/// The top level must be a JSON object carrying both `homeworks` (an array,
/// possibly empty) and `current_date`. Every missing key is named in the
/// error, not just the first. Individual homework records are not inspected
/// here — that is the status interpreter's job.
pub fn check_response(response: &Value) -> Result<(), WatchError> {
    let map = response.as_object().ok_or_else(|| {
        WatchError::TypeMismatch("response body is not a JSON object".to_string())
    })?;

    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .filter(|key| !map.contains_key(**key))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(WatchError::MissingKeys(missing.join(", ")));
    }

    if !map["homeworks"].is_array() {
        return Err(WatchError::TypeMismatch(
            "\"homeworks\" is not an array".to_string(),
        ));
    }

    tracing::debug!("Response carries all required keys");
    Ok(())
}
