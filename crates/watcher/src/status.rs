//! Translation of a single homework record into the notification text.

use serde_json::Value;

use statusbot_common::error::WatchError;
use statusbot_common::types::ReviewStatus;

/// Format the notification for one homework record.
///
/// The record must carry `homework_name` and a `status` from the known
/// verdict set; anything else is a hard error for the record. The returned
/// sentence is the user-visible contract and must stay verbatim.
pub fn parse_status(homework: &Value) -> Result<String, WatchError> {
    let name = homework
        .get("homework_name")
        .and_then(Value::as_str)
        .ok_or_else(|| {
            WatchError::HomeworkStatus("record has no \"homework_name\" key".to_string())
        })?;

    let status = homework
        .get("status")
        .and_then(Value::as_str)
        .and_then(ReviewStatus::from_code)
        .ok_or_else(|| {
            // Carry the offending value verbatim, whatever its JSON type
            WatchError::HomeworkStatus(
                homework
                    .get("status")
                    .map_or_else(|| "record has no \"status\" key".to_string(), Value::to_string),
            )
        })?;

    Ok(format!(
        "Изменился статус проверки работы \"{name}\". {verdict}",
        verdict = status.verdict()
    ))
}
