use http::StatusCode;

use super::IndexError;

/// Result of a successful provisioning call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    AlreadyExists,
}

/// Marker the service puts in the 409 message when the index name is taken.
const ALREADY_EXISTS_MARKER: &str = "already exists";

/// Interpret the response to `POST /index/create`.
///
/// The "already exists" contract is a 409 status together with a duplicate
/// message. The message is read from the `error` or `message` field of a JSON
/// body, falling back to the raw body text. A 409 for any other reason is a
/// failure.
pub fn classify_create_response(status: StatusCode, body: &str) -> Result<CreateOutcome, IndexError> {
    if status.is_success() {
        return Ok(CreateOutcome::Created);
    }
    if status == StatusCode::CONFLICT && is_duplicate_message(&error_message(body)) {
        return Ok(CreateOutcome::AlreadyExists);
    }
    Err(IndexError::Status {
        status: status.as_u16(),
        body: body.to_owned(),
    })
}

fn error_message(body: &str) -> String {
    if let Ok(json) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(msg) = ["error", "message"]
            .iter()
            .find_map(|key| json.get(key).and_then(|m| m.as_str()))
        {
            return msg.to_owned();
        }
    }
    body.to_owned()
}

fn is_duplicate_message(message: &str) -> bool {
    message.to_lowercase().contains(ALREADY_EXISTS_MARKER)
}
