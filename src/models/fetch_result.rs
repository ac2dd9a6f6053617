use serde::Serialize;
use serde_json::Value;

/// Message returned whenever the movie catalog could not be loaded
pub const FAILED_TO_LOAD_MOVIES: &str = "Failed to load movies, please try again.";

/// Message returned when the catalog answered 200 with a body that is not JSON
pub const UNREADABLE_RESPONSE: &str = "Movie service returned an unreadable response.";

/// Outcome of one logical upstream fetch, retries included.
///
/// Serializes untagged: a success is the upstream JSON verbatim, a failure is
/// `{"message": ..., "status_code": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FetchResult {
    Failure { message: String, status_code: u16 },
    Success(Value),
}

impl FetchResult {
    pub fn failure(message: impl Into<String>, status_code: u16) -> Self {
        FetchResult::Failure {
            message: message.into(),
            status_code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchResult::Success(_))
    }

    /// Status code of a failure, `None` for a success
    pub fn status_code(&self) -> Option<u16> {
        match self {
            FetchResult::Failure { status_code, .. } => Some(*status_code),
            FetchResult::Success(_) => None,
        }
    }
}
