use std::time::Duration;

use thiserror::Error;

/// Failures on the chat path. These never escape `ChatSession`; they are
/// turned into a fallback turn plus a notification.
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Inference service error: {0}")]
    Upstream(String),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Inference call timed out after {0:?}")]
    Timeout(Duration),
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ChatError::MalformedResponse(err.to_string())
        } else {
            ChatError::Transport(err.to_string())
        }
    }
}
