use thiserror::Error;

/// Message used when a transport failure carries no text of its own.
pub const DEFAULT_REPORT_ERROR: &str = "Failed to generate report";

/// Failures of the relay endpoints, shared by the report and chat relays.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RelayError {
    #[error("OpenAI API key is not configured")]
    MissingCredential,

    #[error("Image URL is required")]
    MissingImage,

    #[error("Message is required")]
    MissingMessage,

    #[error("OpenAI API error: {0}")]
    Upstream(String),

    #[error("{0}")]
    Transport(String),
}

impl RelayError {
    /// Builds a transport error, substituting the default message for an empty one.
    pub fn transport(message: impl Into<String>) -> Self {
        let message = message.into();
        if message.trim().is_empty() {
            RelayError::Transport(DEFAULT_REPORT_ERROR.to_string())
        } else {
            RelayError::Transport(message)
        }
    }

    /// True when the caller sent an invalid request, as opposed to a server-side failure.
    pub fn is_request_error(&self) -> bool {
        matches!(self, RelayError::MissingImage | RelayError::MissingMessage)
    }
}

/// Either the generated report text or the reason it could not be produced.
pub type ReportResult = std::result::Result<String, RelayError>;
