//! ChatSession – drives one user/assistant exchange against an explicit [`ConversationState`].
//!
//! The session owns no conversation data. Callers hold the state and lend it mutably for the
//! duration of a send, which rules out two concurrent sends on the same conversation.
//!
//! ```rust,ignore
//! let session = ChatSession::new(Arc::new(HttpChatClient::new(url)));
//! let mut state = ConversationState::new();
//! session.send_message(&mut state, "Is this opacity significant?").await;
//! ```
//!
//! Failures never propagate: the caller sees a fallback assistant turn and the
//! [`Notifier`] receives an error notification.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::{
    conversation::{ChatRequest, ConversationState, ConversationTurn},
    error::ChatError,
    formatting::format_reply,
};

/// Assistant turn appended when the inference call fails.
pub const FALLBACK_REPLY: &str =
    "I'm sorry, I encountered an error while processing your request. Please try again later.";

/// The external chat inference service.
#[async_trait]
pub trait ChatInference: Send + Sync {
    /// Send the new message plus prior history and return the raw reply text.
    async fn send(&self, request: &ChatRequest) -> Result<String, ChatError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationVariant {
    Default,
    Destructive,
}

/// A user-visible toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub variant: NotificationVariant,
}

impl Notification {
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: "Error".to_string(),
            description: description.into(),
            variant: NotificationVariant::Destructive,
        }
    }
}

/// Receives notifications raised while handling a turn.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        warn!(
            title = %notification.title,
            variant = ?notification.variant,
            "{}",
            notification.description
        );
    }
}

/// What happened to a `send_message` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing was sent or stored.
    Ignored,
    /// The reply was formatted and appended.
    Replied,
    /// The call failed and the fallback turn was appended.
    Fallback,
}

/// Keeps `is_loading` set while alive and clears it on every exit path,
/// including the future being dropped mid-await.
struct LoadingGuard<'a> {
    state: &'a mut ConversationState,
}

impl<'a> LoadingGuard<'a> {
    fn new(state: &'a mut ConversationState) -> Self {
        state.set_loading(true);
        Self { state }
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.state.set_loading(false);
    }
}

#[derive(Clone)]
pub struct ChatSession {
    inference: Arc<dyn ChatInference>,
    notifier: Arc<dyn Notifier>,
    timeout: Option<Duration>,
}

impl ChatSession {
    pub fn new(inference: Arc<dyn ChatInference>) -> Self {
        Self {
            inference,
            notifier: Arc::new(TracingNotifier),
            timeout: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    /// Extension: bound the inference call. An elapsed timeout is handled like any
    /// other failure. Without it a hung call simply delays the reply.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Appends the user turn, asks the inference service, and appends exactly one
    /// assistant turn (formatted reply or fallback). Blank input is ignored.
    pub async fn send_message(&self, state: &mut ConversationState, text: &str) -> SendOutcome {
        if text.trim().is_empty() {
            debug!("Ignoring blank chat message");
            return SendOutcome::Ignored;
        }

        let request = ChatRequest {
            message: text.to_string(),
            chat_history: state.history(),
        };
        state.append(ConversationTurn::user(text));

        let mut guard = LoadingGuard::new(state);
        info!(
            "Sending chat message with {} history turns",
            request.chat_history.len()
        );

        match self.request_reply(&request).await {
            Ok(reply) => {
                guard
                    .state
                    .append(ConversationTurn::assistant(format_reply(&reply)));
                SendOutcome::Replied
            }
            Err(e) => {
                warn!("Chat inference failed: {}", e);
                self.notifier.notify(Notification::error(
                    "Failed to get a response from the assistant. Please try again.",
                ));
                guard.state.append(ConversationTurn::assistant(FALLBACK_REPLY));
                SendOutcome::Fallback
            }
        }
    }

    /// Drops every turn. No network call.
    pub fn clear_chat(&self, state: &mut ConversationState) {
        state.clear();
        info!("Conversation cleared");
    }

    async fn request_reply(&self, request: &ChatRequest) -> Result<String, ChatError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.inference.send(request))
                .await
                .map_err(|_| ChatError::Timeout(limit))?,
            None => self.inference.send(request).await,
        }
    }
}
