pub mod conversation;
pub mod error;
pub mod formatting;
pub mod report;
pub mod session;

#[cfg(feature = "http")]
pub mod client;

// Re-export commonly used types
pub use conversation::{ChatReply, ChatRequest, ConversationState, ConversationTurn, HistoryEntry, Role};
pub use error::ChatError;
pub use formatting::format_reply;
pub use report::{ReportRequest, build_report_prompt};
pub use session::{
    ChatInference, ChatSession, FALLBACK_REPLY, Notification, NotificationVariant, Notifier,
    SendOutcome, TracingNotifier,
};

#[cfg(feature = "http")]
pub use client::HttpChatClient;
