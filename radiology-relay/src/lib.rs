pub mod config;
pub mod error;
pub mod models;
pub mod openai;
pub mod relay;
pub mod service;

pub use config::RelayConfig;
pub use error::{RelayError, ReportResult};
pub use models::*;
pub use openai::{CompletionBackend, OpenAiClient, UpstreamError};
pub use relay::{answer_chat, generate_report};
pub use service::{AppState, build_router, create_app};
