use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::{error, info};

use crate::{
    conversation::{ChatReply, ChatRequest},
    error::ChatError,
    session::ChatInference,
};

/// Calls a chat inference endpoint speaking `{message, chatHistory}` → `{reply}`.
#[derive(Clone)]
pub struct HttpChatClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpChatClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            endpoint: endpoint.into(),
            api_key: None,
        }
    }

    /// Sent both as a bearer token and as an `apikey` header.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatInference for HttpChatClient {
    async fn send(&self, request: &ChatRequest) -> Result<String, ChatError> {
        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(key) = &self.api_key {
            builder = builder
                .header("Authorization", format!("Bearer {}", key))
                .header("apikey", key);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = error_message(&body).unwrap_or_else(|| format!("HTTP {}", status));
            error!("Chat endpoint returned {}: {}", status, message);
            return Err(ChatError::Upstream(message));
        }

        let reply: ChatReply = response.json().await?;
        info!("Received chat reply ({} characters)", reply.reply.len());
        Ok(reply.reply)
    }
}

/// Extracts `error`, `error.message` or `message` from an error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    value["error"]
        .as_str()
        .or_else(|| value["error"]["message"].as_str())
        .or_else(|| value["message"].as_str())
        .map(str::to_string)
}
