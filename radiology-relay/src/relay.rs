use radiology_core::{ChatRequest, ReportRequest};
use tracing::{info, warn};

use crate::{
    config::RelayConfig,
    error::{RelayError, ReportResult},
    openai::{CompletionBackend, CompletionRequest, ContentPart, Message},
};

pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful radiology assistant for doctors and patients. \
Answer questions about medical imaging, radiological findings and related conditions clearly and accurately. \
Use markdown for structure where it helps. \
Remind users that your answers are informational and do not replace a consultation with a qualified physician.";

fn require_api_key(config: &RelayConfig) -> Result<&str, RelayError> {
    config
        .api_key
        .as_deref()
        .ok_or(RelayError::MissingCredential)
}

/// Turns one report request into exactly one multimodal completion call.
pub async fn generate_report(
    config: &RelayConfig,
    backend: &dyn CompletionBackend,
    request: &ReportRequest,
) -> ReportResult {
    let api_key = require_api_key(config).inspect_err(|_| {
        warn!("Report requested but no OpenAI API key is configured");
    })?;
    let image_url = request.image_reference().ok_or(RelayError::MissingImage)?;

    info!(
        "Generating report for patient {}",
        request.patient_id.as_deref().unwrap_or("N/A")
    );

    let completion = CompletionRequest {
        model: config.report_model.clone(),
        messages: vec![Message::multimodal(vec![
            ContentPart::text(request.prompt()),
            ContentPart::image(image_url),
        ])],
        max_tokens: config.report_max_tokens,
    };

    let report = backend.complete(api_key, &completion).await?;
    info!("Report generated ({} characters)", report.len());
    Ok(report)
}

/// Answers one chat turn: system prompt, prior history, then the new message.
pub async fn answer_chat(
    config: &RelayConfig,
    backend: &dyn CompletionBackend,
    request: &ChatRequest,
) -> Result<String, RelayError> {
    let api_key = require_api_key(config)?;
    if request.message.trim().is_empty() {
        return Err(RelayError::MissingMessage);
    }

    let mut messages = Vec::with_capacity(request.chat_history.len() + 2);
    messages.push(Message::new("system", CHAT_SYSTEM_PROMPT));
    messages.extend(request.chat_history.iter().map(Message::from));
    messages.push(Message::new("user", request.message.clone()));

    let completion = CompletionRequest {
        model: config.chat_model.clone(),
        messages,
        max_tokens: config.chat_max_tokens,
    };

    Ok(backend.complete(api_key, &completion).await?)
}
