use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::{
        HeaderValue, StatusCode,
        header::{
            ACCESS_CONTROL_ALLOW_HEADERS, ACCESS_CONTROL_ALLOW_METHODS,
            ACCESS_CONTROL_ALLOW_ORIGIN,
        },
    },
    response::Json,
    routing::{get, post},
};
use radiology_core::{ChatReply, ChatRequest, ReportRequest};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    config::RelayConfig,
    error::RelayError,
    models::{HealthResponse, ReportResponse},
    openai::{CompletionBackend, OpenAiClient},
    relay::{answer_chat, generate_report},
};

pub const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";
pub const ALLOWED_METHODS: &str = "POST, OPTIONS";

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<Value>)>;
type ApiError = (StatusCode, Json<Value>);

fn relay_error(err: RelayError) -> ApiError {
    let status = if err.is_request_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    error!("Relay request failed ({}): {}", status, err);
    (status, Json(json!({ "error": err.to_string() })))
}

/// Unreadable bodies are relay failures, not validation errors.
fn body_error(rejection: JsonRejection) -> ApiError {
    relay_error(RelayError::transport(rejection.body_text()))
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RelayConfig>,
    pub backend: Arc<dyn CompletionBackend>,
}

impl AppState {
    pub fn new(config: RelayConfig, backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            config: Arc::new(config),
            backend,
        }
    }
}

pub fn create_app(config: RelayConfig) -> reqwest::Result<Router> {
    let backend = Arc::new(OpenAiClient::from_config(&config)?);
    Ok(build_router(AppState::new(config, backend)))
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/generate-report", post(report).options(preflight))
        .route("/chat", post(chat).options(preflight))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOWED_METHODS),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Radiology Assistant Relay",
        "version": "0.1.0",
        "description": "AI-assisted radiology report generation and assistant chat",
        "endpoints": {
            "POST /generate-report": "Generate a radiology report from an image URL",
            "POST /chat": "Answer a chat message given the prior conversation",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// CORS preflight; answered before any other handling.
async fn preflight() -> StatusCode {
    StatusCode::OK
}

async fn report(
    State(state): State<AppState>,
    payload: Result<Json<ReportRequest>, JsonRejection>,
) -> ApiResult<ReportResponse> {
    let Json(request) = payload.map_err(body_error)?;
    info!(
        "Report request received (image provided: {})",
        request.image_url.is_some()
    );

    let report = generate_report(&state.config, state.backend.as_ref(), &request)
        .await
        .map_err(relay_error)?;

    Ok(Json(ReportResponse { report }))
}

async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<ChatReply> {
    let Json(request) = payload.map_err(body_error)?;
    info!(
        "Chat request received with {} history turns",
        request.chat_history.len()
    );

    let reply = answer_chat(&state.config, state.backend.as_ref(), &request)
        .await
        .map_err(relay_error)?;

    Ok(Json(ChatReply { reply }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::UpstreamError;
    use crate::relay::tests::StubBackend;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, Response},
    };
    use tower::ServiceExt;

    fn router_with(config: RelayConfig, backend: Arc<StubBackend>) -> Router {
        build_router(AppState::new(config, backend))
    }

    fn configured() -> RelayConfig {
        RelayConfig::default().with_api_key("sk-test")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: Response<Body>) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn assert_cors(response: &Response<Body>) {
        let headers = response.headers();
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_HEADERS], ALLOWED_HEADERS);
        assert_eq!(headers[ACCESS_CONTROL_ALLOW_METHODS], ALLOWED_METHODS);
    }

    #[tokio::test]
    async fn test_preflight_is_empty_ok_with_cors() {
        // No credential configured: the preflight must still succeed.
        let backend = Arc::new(StubBackend::replying("unused"));
        let app = router_with(RelayConfig::default(), backend.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/generate-report")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_preflight_is_empty_ok_with_cors() {
        let backend = Arc::new(StubBackend::replying("unused"));
        let app = router_with(RelayConfig::default(), backend.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::OPTIONS)
                    .uri("/chat")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.is_empty());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_report_success() {
        let backend = Arc::new(StubBackend::replying("# Radiology Report"));
        let app = router_with(configured(), backend.clone());

        let response = app
            .oneshot(post_json(
                "/generate-report",
                json!({"imageUrl": "https://img/ct.png", "patientName": "Lee", "patientId": "9"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        assert_eq!(body_json(response).await, json!({"report": "# Radiology Report"}));
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_report_without_image_is_bad_request() {
        let backend = Arc::new(StubBackend::replying("unused"));
        let app = router_with(configured(), backend.clone());

        let response = app
            .oneshot(post_json("/generate-report", json!({"patientName": "Lee"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_cors(&response);
        assert_eq!(body_json(response).await, json!({"error": "Image URL is required"}));
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_report_without_credential_is_server_error() {
        let backend = Arc::new(StubBackend::replying("unused"));
        let app = router_with(RelayConfig::default(), backend.clone());

        let response = app
            .oneshot(post_json("/generate-report", json!({"imageUrl": "https://img/1.png"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&response);
        assert_eq!(
            body_json(response).await,
            json!({"error": "OpenAI API key is not configured"})
        );
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_report_upstream_error() {
        let backend = Arc::new(StubBackend::failing(UpstreamError::Api("X".to_string())));
        let app = router_with(configured(), backend);

        let response = app
            .oneshot(post_json("/generate-report", json!({"imageUrl": "https://img/1.png"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_cors(&response);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("OpenAI API error: X"));
    }

    #[tokio::test]
    async fn test_report_unreadable_body_is_server_error() {
        let backend = Arc::new(StubBackend::replying("unused"));
        let app = router_with(configured(), backend.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/generate-report")
                    .header("content-type", "application/json")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(!body["error"].as_str().unwrap().is_empty());
        assert_eq!(backend.call_count(), 0);
    }

    #[tokio::test]
    async fn test_chat_endpoint() {
        let backend = Arc::new(StubBackend::replying("cardiomegaly is enlargement..."));
        let app = router_with(configured(), backend.clone());

        let response = app
            .oneshot(post_json(
                "/chat",
                json!({"message": "What causes cardiomegaly?", "chatHistory": []}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        // Formatting is applied by the chat session, not the relay.
        assert_eq!(
            body_json(response).await,
            json!({"reply": "cardiomegaly is enlargement..."})
        );
        assert_eq!(backend.call_count(), 1);
    }

    #[tokio::test]
    async fn test_health() {
        let app = router_with(configured(), Arc::new(StubBackend::replying("unused")));

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "healthy");
    }
}
