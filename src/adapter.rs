use axum::body::Body;
use axum::http::{ header, StatusCode };
use axum::response::{ IntoResponse, Response };
use axum::Json;
use futures::TryStreamExt;
use log::{ error, info, warn };
use std::sync::Arc;
use uuid::Uuid;

use crate::error::ChatError;
use crate::llm::chat::{ ByteStream, GenerationRequest, StreamGenerator };
use crate::llm::BackendKind;
use crate::models::api::ErrorBody;
use crate::models::chat::{ ensure_system_prompt, ChatRequest, DEFAULT_SYSTEM_PROMPT };

/// Normalizes chat requests and hands them to the backend named by `model`.
#[derive(Clone)]
pub struct ChatAdapter {
    primary: Arc<dyn StreamGenerator>,
    secondary: Arc<dyn StreamGenerator>,
    system_prompt: String,
    detailed_error_status: bool,
}

impl ChatAdapter {
    pub fn new(primary: Arc<dyn StreamGenerator>, secondary: Arc<dyn StreamGenerator>) -> Self {
        Self {
            primary,
            secondary,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            detailed_error_status: false,
        }
    }

    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Answer pre-stream failures with the status of their error class instead of 500.
    pub fn with_detailed_error_status(mut self, enabled: bool) -> Self {
        self.detailed_error_status = enabled;
        self
    }

    pub fn generator(&self, backend: BackendKind) -> &Arc<dyn StreamGenerator> {
        match backend {
            BackendKind::Gemini => &self.secondary,
            BackendKind::WorkersAi => &self.primary,
        }
    }

    /// Turns a raw request body into a streamed SSE response, or the generic JSON
    /// error when anything fails before the first byte.
    pub async fn handle(&self, body: &[u8]) -> Response {
        let request_id = Uuid::new_v4().to_string();

        match self.open_stream(&request_id, body).await {
            Ok(stream) => {
                let stream = stream.inspect_err(move |e| {
                    warn!("[{}] Stream terminated early: {}", request_id, e);
                });
                (
                    StatusCode::OK,
                    [
                        (header::CONTENT_TYPE, "text/event-stream"),
                        (header::CACHE_CONTROL, "no-cache"),
                        (header::CONNECTION, "keep-alive"),
                    ],
                    Body::from_stream(stream),
                ).into_response()
            }
            Err(e) => {
                error!("[{}] Error processing chat request: {}", request_id, e);
                let status = if self.detailed_error_status {
                    e.status_code()
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                };
                (status, Json(ErrorBody::default())).into_response()
            }
        }
    }

    async fn open_stream(&self, request_id: &str, body: &[u8]) -> Result<ByteStream, ChatError> {
        let request: ChatRequest = serde_json::from_slice(body)?;
        let generator = self.generator(BackendKind::from_model(request.model.as_deref()));
        let messages = ensure_system_prompt(request.messages, &self.system_prompt);

        info!("[{}] Chat request → backend={} messages={}", request_id, generator.backend(), messages.len());

        generator
            .generate(GenerationRequest { messages, sampling: request.sampling })
            .await
    }
}
