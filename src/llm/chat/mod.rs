pub mod gemini;
pub mod workers_ai;

use async_trait::async_trait;
use bytes::Bytes;
use futures::{ stream, Stream, StreamExt };
use log::debug;
use reqwest::{ RequestBuilder, Response, StatusCode };
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use super::{ BackendKind, GeminiConfig, UpstreamPolicy, WorkersAiConfig };
use crate::error::ChatError;
use crate::models::chat::{ ChatMessage, SamplingParams };
use self::gemini::GeminiGenerator;
use self::workers_ai::{ WorkersAiClient, WorkersAiGenerator };

/// Bytes relayed to the browser, chunk by chunk.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, ChatError>> + Send>>;

/// What a generator needs from one chat request.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub messages: Vec<ChatMessage>,
    pub sampling: SamplingParams,
}

/// One upstream backend. Failures returned from `generate` happen before the first
/// byte and become an error response; failures inside the stream truncate it.
#[async_trait]
pub trait StreamGenerator: Send + Sync {
    fn backend(&self) -> BackendKind;

    async fn generate(&self, request: GenerationRequest) -> Result<ByteStream, ChatError>;
}

/// Builds both production generators sharing one HTTP connection pool.
pub fn new_generators(
    workers_ai: WorkersAiConfig,
    gemini: GeminiConfig,
    policy: UpstreamPolicy,
) -> Result<(Arc<dyn StreamGenerator>, Arc<dyn StreamGenerator>), ChatError> {
    let http = reqwest::Client::builder().build()?;
    let model = workers_ai.model.clone();
    let client = Arc::new(WorkersAiClient::new(http.clone(), workers_ai, policy));
    let primary: Arc<dyn StreamGenerator> = Arc::new(WorkersAiGenerator::new(client, model));
    let secondary: Arc<dyn StreamGenerator> = Arc::new(GeminiGenerator::new(http, gemini, policy));
    Ok((primary, secondary))
}

/// Sends an upstream request and waits for its headers, bounded by the policy's
/// response timeout. Only successful responses with a readable body get through.
pub async fn send_upstream(
    request: RequestBuilder,
    policy: UpstreamPolicy,
) -> Result<Response, ChatError> {
    let pending = request.send();
    let response = match policy.response_timeout {
        Some(limit) => tokio::time::timeout(limit, pending)
            .await
            .map_err(|_| ChatError::UpstreamTimeout(limit))??,
        None => pending.await?,
    };

    let status = response.status();
    if !status.is_success() {
        let message = error_text(response, policy.idle_timeout.or(policy.response_timeout)).await;
        return Err(ChatError::UpstreamStatus { status: status.as_u16(), message });
    }
    if has_no_body(&response) {
        return Err(ChatError::NoReadableBody);
    }

    debug!("Upstream responded {} (content-length: {:?})", status, response.content_length());
    Ok(response)
}

/// Reads an error body for logging. A body that stalls past `limit` is abandoned.
async fn error_text(response: Response, limit: Option<Duration>) -> String {
    match limit {
        Some(limit) => match tokio::time::timeout(limit, response.text()).await {
            Ok(text) => text.unwrap_or_default(),
            Err(_) => format!("<error body not received within {:?}>", limit),
        },
        None => response.text().await.unwrap_or_default(),
    }
}

fn has_no_body(response: &Response) -> bool {
    matches!(response.status(), StatusCode::NO_CONTENT | StatusCode::RESET_CONTENT)
        || response.content_length() == Some(0)
}

/// Exposes a response body as a pull-based chunk stream. A gap longer than
/// `idle_timeout` between chunks ends the stream with an error.
pub fn body_stream(response: Response, idle_timeout: Option<Duration>) -> ByteStream {
    let upstream = Box::pin(response.bytes_stream());

    Box::pin(stream::unfold(Some(upstream), move |state| async move {
        let mut upstream = state?;
        let next = match idle_timeout {
            Some(limit) => match tokio::time::timeout(limit, upstream.next()).await {
                Ok(next) => next,
                Err(_) => return Some((Err(ChatError::StreamIdle(limit)), None)),
            },
            None => upstream.next().await,
        };

        match next {
            Some(Ok(chunk)) => Some((Ok(chunk), Some(upstream))),
            Some(Err(e)) => Some((Err(ChatError::Stream(e)), None)),
            None => None,
        }
    }))
}
