use async_trait::async_trait;
use log::info;
use reqwest::Client as HttpClient;
use serde::Serialize;
use std::sync::Arc;

use super::{ body_stream, send_upstream, ByteStream, GenerationRequest, StreamGenerator };
use crate::error::ChatError;
use crate::llm::{ endpoint, BackendKind, UpstreamPolicy, WorkersAiConfig };
use crate::models::chat::ChatMessage;

/// Input accepted by the on-platform inference service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferenceRequest {
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

/// Binding to the inference service. The stream it returns is relayed as-is.
#[async_trait]
pub trait InferenceClient: Send + Sync {
    async fn run(&self, model_id: &str, request: InferenceRequest) -> Result<ByteStream, ChatError>;
}

/// Workers AI over its REST API.
pub struct WorkersAiClient {
    http: HttpClient,
    config: WorkersAiConfig,
    policy: UpstreamPolicy,
}

impl WorkersAiClient {
    pub fn new(http: HttpClient, config: WorkersAiConfig, policy: UpstreamPolicy) -> Self {
        Self { http, config, policy }
    }
}

#[async_trait]
impl InferenceClient for WorkersAiClient {
    async fn run(&self, model_id: &str, request: InferenceRequest) -> Result<ByteStream, ChatError> {
        let account_id = self.config.account_id
            .as_deref()
            .ok_or(ChatError::MissingCredential("CLOUDFLARE_ACCOUNT_ID"))?;
        let api_token = self.config.api_token
            .as_deref()
            .ok_or(ChatError::MissingCredential("CLOUDFLARE_API_TOKEN"))?;

        let url = endpoint(
            &self.config.base_url,
            &format!("accounts/{}/ai/run/{}", account_id, model_id)
        );
        info!("WorkersAiClient::run() → model={} messages={}", model_id, request.messages.len());

        let response = send_upstream(
            self.http.post(&url).bearer_auth(api_token).json(&request),
            self.policy,
        ).await?;

        Ok(body_stream(response, self.policy.idle_timeout))
    }
}

/// Primary generator: shapes parameters and hands back the inference stream untouched.
pub struct WorkersAiGenerator {
    client: Arc<dyn InferenceClient>,
    model_id: String,
}

impl WorkersAiGenerator {
    pub fn new(client: Arc<dyn InferenceClient>, model_id: String) -> Self {
        Self { client, model_id }
    }
}

#[async_trait]
impl StreamGenerator for WorkersAiGenerator {
    fn backend(&self) -> BackendKind {
        BackendKind::WorkersAi
    }

    async fn generate(&self, request: GenerationRequest) -> Result<ByteStream, ChatError> {
        let GenerationRequest { messages, sampling } = request;
        let inference = InferenceRequest {
            messages,
            stream: true,
            temperature: sampling.temperature,
            top_k: sampling.top_k,
            top_p: sampling.top_p,
        };
        self.client.run(&self.model_id, inference).await
    }
}
