use async_trait::async_trait;
use log::info;
use reqwest::Client as HttpClient;
use serde::Serialize;

use super::{ body_stream, send_upstream, ByteStream, GenerationRequest, StreamGenerator };
use crate::error::ChatError;
use crate::llm::sse::sse_frames;
use crate::llm::{ endpoint, BackendKind, GeminiConfig, UpstreamPolicy };
use crate::models::chat::{ flatten_prompt, SamplingParams };

pub const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Serialize)]
pub struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
}

impl GeminiRequest {
    /// Single-turn request carrying the whole conversation as one text part.
    pub fn new(prompt: String, sampling: &SamplingParams) -> Self {
        let generation_config = (!sampling.is_empty()).then(|| GenerationConfig {
            temperature: sampling.temperature,
            top_k: sampling.top_k,
            top_p: sampling.top_p,
        });

        Self {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart { text: prompt }],
            }],
            generation_config,
        }
    }
}

/// Secondary generator. Gemini receives a flattened prompt and its raw response
/// bytes are re-framed as SSE.
pub struct GeminiGenerator {
    http: HttpClient,
    config: GeminiConfig,
    policy: UpstreamPolicy,
}

impl GeminiGenerator {
    pub fn new(http: HttpClient, config: GeminiConfig, policy: UpstreamPolicy) -> Self {
        Self { http, config, policy }
    }
}

#[async_trait]
impl StreamGenerator for GeminiGenerator {
    fn backend(&self) -> BackendKind {
        BackendKind::Gemini
    }

    async fn generate(&self, request: GenerationRequest) -> Result<ByteStream, ChatError> {
        let api_key = self.config.api_key
            .as_deref()
            .ok_or(ChatError::MissingCredential("GEMINI_API_KEY"))?;

        let prompt = flatten_prompt(&request.messages);
        let payload = GeminiRequest::new(prompt, &request.sampling);
        let url = endpoint(
            &self.config.base_url,
            &format!("models/{}:generateContent", self.config.model)
        );
        info!(
            "GeminiGenerator::generate() → model={} messages={}",
            self.config.model,
            request.messages.len()
        );

        let response = send_upstream(
            self.http.post(&url).header(API_KEY_HEADER, api_key).json(&payload),
            self.policy,
        ).await?;

        Ok(sse_frames(body_stream(response, self.policy.idle_timeout)))
    }
}
