use serde::{ Serialize, Deserialize };

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful, friendly assistant. Provide concise and accurate responses.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}

/// Optional sampling knobs sent by the browser client. Absent fields are never
/// forwarded upstream.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SamplingParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
}

impl SamplingParams {
    pub fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.top_k.is_none() && self.top_p.is_none()
    }
}

/// Body of `POST /api/chat`.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(flatten)]
    pub sampling: SamplingParams,
}

/// Prepends `system_prompt` unless the conversation already carries a system message.
pub fn ensure_system_prompt(mut messages: Vec<ChatMessage>, system_prompt: &str) -> Vec<ChatMessage> {
    if !messages.iter().any(|m| m.role == Role::System) {
        messages.insert(0, ChatMessage::system(system_prompt));
    }
    messages
}

/// Role-stripped, newline-joined prompt for backends that take a single text input.
pub fn flatten_prompt(messages: &[ChatMessage]) -> String {
    messages
        .iter()
        .map(|m| m.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}
