//! Consumer side of `/api/chat`: keeps the transcript and rebuilds the assistant
//! reply from the streamed body.

use futures::StreamExt;
use log::{ debug, error };
use reqwest::Client as HttpClient;
use url::Url;

use crate::llm::sse::Utf8Decoder;
use crate::models::chat::{ ChatMessage, ChatRequest, Role, SamplingParams };

pub const APOLOGY: &str = "Sorry, there was an error processing your request.";

/// In-memory transcript for one conversation. Lost when dropped.
pub struct ChatSession {
    http: HttpClient,
    endpoint: Url,
    model: Option<String>,
    sampling: SamplingParams,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    /// `endpoint` is the full chat URL, e.g. `http://127.0.0.1:8787/api/chat`.
    pub fn new(http: HttpClient, endpoint: Url) -> Self {
        Self {
            http,
            endpoint,
            model: None,
            sampling: SamplingParams::default(),
            history: Vec::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingParams) -> Self {
        self.sampling = sampling;
        self
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Sends `text` as the next user turn. `render` sees the full reply so far after
    /// every chunk, or the apology if the exchange fails. The reply joins the
    /// transcript only once the stream has completed.
    pub async fn send<F>(&mut self, text: &str, mut render: F) -> String
        where F: FnMut(&str)
    {
        self.history.push(ChatMessage::user(text));

        match self.stream_reply(&mut render).await {
            Ok(reply) => {
                self.history.push(ChatMessage::assistant(reply.clone()));
                reply
            }
            Err(e) => {
                error!("Chat exchange failed: {}", e);
                render(APOLOGY);
                APOLOGY.to_string()
            }
        }
    }

    async fn stream_reply<F>(&self, render: &mut F) -> Result<String, reqwest::Error>
        where F: FnMut(&str)
    {
        let request = ChatRequest {
            messages: self.history
                .iter()
                .filter(|m| m.role != Role::System)
                .cloned()
                .collect(),
            model: self.model.clone(),
            sampling: self.sampling.clone(),
        };

        let response = self.http
            .post(self.endpoint.clone())
            .json(&request)
            .send().await?
            .error_for_status()?;

        let mut body = Box::pin(response.bytes_stream());
        let mut decoder = Utf8Decoder::new();
        let mut reply = String::new();

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            debug!("Received {} bytes", chunk.len());
            reply.push_str(&decoder.decode(&chunk));
            render(&reply);
        }
        if let Some(rest) = decoder.finish() {
            reply.push_str(&rest);
            render(&reply);
        }

        Ok(reply)
    }
}
