//! Shared fixtures: scripted generators and a loopback server helper.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{ Arc, Mutex };

use async_trait::async_trait;
use axum::Router;
use bytes::Bytes;
use futures::stream;

use chat_router::adapter::ChatAdapter;
use chat_router::error::ChatError;
use chat_router::llm::chat::{ ByteStream, GenerationRequest, StreamGenerator };
use chat_router::llm::BackendKind;

pub enum Script {
    Chunks(Vec<&'static str>),
    /// Emits the chunks, then fails mid-stream.
    Truncated(Vec<&'static str>),
    /// Fails before the first byte.
    Fail,
}

/// Generator that records every request and replays a fixed script.
pub struct ScriptedGenerator {
    backend: BackendKind,
    script: Script,
    calls: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new(backend: BackendKind, script: Script) -> Arc<Self> {
        Arc::new(Self { backend, script, calls: Mutex::new(Vec::new()) })
    }

    pub fn calls(&self) -> Vec<GenerationRequest> {
        self.calls.lock().unwrap().clone()
    }
}

fn to_items(chunks: &[&'static str]) -> Vec<Result<Bytes, ChatError>> {
    chunks.iter().map(|c| Ok(Bytes::from_static(c.as_bytes()))).collect()
}

#[async_trait]
impl StreamGenerator for ScriptedGenerator {
    fn backend(&self) -> BackendKind {
        self.backend
    }

    async fn generate(&self, request: GenerationRequest) -> Result<ByteStream, ChatError> {
        self.calls.lock().unwrap().push(request);
        match &self.script {
            Script::Chunks(chunks) => Ok(Box::pin(stream::iter(to_items(chunks)))),
            Script::Truncated(chunks) => {
                let mut items = to_items(chunks);
                items.push(Err(ChatError::NoReadableBody));
                Ok(Box::pin(stream::iter(items)))
            }
            Script::Fail => Err(ChatError::MissingCredential("TEST_KEY")),
        }
    }
}

pub struct Fixture {
    pub primary: Arc<ScriptedGenerator>,
    pub secondary: Arc<ScriptedGenerator>,
    pub adapter: Arc<ChatAdapter>,
}

pub fn fixture(primary: Script, secondary: Script) -> Fixture {
    let primary = ScriptedGenerator::new(BackendKind::WorkersAi, primary);
    let secondary = ScriptedGenerator::new(BackendKind::Gemini, secondary);
    let adapter = Arc::new(ChatAdapter::new(primary.clone(), secondary.clone()));
    Fixture { primary, secondary, adapter }
}

/// Serves `app` on an ephemeral loopback port.
pub async fn spawn(app: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
