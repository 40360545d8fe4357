//! ChatSession against a live router with scripted backends.

mod common;

use std::net::SocketAddr;

use url::Url;

use chat_router::client::{ ChatSession, APOLOGY };
use chat_router::models::chat::{ ChatMessage, Role, SamplingParams, DEFAULT_SYSTEM_PROMPT };
use chat_router::server::api::{ build_router, RouterOptions };
use common::{ fixture, spawn, Fixture, Script };

async fn serve(fx: &Fixture) -> SocketAddr {
    spawn(build_router(fx.adapter.clone(), RouterOptions::default())).await
}

fn session(addr: SocketAddr) -> ChatSession {
    let endpoint = Url::parse(&format!("http://{}/api/chat", addr)).unwrap();
    ChatSession::new(reqwest::Client::new(), endpoint)
}

#[tokio::test]
async fn reply_is_concatenated_and_appended_after_completion() {
    let fx = fixture(Script::Chunks(vec!["Hel", "lo ", "world"]), Script::Fail);
    let mut chat = session(serve(&fx).await);

    let mut renders = Vec::new();
    let reply = chat.send("Hi", |text| renders.push(text.to_string())).await;

    assert_eq!(reply, "Hello world");
    assert_eq!(renders.last().map(String::as_str), Some("Hello world"));
    assert!(renders.windows(2).all(|w| w[1].starts_with(&w[0])));
    assert_eq!(chat.history(), &[ChatMessage::user("Hi"), ChatMessage::assistant("Hello world")]);

    let calls = fx.primary.calls();
    assert_eq!(calls[0].messages, vec![ChatMessage::system(DEFAULT_SYSTEM_PROMPT), ChatMessage::user("Hi")]);
}

#[tokio::test]
async fn follow_up_sends_whole_transcript() {
    let fx = fixture(Script::Chunks(vec!["ok"]), Script::Fail);
    let mut chat = session(serve(&fx).await);

    chat.send("one", |_| {}).await;
    chat.send("two", |_| {}).await;

    let calls = fx.primary.calls();
    assert_eq!(calls.len(), 2);
    let second: Vec<(Role, &str)> = calls[1].messages.iter().map(|m| (m.role, m.content.as_str())).collect();
    assert_eq!(
        second,
        vec![
            (Role::System, DEFAULT_SYSTEM_PROMPT),
            (Role::User, "one"),
            (Role::Assistant, "ok"),
            (Role::User, "two"),
        ]
    );
}

#[tokio::test]
async fn model_and_sampling_are_forwarded() {
    let fx = fixture(Script::Fail, Script::Chunks(vec!["data: hi\n\n"]));
    let sampling = SamplingParams { temperature: Some(0.7), top_k: None, top_p: Some(0.9) };
    let mut chat = session(serve(&fx).await)
        .with_model("gemini")
        .with_sampling(sampling.clone());

    let reply = chat.send("Hi", |_| {}).await;
    assert_eq!(reply, "data: hi\n\n");
    assert!(fx.primary.calls().is_empty());
    assert_eq!(fx.secondary.calls()[0].sampling, sampling);
}

#[tokio::test]
async fn server_error_renders_apology_and_keeps_transcript_clean() {
    let fx = fixture(Script::Fail, Script::Fail);
    let mut chat = session(serve(&fx).await);

    let mut renders = Vec::new();
    let reply = chat.send("Hi", |text| renders.push(text.to_string())).await;

    assert_eq!(reply, APOLOGY);
    assert_eq!(renders, vec![APOLOGY.to_string()]);
    assert_eq!(chat.history(), &[ChatMessage::user("Hi")]);
}

#[tokio::test]
async fn truncated_stream_is_not_appended() {
    let fx = fixture(Script::Truncated(vec!["partial"]), Script::Fail);
    let mut chat = session(serve(&fx).await);

    let reply = chat.send("Hi", |_| {}).await;
    assert_eq!(reply, APOLOGY);
    assert!(chat.history().iter().all(|m| m.role != Role::Assistant));
}

#[tokio::test]
async fn unreachable_server_renders_apology() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut chat = session(addr);
    let reply = chat.send("Hi", |_| {}).await;
    assert_eq!(reply, APOLOGY);
}
