use crate::adapter::ChatAdapter;
use axum::{
    body::Bytes,
    extract::{ DefaultBodyLimit, Request, State },
    http::StatusCode,
    response::{ IntoResponse, Response },
    routing::post,
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeDir;

pub const API_PREFIX: &str = "/api/";
pub const CHAT_PATH: &str = "/api/chat";

const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Knobs for [`build_router`] that are not part of the chat adapter itself.
#[derive(Debug, Clone)]
pub struct RouterOptions {
    pub assets_dir: PathBuf,
    pub max_body_bytes: usize,
}

impl Default for RouterOptions {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("public"),
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

#[derive(Clone)]
struct AppState {
    adapter: Arc<ChatAdapter>,
    assets: ServeDir,
}

/// `/api/chat` goes to the adapter (POST only, anything else is 405), the rest of
/// `/api/` is 404, and every other path is served from the assets directory as-is.
pub fn build_router(adapter: Arc<ChatAdapter>, options: RouterOptions) -> Router {
    let state = AppState {
        adapter,
        assets: ServeDir::new(&options.assets_dir),
    };

    Router::new()
        .route(CHAT_PATH, post(chat_handler).fallback(method_not_allowed))
        .route_layer(DefaultBodyLimit::max(options.max_body_bytes))
        .fallback(fallback_handler)
        .with_state(state)
}

async fn chat_handler(State(state): State<AppState>, body: Bytes) -> Response {
    state.adapter.handle(&body).await
}

async fn method_not_allowed() -> impl IntoResponse {
    StatusCode::METHOD_NOT_ALLOWED
}

async fn fallback_handler(State(state): State<AppState>, request: Request) -> Response {
    if request.uri().path().starts_with(API_PREFIX) {
        return StatusCode::NOT_FOUND.into_response();
    }

    match state.assets.oneshot(request).await {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}
