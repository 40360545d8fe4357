pub mod chat;
pub mod sse;

use crate::cli::Args;
use std::fmt;
use std::time::Duration;
use url::Url;

pub const DEFAULT_WORKERS_AI_MODEL: &str = "@cf/meta/llama-3.3-70b-instruct-fp8-fast";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Which upstream a chat request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    WorkersAi,
    Gemini,
}

impl BackendKind {
    /// Only an exact `"gemini"` selects Gemini; anything else, including absence,
    /// goes to Workers AI.
    pub fn from_model(model: Option<&str>) -> Self {
        match model {
            Some("gemini") => BackendKind::Gemini,
            _ => BackendKind::WorkersAi,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendKind::WorkersAi => write!(f, "workers-ai"),
            BackendKind::Gemini => write!(f, "gemini"),
        }
    }
}

/// Timeouts applied to every upstream call. `None` disables the bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpstreamPolicy {
    pub response_timeout: Option<Duration>,
    pub idle_timeout: Option<Duration>,
}

impl UpstreamPolicy {
    pub fn from_args(args: &Args) -> Self {
        Self {
            response_timeout: secs(args.upstream_timeout_secs),
            idle_timeout: secs(args.stream_idle_timeout_secs),
        }
    }
}

fn secs(value: u64) -> Option<Duration> {
    (value > 0).then(|| Duration::from_secs(value))
}

#[derive(Debug, Clone)]
pub struct WorkersAiConfig {
    pub base_url: Url,
    pub account_id: Option<String>,
    pub api_token: Option<String>,
    pub model: String,
}

impl WorkersAiConfig {
    pub fn from_args(args: &Args) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(&args.workers_ai_base_url)?,
            account_id: non_empty(&args.workers_ai_account_id),
            api_token: non_empty(&args.workers_ai_api_token),
            model: args.workers_ai_model.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub base_url: Url,
    pub api_key: Option<String>,
    pub model: String,
}

impl GeminiConfig {
    pub fn from_args(args: &Args) -> Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(&args.gemini_base_url)?,
            api_key: non_empty(&args.gemini_api_key),
            model: args.gemini_model.clone(),
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    Some(value.trim().to_string()).filter(|v| !v.is_empty())
}

/// Joins `path` onto `base` without dropping the base's own path segments.
pub(crate) fn endpoint(base: &Url, path: &str) -> String {
    format!("{}/{}", base.as_str().trim_end_matches('/'), path.trim_start_matches('/'))
}
