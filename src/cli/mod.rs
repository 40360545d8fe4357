use clap::Parser;

use crate::llm::{ DEFAULT_GEMINI_MODEL, DEFAULT_WORKERS_AI_MODEL };
use crate::models::chat::DEFAULT_SYSTEM_PROMPT;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Server Args ---
    /// Host address and port for the server to listen on.
    #[arg(long, env = "SERVER_ADDR", default_value = "127.0.0.1:8787")]
    pub server_addr: String,

    /// Directory served for every path outside /api/.
    #[arg(long, env = "ASSETS_DIR", default_value = "public")]
    pub assets_dir: String,

    /// Largest accepted /api/chat request body, in bytes.
    #[arg(long, env = "MAX_BODY_BYTES", default_value = "1048576")]
    pub max_body_bytes: usize,

    // --- Workers AI (primary backend) Args ---
    /// Base URL of the Workers AI REST API.
    #[arg(long, env = "WORKERS_AI_BASE_URL", default_value = "https://api.cloudflare.com/client/v4")]
    pub workers_ai_base_url: String,

    /// Cloudflare account id owning the Workers AI binding.
    #[arg(long, env = "CLOUDFLARE_ACCOUNT_ID", default_value = "")]
    pub workers_ai_account_id: String,

    /// API token with Workers AI permissions.
    #[arg(long, env = "CLOUDFLARE_API_TOKEN", default_value = "", hide_env_values = true)]
    pub workers_ai_api_token: String,

    /// Model id passed to Workers AI.
    #[arg(long, env = "WORKERS_AI_MODEL", default_value = DEFAULT_WORKERS_AI_MODEL)]
    pub workers_ai_model: String,

    // --- Gemini (secondary backend) Args ---
    /// Base URL of the Gemini generative language API.
    #[arg(long, env = "GEMINI_BASE_URL", default_value = "https://generativelanguage.googleapis.com/v1beta")]
    pub gemini_base_url: String,

    /// Gemini API key, sent in the x-goog-api-key header.
    #[arg(long, env = "GEMINI_API_KEY", default_value = "", hide_env_values = true)]
    pub gemini_api_key: String,

    /// Gemini model name (e.g., gemini-2.0-flash)
    #[arg(long, env = "GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    // --- Chat Args ---
    /// System message injected when a conversation carries none.
    #[arg(long, env = "SYSTEM_PROMPT", default_value = DEFAULT_SYSTEM_PROMPT)]
    pub system_prompt: String,

    /// Seconds to wait for upstream response headers. 0 disables the limit.
    #[arg(long, env = "UPSTREAM_TIMEOUT_SECS", default_value = "30")]
    pub upstream_timeout_secs: u64,

    /// Seconds allowed between two upstream chunks once streaming. 0 disables the limit.
    #[arg(long, env = "STREAM_IDLE_TIMEOUT_SECS", default_value = "60")]
    pub stream_idle_timeout_secs: u64,

    /// Answer failed chat requests with a status per error class (400, 502, 504)
    /// instead of always 500. The body stays generic either way.
    #[arg(long, env = "DETAILED_ERROR_STATUS", default_value = "false")]
    pub detailed_error_status: bool,

    // --- General App Args ---
    /// Enable debug logging/output
    #[arg(long, env = "DEBUG", default_value = "false")]
    pub debug: bool,

    /// Optional path to the TLS certificate file (PEM format) for enabling HTTPS. Requires --tls-key-path.
    #[arg(long, env = "TLS_CERT_PATH")]
    pub tls_cert_path: Option<String>,

    /// Optional path to the TLS private key file (PEM format) for enabling HTTPS. Requires --tls-cert-path.
    #[arg(long, env = "TLS_KEY_PATH")]
    pub tls_key_path: Option<String>,

    #[arg(long, env = "ENABLE_TLS", default_value = "false")]
    pub enable_tls: bool,
}
