pub mod adapter;
pub mod cli;
pub mod client;
pub mod error;
pub mod llm;
pub mod models;
pub mod server;

use adapter::ChatAdapter;
use cli::Args;
use llm::chat::new_generators;
use llm::{ GeminiConfig, UpstreamPolicy, WorkersAiConfig };
use log::info;
use server::Server;
use std::error::Error;
use std::sync::Arc;

fn set_or_unset(value: &str) -> &'static str {
    if value.trim().is_empty() { "unset" } else { "set" }
}

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    info!("--- Core Configuration ---");
    info!("Server Address: {}", args.server_addr);
    info!("Assets Directory: {}", args.assets_dir);
    info!("Workers AI Base URL: {}", args.workers_ai_base_url);
    info!("Workers AI Model: {}", args.workers_ai_model);
    info!("Workers AI Account ID: {}", set_or_unset(&args.workers_ai_account_id));
    info!("Workers AI API Token: {}", set_or_unset(&args.workers_ai_api_token));
    info!("Gemini Base URL: {}", args.gemini_base_url);
    info!("Gemini Model: {}", args.gemini_model);
    info!("Gemini API Key: {}", set_or_unset(&args.gemini_api_key));
    info!("Upstream Timeout (s): {}", args.upstream_timeout_secs);
    info!("Stream Idle Timeout (s): {}", args.stream_idle_timeout_secs);
    info!("Detailed Error Status: {}", args.detailed_error_status);
    info!("TLS Enabled: {}", args.enable_tls);
    info!("-------------------------");

    let workers_ai = WorkersAiConfig::from_args(&args)
        .map_err(|e| format!("Invalid WORKERS_AI_BASE_URL '{}': {}", args.workers_ai_base_url, e))?;
    let gemini = GeminiConfig::from_args(&args)
        .map_err(|e| format!("Invalid GEMINI_BASE_URL '{}': {}", args.gemini_base_url, e))?;
    let (primary, secondary) = new_generators(workers_ai, gemini, UpstreamPolicy::from_args(&args))?;

    let adapter = ChatAdapter::new(primary, secondary)
        .with_system_prompt(args.system_prompt.clone())
        .with_detailed_error_status(args.detailed_error_status);

    let addr = args.server_addr.clone();
    info!("Starting server on: {}", addr);
    let server = Server::new(addr, Arc::new(adapter), args);
    server.run().await?;

    Ok(())
}
