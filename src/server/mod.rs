pub mod api;

use crate::adapter::ChatAdapter;
use crate::cli::Args;
use api::{ build_router, RouterOptions };
use axum_server::tls_rustls::RustlsConfig;
use axum_server::Handle;
use log::{ info, warn };
use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

const TLS_PATHS_REQUIRED: &str =
    "Both --tls-cert-path and --tls-key-path must be provided to enable TLS.";

pub struct Server {
    addr: String,
    adapter: Arc<ChatAdapter>,
    args: Args,
}

impl Server {
    pub fn new(addr: String, adapter: Arc<ChatAdapter>, args: Args) -> Self {
        Self { addr, adapter, args }
    }

    pub async fn run(&self) -> Result<(), Box<dyn Error + Send + Sync>> {
        let addr = self.addr.parse::<SocketAddr>()?;
        let app = build_router(self.adapter.clone(), RouterOptions {
            assets_dir: PathBuf::from(&self.args.assets_dir),
            max_body_bytes: self.args.max_body_bytes,
        });

        if self.args.enable_tls {
            let (cert_path, key_path) = match (&self.args.tls_cert_path, &self.args.tls_key_path) {
                (Some(cert), Some(key)) => (cert, key),
                _ => return Err(TLS_PATHS_REQUIRED.into()),
            };
            info!("TLS enabled. Loading certificate from '{}' and key from '{}'", cert_path, key_path);
            let tls_config = RustlsConfig::from_pem_file(cert_path, key_path).await?;

            let handle = Handle::new();
            let shutdown_handle = handle.clone();
            tokio::spawn(async move {
                shutdown_signal().await;
                shutdown_handle.graceful_shutdown(None);
            });

            info!("HTTPS server listening on: https://{}", addr);
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        } else {
            let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
                format!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e)
            })?;
            info!("HTTP server listening on: http://{}", listener.local_addr()?);
            axum::serve(listener, app.into_make_service())
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }

        info!("Server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}
