// Image caption form host.
//
// Serves the caption form and forwards submissions to a caption endpoint
// (POST /caption, multipart field "image").

use std::sync::Arc;

use anyhow::{Context, Result};
use caption_form::{web, Config, FormController, HttpCaptionClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let client = HttpCaptionClient::new(config.caption_endpoint.clone());
    tracing::info!("📸 Captions come from {}", client.endpoint());
    let controller = FormController::spawn(Arc::new(client));
    let app = web::router(controller, config.max_upload_bytes);

    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.listen_addr))?;

    tracing::info!("🚀 Caption form running on http://{}", config.listen_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
