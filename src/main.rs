//! Flowchart API server.
//!
//! ```bash
//! GROQ_API_KEY=... RUST_LOG=flowweave=debug cargo run
//! curl -X POST localhost:8000/generate/text -H 'content-type: application/json' \
//!   -d '{"text": "Start -> Check? -> End"}'
//! ```

use flowweave::config::{API_KEY_ENV, ServiceConfig};
use flowweave::server;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let config = ServiceConfig::from_env();
  if config.api_key.is_none() {
    tracing::warn!("{} is not set; prompt and image generation will fail", API_KEY_ENV);
  }
  tracing::info!(
    text_model = %config.text_model,
    vision_model = %config.vision_model,
    "starting flowchart API"
  );

  server::serve(config).await?;
  Ok(())
}
