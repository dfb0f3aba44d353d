//! dialtone-server binary.
//!
//! Reads `dialtone.toml` (or the path given with `--config`), layers
//! `DIALTONE_*` environment variables on top, and serves the carrier
//! webhooks plus the dashboard API over HTTP.

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use dialtone_core::credentials::Credentials;
use dialtone_registry::InMemoryRegistry;
use dialtone_webhook::{AppState, ServerConfig};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Dialtone telephony test server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "dialtone.toml", env = "DIALTONE_CONFIG")]
  config: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load config from {:?}", cli.config))?;

  let credentials = Credentials::from_env()
    .or(server_cfg.twilio.clone().unwrap_or_default());
  if !credentials.is_complete() {
    tracing::warn!(
      "carrier credentials incomplete; run `dialtone setup` to configure them"
    );
  }
  tracing::info!(
    account_sid = credentials.masked_sid().as_deref().unwrap_or("-"),
    auth_token = credentials.masked_token().as_deref().unwrap_or("-"),
    phone_number = credentials.phone_number.as_deref().unwrap_or("-"),
    "carrier credentials"
  );

  tracing::info!(
    base_url = %server_cfg.public_url(),
    max_active_calls = server_cfg.max_active_calls,
    static_dir = ?server_cfg.static_dir,
    "configuration loaded"
  );
  if !server_cfg.static_dir.join("audio").is_dir() {
    tracing::warn!(
      static_dir = ?server_cfg.static_dir,
      "no audio directory; music and beep playback will fail"
    );
  }

  let address = server_cfg.address();
  let app = dialtone_webhook::router(AppState::new(
    InMemoryRegistry::new(),
    server_cfg,
  ));

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  tracing::info!("server stopped");
  Ok(())
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!("failed to listen for shutdown signal: {e}");
    std::future::pending::<()>().await;
  }
}
