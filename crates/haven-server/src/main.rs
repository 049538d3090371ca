//! Haven server binary.
//!
//! Reads `haven.toml` (or the path given with `--config`) plus `HAVEN_*`
//! environment variables, opens the SQLite store and serves the API, the edge
//! endpoints and the digest trigger over HTTP.
//!
//! Nested keys use a double underscore in the environment, e.g.
//! `HAVEN_EMAIL__API_KEY`.
//!
//! # PIN hash generation
//!
//! ```
//! cargo run -p haven-server --bin haven -- --hash-pin
//! ```

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use haven_server::{AppState, ServerConfig, mail::EmailClient};
use haven_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Haven housing operations server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "haven.toml")]
  config: PathBuf,

  /// Print the argon2 hash for a PIN entered on stdin and exit.
  #[arg(long)]
  hash_pin: bool,
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

  if cli.hash_pin {
    let pin = read_stdin_line("PIN: ")?;
    let hash = haven_api::pin::hash_pin(&pin).map_err(|e| anyhow::anyhow!("{e}"))?;
    println!("{hash}");
    return Ok(());
  }

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(
      config::Environment::with_prefix("HAVEN")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()
    .context("failed to read configuration")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  if server_cfg.trigger_key.is_empty() {
    tracing::warn!("trigger_key is empty; the digest endpoint will reject every call");
  }
  if server_cfg.email.recipient_list().is_empty() {
    tracing::warn!("no digest recipients configured");
  }

  let store_path = expand_tilde(&server_cfg.store_path);
  let store = SqliteStore::open(&store_path)
    .await
    .with_context(|| format!("failed to open store at {store_path:?}"))?;

  let mailer = EmailClient::new(server_cfg.email.clone())
    .context("failed to build email client")?;

  let state = AppState {
    store: Arc::new(store),
    config: Arc::new(server_cfg.clone()),
    mailer,
  };

  let app = haven_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!(
    access = ?server_cfg.unprovisioned_access,
    "Listening on http://{address}"
  );
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}

fn read_stdin_line(prompt: &str) -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  print!("{prompt}");
  io::stdout().flush().ok();
  let mut line = String::new();
  io::stdin().lock().read_line(&mut line)?;
  Ok(line.trim_end_matches(['\n', '\r']).to_string())
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}
