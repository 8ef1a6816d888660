//! Gelv · classical Chinese verse conformance backend
//!
//! - Ci (词) checks against 钦定词谱 / 龙榆生 templates, with form auto-detection
//! - Qu (曲) checks against free 平仄中 patterns, couplet (对联) checks
//! - Axum HTTP + WebSocket API
//! - Optional Sou-Yun (搜韵) suggestions for couplet repair
//!
//! Important env variables:
//!   PORT              : u16 (default 3000)
//!   GELV_CONFIG_PATH  : path to TOML config (data directory, defaults, Sou-Yun)
//!   SOUYUN_BASE_URL   : overrides the configured Sou-Yun base URL
//!   LOG_LEVEL         : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT        : "pretty" (default) or "json"

mod telemetry;
mod util;
mod domain;
mod error;
mod text;
mod rhyme_book;
mod oracle;
mod catalog;
mod seeds;
mod selector;
mod tone;
mod rhyme;
mod report;
mod rank;
mod ci;
mod qu;
mod couplet;
mod souyun;
mod config;
mod state;
mod protocol;
mod logic;
mod routes;

#[cfg(test)]
mod test_support;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Reference data is loaded once and shared read-only.
  let state = Arc::new(AppState::new());

  let app = build_router(state.clone());

  // Read port from env or default to 3000.
  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "gelv_backend", %addr, forms = state.catalog.form_count(), "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}
