//! Minimal Sou-Yun (搜韵) open API client.
//!
//! Only the related-word lookup used for couplet repair is called. Calls are instrumented and
//! log latencies and result sizes, not payloads.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use reqwest::header::USER_AGENT;
use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::config::SouYunConfig;
use crate::error::SuggestError;
use crate::util::trunc_for_log;

/// Upper bound on lookups per couplet; longer couplets only repair their first positions.
pub const MAX_LOOKUPS: usize = 8;

#[derive(Clone)]
pub struct SouYun {
  pub client: reqwest::Client,
  pub base_url: String,
}

impl SouYun {
  /// Build the client unless disabled. `SOUYUN_BASE_URL` overrides the configured base URL.
  pub fn from_config(cfg: &SouYunConfig) -> Option<Self> {
    if !cfg.enabled {
      return None;
    }
    let base_url = std::env::var("SOUYUN_BASE_URL").unwrap_or_else(|_| cfg.base_url.clone());
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(cfg.timeout_secs))
      .build()
      .ok()?;
    Some(Self { client, base_url: base_url.trim_end_matches('/').to_string() })
  }

  #[instrument(level = "info", skip(self, params))]
  async fn get_json(&self, path: &str, params: &[(&str, &str)]) -> Result<Value, SuggestError> {
    let url = format!("{}/{}", self.base_url, path);
    let started = Instant::now();
    let res = self
      .client
      .get(&url)
      .header(USER_AGENT, "gelv-backend/0.1")
      .query(params)
      .send()
      .await?;

    if !res.status().is_success() {
      let status = res.status().as_u16();
      let body = res.text().await.unwrap_or_default();
      return Err(SuggestError::Status { status, body: trunc_for_log(&body, 200) });
    }
    let v: Value = res.json().await?;
    info!(target: "gelv_backend", %path, elapsed_ms = started.elapsed().as_millis() as u64, "Sou-Yun response");
    Ok(v)
  }

  /// Words related to `word` (对仗 candidates).
  pub async fn couplet_words(&self, word: &str) -> Result<Vec<String>, SuggestError> {
    let v = self.get_json("coupletwords", &[("id", word)]).await?;
    Ok(extract_words(&v))
  }

  /// Suggestions for every position, keyed by position. Failed lookups are logged and skipped.
  pub async fn suggestions_for(&self, positions: &[(usize, char)]) -> HashMap<usize, Vec<String>> {
    let mut out = HashMap::new();
    for &(i, ch) in positions.iter().take(MAX_LOOKUPS) {
      match self.couplet_words(&ch.to_string()).await {
        Ok(words) => {
          out.insert(i, words);
        }
        Err(e) => warn!(target: "gelv_backend", position = i, error = %e, "Sou-Yun lookup failed"),
      }
    }
    out
  }
}

/// First list of strings found in the payload. Lists of non-strings are flattened; objects are
/// searched value by value until one yields words.
pub fn extract_words(payload: &Value) -> Vec<String> {
  match payload {
    Value::Array(items) => {
      if let Some(Value::String(_)) = items.first() {
        return items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect();
      }
      items.iter().flat_map(extract_words).collect()
    }
    Value::Object(map) => map.values().map(extract_words).find(|w| !w.is_empty()).unwrap_or_default(),
    _ => Vec::new(),
  }
}
