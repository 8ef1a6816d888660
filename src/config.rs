//! Loading checker configuration (data locations, request defaults, Sou-Yun client) from TOML.
//!
//! ```toml
//! [data]
//! dir = "/srv/gelv/data"          # ci_index.json, ci_list/, ci_long/, rhyme/
//! qu_patterns = "/srv/gelv/qu_patterns.md"
//!
//! [defaults]
//! rhyme_book = "cilin"            # cilin | xinyun | tongyun
//! catalog = "qin"                 # qin | long
//! trad = false
//!
//! [souyun]
//! enabled = true
//! base_url = "https://api.sou-yun.cn/open"
//! timeout_secs = 10
//! ```

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{error, info};

use crate::domain::{CatalogVariant, RhymeBook};

#[derive(Clone, Debug, Deserialize, Default)]
pub struct CheckerConfig {
  #[serde(default)]
  pub data: DataConfig,
  #[serde(default)]
  pub defaults: Defaults,
  #[serde(default)]
  pub souyun: SouYunConfig,
}

#[derive(Clone, Debug, Deserialize, Default)]
pub struct DataConfig {
  #[serde(default)] pub dir: Option<PathBuf>,
  /// Defaults to `{dir}/qu_patterns.md`.
  #[serde(default)] pub qu_patterns: Option<PathBuf>,
}

impl DataConfig {
  pub fn qu_patterns_path(&self) -> Option<PathBuf> {
    self.qu_patterns.clone().or_else(|| self.dir.as_ref().map(|d| d.join("qu_patterns.md")))
  }
}

/// Values used when a request leaves them out.
#[derive(Clone, Copy, Debug, Deserialize, Default, PartialEq, Eq)]
pub struct Defaults {
  #[serde(default)] pub rhyme_book: RhymeBook,
  #[serde(default)] pub catalog: CatalogVariant,
  #[serde(default)] pub trad: bool,
}

#[derive(Clone, Debug, Deserialize)]
pub struct SouYunConfig {
  #[serde(default = "default_true")]
  pub enabled: bool,
  #[serde(default = "default_base_url")]
  pub base_url: String,
  #[serde(default = "default_timeout")]
  pub timeout_secs: u64,
}

fn default_true() -> bool { true }
fn default_base_url() -> String { "https://api.sou-yun.cn/open".into() }
fn default_timeout() -> u64 { 10 }

impl Default for SouYunConfig {
  fn default() -> Self {
    Self { enabled: default_true(), base_url: default_base_url(), timeout_secs: default_timeout() }
  }
}

/// Attempt to load `CheckerConfig` from GELV_CONFIG_PATH. On any parsing/IO error, returns None.
pub fn load_checker_config_from_env() -> Option<CheckerConfig> {
  let path = std::env::var("GELV_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match toml::from_str::<CheckerConfig>(&s) {
      Ok(cfg) => {
        info!(target: "gelv_backend", %path, "Loaded checker config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "gelv_backend", %path, error = %e, "Failed to parse TOML config");
        None
      }
    },
    Err(e) => {
      error!(target: "gelv_backend", %path, error = %e, "Failed to read TOML config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn empty_config_uses_defaults() {
    let cfg: CheckerConfig = toml::from_str("").expect("toml");
    assert!(cfg.data.dir.is_none());
    assert_eq!(cfg.defaults, Defaults::default());
    assert!(cfg.souyun.enabled);
    assert_eq!(cfg.souyun.timeout_secs, 10);
  }

  #[test]
  fn full_config_parses() {
    let cfg: CheckerConfig = toml::from_str(
      r#"
      [data]
      dir = "/srv/gelv"

      [defaults]
      rhyme_book = "xinyun"
      catalog = "long"
      trad = true

      [souyun]
      enabled = false
      "#,
    )
    .expect("toml");
    assert_eq!(cfg.data.qu_patterns_path(), Some(PathBuf::from("/srv/gelv/qu_patterns.md")));
    assert_eq!(cfg.defaults, Defaults { rhyme_book: RhymeBook::XinYun, catalog: CatalogVariant::Long, trad: true });
    assert!(!cfg.souyun.enabled);
    assert_eq!(cfg.souyun.base_url, "https://api.sou-yun.cn/open");
  }
}
