//! Application state: reference data loaded once at start-up and shared read-only.
//!
//! This module owns:
//!   - the template catalog (from the data directory, or the built-in forms)
//!   - the phonology oracle (rhyme-book tables with the Mandarin fallback)
//!   - the Qu tune book
//!   - the optional Sou-Yun client
//!   - request defaults from the TOML config
//!
//! Loading failures are logged and replaced by built-in data; the service always starts.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::catalog::TemplateCatalog;
use crate::ci::CiChecker;
use crate::config::{load_checker_config_from_env, CheckerConfig, Defaults};
use crate::domain::{RhymeBook, Script};
use crate::oracle::{Lexicon, Phonology};
use crate::qu::QuPatterns;
use crate::seeds::builtin_catalog;
use crate::souyun::SouYun;

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<TemplateCatalog>,
    pub phonology: Arc<Phonology>,
    pub qu_patterns: Arc<QuPatterns>,
    pub souyun: Option<SouYun>,
    pub defaults: Defaults,
}

impl AppState {
    /// Build state from env: load config, then the data directory it names.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let cfg = load_checker_config_from_env().unwrap_or_default();
        Self::from_config(&cfg)
    }

    pub fn from_config(cfg: &CheckerConfig) -> Self {
        let (catalog, phonology) = match &cfg.data.dir {
            Some(dir) => {
                let catalog = TemplateCatalog::load_dir(dir).unwrap_or_else(|e| {
                    error!(target: "catalog", dir = %dir.display(), error = %e, "Failed to load catalog; using built-in forms");
                    builtin_catalog()
                });
                (catalog, Phonology::load_dir(dir))
            }
            None => {
                warn!(target: "catalog", "No data directory configured; using built-in forms and Mandarin readings");
                (builtin_catalog(), Phonology::new())
            }
        };

        let qu_patterns = match cfg.data.qu_patterns_path() {
            Some(path) if path.exists() => QuPatterns::load(&path).unwrap_or_else(|e| {
                error!(target: "catalog", path = %path.display(), error = %e, "Failed to load qu patterns");
                QuPatterns::default()
            }),
            _ => QuPatterns::default(),
        };

        let souyun = SouYun::from_config(&cfg.souyun);
        if let Some(s) = &souyun {
            info!(target: "gelv_backend", base_url = %s.base_url, "Sou-Yun suggestions enabled.");
        } else {
            info!(target: "gelv_backend", "Sou-Yun suggestions disabled.");
        }

        info!(
            target: "gelv_backend",
            forms = catalog.form_count(),
            qu_patterns = qu_patterns.len(),
            cilin_table = phonology.has_table(RhymeBook::CiLin),
            "Startup reference data"
        );

        Self::from_parts(catalog, phonology, qu_patterns, souyun, cfg.defaults)
    }

    pub fn from_parts(
        catalog: TemplateCatalog,
        phonology: Phonology,
        qu_patterns: QuPatterns,
        souyun: Option<SouYun>,
        defaults: Defaults,
    ) -> Self {
        let defaults = usable_defaults(defaults, &phonology);
        Self {
            catalog: Arc::new(catalog),
            phonology: Arc::new(phonology),
            qu_patterns: Arc::new(qu_patterns),
            souyun,
            defaults,
        }
    }

    pub fn checker(&self) -> CiChecker<'_> {
        CiChecker::new(self.catalog.as_ref(), self.phonology.as_ref())
    }

    pub fn lexicon(&self, book: RhymeBook, script: Script) -> Lexicon<'_> {
        Lexicon::new(self.phonology.as_ref(), book, script)
    }
}

/// 词林正韵 has no Mandarin fallback, so without its table the default book becomes 中华新韵.
/// A request naming 词林 explicitly still gets it.
fn usable_defaults(mut defaults: Defaults, phonology: &Phonology) -> Defaults {
    if defaults.rhyme_book == RhymeBook::CiLin && !phonology.has_table(RhymeBook::CiLin) {
        warn!(target: "gelv_backend", "No cilin rhyme table loaded; default rhyme book falls back to xinyun");
        defaults.rhyme_book = RhymeBook::XinYun;
    }
    defaults
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_without_data_dir_uses_builtin_forms() {
        let mut cfg = CheckerConfig::default();
        cfg.souyun.enabled = false;
        let s = AppState::from_config(&cfg);
        assert!(s.catalog.form_count() >= 5);
        assert!(s.qu_patterns.is_empty());
        assert!(s.souyun.is_none());
        assert_eq!(s.defaults, Defaults { rhyme_book: RhymeBook::XinYun, ..Defaults::default() });
    }

    #[test]
    fn cilin_default_kept_when_its_table_is_loaded() {
        let table = crate::oracle::RhymeTable::from_json_str(r#"{"chars": {"东": {"tone": "level", "rhymes": [1]}}}"#)
            .expect("table");
        let phonology = Phonology::new().with_table(RhymeBook::CiLin, table);
        let s = AppState::from_parts(builtin_catalog(), phonology, QuPatterns::default(), None, Defaults::default());
        assert_eq!(s.defaults.rhyme_book, RhymeBook::CiLin);

        let modern = Defaults { rhyme_book: RhymeBook::TongYun, ..Defaults::default() };
        let s = AppState::from_parts(builtin_catalog(), Phonology::new(), QuPatterns::default(), None, modern);
        assert_eq!(s.defaults.rhyme_book, RhymeBook::TongYun);
    }

    #[test]
    fn missing_data_dir_falls_back() {
        let mut cfg = CheckerConfig::default();
        cfg.data.dir = Some(std::env::temp_dir().join("gelv-no-such-dir"));
        cfg.souyun.enabled = false;
        let s = AppState::from_config(&cfg);
        assert!(s.catalog.form_count() >= 5);
    }
}
