//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Ci checks (request options merged with the configured defaults)
//!   - Qu checks against a given or named pattern
//!   - Couplet checks, with Sou-Yun suggestions when asked for and available
//!   - Form lookup by name or length

use std::collections::HashMap;

use tracing::{debug, info, instrument, warn};

use crate::catalog::TemplateStore;
use crate::ci::CheckOptions;
use crate::couplet::{check_couplet, unopposed_positions};
use crate::domain::Script;
use crate::protocol::{CheckOut, CiCheckIn, CoupletCheckIn, FormOut, FormsOut, FormsQuery, QuCheckIn};
use crate::qu::check_qu;
use crate::state::AppState;

fn script_of(state: &AppState, trad: Option<bool>) -> Script {
  Script::from_trad_flag(trad.unwrap_or(state.defaults.trad))
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len(), form = ?body.form))]
pub fn do_check_ci(state: &AppState, body: &CiCheckIn) -> CheckOut {
  let opts = CheckOptions {
    form_name: body.form.clone().filter(|n| !n.trim().is_empty()),
    format: body.format.clone(),
    catalog: body.catalog.unwrap_or(state.defaults.catalog),
    book: body.rhyme_book.unwrap_or(state.defaults.rhyme_book),
    script: script_of(state, body.trad),
  };

  match state.checker().check(&body.text, &opts) {
    Ok(r) => {
      info!(target: "check", form = %r.form, format = r.format_index + 1, score = r.meter_score(), "Ci check reported");
      let passed = r.passed();
      CheckOut {
        passed,
        meter_score: Some(r.meter_score()),
        grade: Some(r.tally.grade()),
        form: Some(r.form),
        format: Some(r.format_index + 1),
        ..CheckOut::success(r.text)
      }
    }
    Err(e) => {
      debug!(target: "check", code = e.code(), "Ci check rejected");
      CheckOut::failure(e.code(), e.message(opts.script))
    }
  }
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len(), tune = ?body.tune))]
pub fn do_check_qu(state: &AppState, body: &QuCheckIn) -> CheckOut {
  let lex = state.lexicon(body.rhyme_book.unwrap_or(state.defaults.rhyme_book), script_of(state, body.trad));
  match check_qu(&body.text, body.pattern.as_deref(), body.tune.as_deref(), &state.qu_patterns, &lex) {
    Ok(r) => CheckOut {
      passed: r.passed(),
      meter_score: Some(r.tally.meter_score()),
      grade: Some(r.tally.grade()),
      ..CheckOut::success(r.text)
    },
    Err(e) => CheckOut::failure(e.code(), e.to_string()),
  }
}

#[instrument(level = "info", skip(state, body), fields(len = body.upper.chars().count(), auto_suggest = body.auto_suggest))]
pub async fn do_check_couplet(state: &AppState, body: &CoupletCheckIn) -> CheckOut {
  let lex = state.lexicon(body.rhyme_book.unwrap_or(state.defaults.rhyme_book), script_of(state, body.trad));

  let mut suggestions = HashMap::new();
  if body.auto_suggest {
    match (&state.souyun, unopposed_positions(&body.upper, &body.lower, &lex)) {
      (Some(sy), Ok(positions)) if !positions.is_empty() => suggestions = sy.suggestions_for(&positions).await,
      (None, _) => warn!(target: "gelv_backend", "auto_suggest requested but Sou-Yun is disabled"),
      _ => {}
    }
  }

  match check_couplet(&body.upper, &body.lower, &lex, &suggestions) {
    Ok(r) => CheckOut {
      passed: r.passed(),
      meter_score: Some(r.tally.meter_score()),
      grade: Some(r.tally.grade()),
      repaired: r.repaired.clone(),
      ..CheckOut::success(r.text)
    },
    Err(e) => CheckOut::failure(e.code(), e.to_string()),
  }
}

/// A name resolves to at most one form; a length lists every form with a format that long.
#[instrument(level = "info", skip(state))]
pub fn do_lookup_forms(state: &AppState, q: &FormsQuery) -> FormsOut {
  let variant = q.catalog.unwrap_or(state.defaults.catalog);
  let script = script_of(state, q.trad);
  let store: &dyn TemplateStore = state.catalog.as_ref();

  let ids = match (q.name.as_deref().map(str::trim).filter(|n| !n.is_empty()), q.length) {
    (Some(name), _) => store.find_by_name(name, variant).map(|id| vec![id]).unwrap_or_default(),
    (None, Some(n)) => store.forms_of_length(n, variant),
    (None, None) => Vec::new(),
  };

  let forms = ids
    .into_iter()
    .map(|id| FormOut {
      id,
      name: store.display_name(id, script).unwrap_or_default(),
      formats: store.variants_of(id, variant).map(|f| f.len()).unwrap_or(0),
    })
    .collect();
  FormsOut { forms }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Defaults;
  use crate::domain::FormId;
  use crate::oracle::Phonology;
  use crate::qu::QuPatterns;
  use crate::seeds::builtin_catalog;

  fn state() -> AppState {
    AppState::from_parts(builtin_catalog(), Phonology::new(), QuPatterns::default(), None, Defaults::default())
  }

  fn ci(text: &str) -> CiCheckIn {
    CiCheckIn { text: text.into(), form: None, format: None, catalog: None, rhyme_book: None, trad: None }
  }

  #[test]
  fn ci_errors_carry_code_and_message() {
    let out = do_check_ci(&state(), &ci("春眠不觉晓"));
    assert!(!out.ok);
    assert_eq!(out.code.as_deref(), Some("no_length_match"));
    assert!(out.message.unwrap_or_default().contains("你输入了5字"));

    let mut body = ci("春眠不觉晓");
    body.form = Some("不存在".into());
    body.trad = Some(true);
    let out = do_check_ci(&state(), &body);
    assert_eq!(out.code.as_deref(), Some("unknown_form"));
    assert_eq!(out.message.as_deref(), Some("不能找到你輸入的詞牌。"));
  }

  #[test]
  fn ci_report_for_auto_detected_form() {
    let out = do_check_ci(&state(), &ci("江南好，风景旧曾谙。日出江花红胜火，春来江水绿如蓝。能不忆江南。"));
    assert!(out.ok, "{:?}", out.message);
    assert_eq!(out.form, Some(FormId(1)));
    assert_eq!(out.format, Some(1));
    assert!(out.meter_score.unwrap_or(0) >= 70, "{:?}", out.meter_score);
    let report = out.report.unwrap_or_default();
    assert!(report.starts_with("忆江南\n你的格式为 格一"));
    assert!(!report.contains('\u{FFFD}'), "{report}");
    assert!(!report.contains("不知韵部"), "{report}");
  }

  #[test]
  fn default_config_checks_with_mandarin_readings() {
    let mut cfg = crate::config::CheckerConfig::default();
    cfg.souyun.enabled = false;
    let s = AppState::from_config(&cfg);
    let out = do_check_ci(&s, &ci("塞北梅花羌笛吹，淮南桂树小山词。请君莫奏前朝曲，听唱新翻杨柳枝。"));
    assert!(out.ok, "{:?}", out.message);
    assert!(out.meter_score.unwrap_or(0) > 0);
    let report = out.report.unwrap_or_default();
    assert!(!report.contains('\u{FFFD}'), "{report}");
    assert!(!report.contains("不知韵部"), "{report}");
  }

  #[test]
  fn qu_without_pattern_is_rejected() {
    let body = QuCheckIn { text: "枯藤老树".into(), pattern: None, tune: Some("天净沙".into()), rhyme_book: None, trad: None };
    let out = do_check_qu(&state(), &body);
    assert_eq!(out.code.as_deref(), Some("missing_pattern"));
  }

  #[tokio::test]
  async fn couplet_without_souyun_still_checks() {
    let body = CoupletCheckIn {
      upper: "天高".into(),
      lower: "地厚".into(),
      rhyme_book: Some(crate::domain::RhymeBook::XinYun),
      trad: None,
      auto_suggest: true,
    };
    let out = do_check_couplet(&state(), &body).await;
    assert!(out.ok);
    assert!(out.repaired.is_none());
    assert!(out.report.unwrap_or_default().starts_with("上联：天高\n下联：地厚"));
  }

  #[test]
  fn forms_by_name_and_length() {
    let s = state();
    let by_name = do_lookup_forms(&s, &FormsQuery { name: Some("望江南".into()), length: None, catalog: None, trad: None });
    assert_eq!(by_name.forms, vec![FormOut { id: FormId(1), name: "忆江南".into(), formats: 1 }]);

    let by_len = do_lookup_forms(&s, &FormsQuery { name: None, length: Some(28), catalog: None, trad: Some(true) });
    assert_eq!(by_len.forms.len(), 1);
    assert_eq!(by_len.forms[0].name, "楊柳枝");

    let none = do_lookup_forms(&s, &FormsQuery { name: Some("不存在".into()), length: None, catalog: None, trad: None });
    assert!(none.forms.is_empty());
  }
}
