//! Ci check pipeline: normalize, select candidate forms, check every plausible format, keep the
//! best report.

use tracing::{debug, info, instrument};

use crate::catalog::TemplateStore;
use crate::domain::{CatalogVariant, FormId, RhymeBook, Script, Template};
use crate::error::CheckError;
use crate::oracle::{Lexicon, PhonologyOracle};
use crate::rank::{best_of, Outcome};
use crate::report::ValidationReport;
use crate::rhyme::group_rhymes;
use crate::selector::{select_candidates, Candidate};
use crate::text::{normalize, NormalizedText};
use crate::tone::check_tones;
use crate::util::trunc_for_log;

const DOWNGRADE_WARNING: &str = "给定格式与实际相差过大或没有此格式，将另行匹配。";
const DOWNGRADE_WARNING_TRAD: &str = "給定格式與實際相差過大或沒有此格式，將另行匹配。";

#[derive(Clone, Debug, Default)]
pub struct CheckOptions {
  /// 词牌 name; None to detect it from length and punctuation.
  pub form_name: Option<String>,
  /// 1-based format (格) number as typed by the user.
  pub format: Option<String>,
  pub catalog: CatalogVariant,
  pub book: RhymeBook,
  pub script: Script,
}

/// Which formats to run for one form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatChoice {
  pub formats: Vec<usize>,
  /// The selector named a format that is not plausible; all plausible formats run instead.
  pub downgraded: bool,
}

fn parse_selector(s: &str) -> Option<usize> {
  let ascii: String = s
    .chars()
    .map(|c| match c {
      '０'..='９' => char::from_u32(c as u32 - '０' as u32 + '0' as u32).unwrap_or(c),
      _ => c,
    })
    .collect();
  if ascii.is_empty() || !ascii.chars().all(|c| c.is_ascii_digit()) {
    return None;
  }
  ascii.parse().ok()
}

/// Empty selector: every plausible format. Non-numeric or zero: `MalformedVariantSelector`.
/// A number naming a plausible format: just that one; otherwise every plausible format, flagged.
pub fn resolve_format_selector(selector: Option<&str>, plausible: &[usize]) -> Result<FormatChoice, CheckError> {
  let selector = selector.map(str::trim).unwrap_or_default();
  if selector.is_empty() {
    return Ok(FormatChoice { formats: plausible.to_vec(), downgraded: false });
  }
  let n = match parse_selector(selector) {
    Some(n) if n > 0 => n,
    _ => return Err(CheckError::MalformedVariantSelector),
  };
  if plausible.contains(&(n - 1)) {
    Ok(FormatChoice { formats: vec![n - 1], downgraded: false })
  } else {
    Ok(FormatChoice { formats: plausible.to_vec(), downgraded: true })
  }
}

/// Check `content` against one format.
pub fn check_format(
  form: FormId,
  format_index: usize,
  template: &Template,
  content: &[char],
  lex: &Lexicon<'_>,
) -> ValidationReport {
  let verdicts = check_tones(content, template.tone_mask.marks(), lex);
  let rhymes = group_rhymes(&template.rhyme_positions, content, &template.rhyme_groups, lex);
  let r = ValidationReport::render(form, format_index, template, content, verdicts, rhymes, lex);
  debug!(target: "check", %form, format = format_index, fail = r.tally.fail, unresolved = r.tally.unresolved(), "Format checked");
  r
}

pub struct CiChecker<'a> {
  store: &'a dyn TemplateStore,
  oracle: &'a dyn PhonologyOracle,
}

impl<'a> CiChecker<'a> {
  pub fn new(store: &'a dyn TemplateStore, oracle: &'a dyn PhonologyOracle) -> Self {
    Self { store, oracle }
  }

  #[instrument(level = "info", skip_all, fields(len = raw.chars().count(), form = ?opts.form_name))]
  pub fn check(&self, raw: &str, opts: &CheckOptions) -> Outcome {
    let input = normalize(raw);
    info!(target: "check", text = %trunc_for_log(&input.text(), 40), anchors = ?input.anchors, "Ci check");
    let candidates = select_candidates(self.store, &input, opts.form_name.as_deref(), opts.catalog)?;
    best_of(candidates.iter().map(|c| self.check_form(c, &input, opts)))
      .unwrap_or(Err(CheckError::NoStructuralMatch { length: input.len() }))
  }

  /// Best report among the formats of one candidate form, with the auto-detected name and the
  /// downgrade warning prefixed.
  fn check_form(&self, c: &Candidate, input: &NormalizedText, opts: &CheckOptions) -> Outcome {
    let formats = self.store.variants_of(c.form, opts.catalog)?;
    let choice = resolve_format_selector(opts.format.as_deref(), &c.formats)?;
    let lex = Lexicon::new(self.oracle, opts.book, opts.script);

    let mut best = best_of(choice.formats.iter().filter_map(|&i| {
      formats.get(i).map(|t| Ok(check_format(c.form, i, t, &input.content, &lex)))
    }))
    .unwrap_or(Err(CheckError::NoStructuralMatch { length: input.len() }))?;

    if opts.form_name.is_none() {
      let name = self.store.display_name(c.form, opts.script).unwrap_or_default();
      best = best.with_preamble(&name);
    }
    if choice.downgraded {
      best = best.with_preamble(if opts.script.is_trad() { DOWNGRADE_WARNING_TRAD } else { DOWNGRADE_WARNING });
    }
    Ok(best)
  }
}
