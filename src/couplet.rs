//! Couplet (对联) check: level/oblique opposition position by position, the closing tones of
//! both lines, and optional repair of the lower line from related-word suggestions.

use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{Tone, ToneMark};
use crate::error::CoupletError;
use crate::oracle::Lexicon;
use crate::report::Tally;
use crate::text::normalize;
use crate::tone::ToneVerdict;

#[derive(Clone, Debug, Serialize)]
pub struct CoupletReport {
  pub upper: String,
  pub lower: String,
  /// One glyph per position: 〇 opposed, ● not opposed, ◎/� undecidable.
  pub marks: String,
  pub issues: Vec<String>,
  /// Lower line with suggested replacements, when any position was repaired.
  pub repaired: Option<String>,
  pub text: String,
  pub tally: Tally,
}

impl CoupletReport {
  pub fn passed(&self) -> bool {
    self.issues.is_empty()
  }
}

/// Cleaned lines; fails on empty input or unequal length.
fn clean_pair(upper: &str, lower: &str) -> Result<(Vec<char>, Vec<char>), CoupletError> {
  let up = normalize(upper).content;
  let low = normalize(lower).content;
  if up.len() != low.len() {
    return Err(CoupletError::LengthMismatch { upper: up.len(), lower: low.len() });
  }
  if up.is_empty() {
    return Err(CoupletError::Empty);
  }
  Ok((up, low))
}

fn opposition(up: Tone, low: Tone) -> ToneVerdict {
  match (up, low) {
    (Tone::Unknown, _) | (_, Tone::Unknown) => ToneVerdict::UnknownGlyph,
    (Tone::Polyphonic, _) | (_, Tone::Polyphonic) => ToneVerdict::PolyphonicUnresolved,
    (Tone::Level, Tone::Oblique) | (Tone::Oblique, Tone::Level) => ToneVerdict::Match,
    _ => ToneVerdict::Mismatch,
  }
}

/// Positions whose tones are not opposed, with the upper-line character there. These are the
/// positions worth asking the suggestion service about.
pub fn unopposed_positions(upper: &str, lower: &str, lex: &Lexicon<'_>) -> Result<Vec<(usize, char)>, CoupletError> {
  let (up, low) = clean_pair(upper, lower)?;
  Ok(
    up.iter()
      .zip(&low)
      .enumerate()
      .filter(|(_, (&u, &l))| opposition(lex.tone(u), lex.tone(l)) == ToneVerdict::Mismatch)
      .map(|(i, (&u, _))| (i, u))
      .collect(),
  )
}

/// `suggestions` maps a 0-based position to related words for the upper character there; the
/// first single character with the opposite tone of the upper character replaces the lower one.
pub fn check_couplet(
  upper: &str,
  lower: &str,
  lex: &Lexicon<'_>,
  suggestions: &HashMap<usize, Vec<String>>,
) -> Result<CoupletReport, CoupletError> {
  let (up, low) = clean_pair(upper, lower)?;
  let trad = lex.script.is_trad();

  let mut marks = String::new();
  let mut issues = Vec::new();
  let mut repaired = low.clone();
  for (i, (&u, &l)) in up.iter().zip(&low).enumerate() {
    let up_tone = lex.tone(u);
    let verdict = opposition(up_tone, lex.tone(l));
    marks.push(verdict.glyph());
    if verdict != ToneVerdict::Mismatch {
      continue;
    }
    issues.push(if trad { format!("第{}字平仄未對。", i + 1) } else { format!("第{}字平仄未对。", i + 1) });

    let want = if up_tone == Tone::Level { ToneMark::Oblique } else { ToneMark::Level };
    let replacement = suggestions.get(&i).into_iter().flatten().find_map(|w| {
      let mut cs = w.chars();
      match (cs.next(), cs.next()) {
        (Some(c), None) if want.admits(lex.tone(c)) => Some(c),
        _ => None,
      }
    });
    if let Some(c) = replacement {
      repaired[i] = c;
    }
  }

  let last_up = up.last().map(|&c| lex.tone(c));
  let last_low = low.last().map(|&c| lex.tone(c));
  if last_up == Some(Tone::Level) {
    issues.push(if trad { "上聯句末應以仄收。" } else { "上联句末应以仄收。" }.to_string());
  }
  if last_low == Some(Tone::Oblique) {
    issues.push(if trad { "下聯句末應以平收。" } else { "下联句末应以平收。" }.to_string());
  }

  let upper: String = up.iter().collect();
  let lower: String = low.iter().collect();
  let repaired = (repaired != low).then(|| repaired.iter().collect::<String>());

  let (l_up, l_low, l_marks, l_issues, l_fix) =
    if trad { ("上聯", "下聯", "對仗", "問題", "自動替換") } else { ("上联", "下联", "对仗", "问题", "自动替换") };
  let mut lines = vec![format!("{l_up}：{upper}"), format!("{l_low}：{lower}"), format!("{l_marks}：{marks}")];
  if !issues.is_empty() {
    lines.push(format!("{l_issues}：{}", issues.join(" ")));
  }
  if let Some(r) = &repaired {
    lines.push(format!("{l_fix}：{r}"));
  }

  let tally = Tally::of(&marks);
  Ok(CoupletReport { upper, lower, marks, issues, repaired, text: lines.join("\n"), tally })
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::test_support::FakeOracle;

  fn oracle() -> FakeOracle {
    FakeOracle::new()
      .with("风花秋天", Tone::Level, &[])
      .with("雨月落地", Tone::Oblique, &[])
      .with("看", Tone::Polyphonic, &[])
  }

  #[test]
  fn opposed_pair_passes() {
    let o = oracle();
    let r = check_couplet("风花雨", "雨月天", &o.lexicon(), &HashMap::new()).expect("report");
    assert_eq!(r.marks, "〇〇〇");
    assert!(r.passed());
    assert_eq!(r.text, "上联：风花雨\n下联：雨月天\n对仗：〇〇〇");
  }

  #[test]
  fn unopposed_positions_and_end_tones() {
    let o = oracle();
    let r = check_couplet("风雨看天", "花月看落", &o.lexicon(), &HashMap::new()).expect("report");
    assert_eq!(r.marks, "●●◎〇");
    assert_eq!(r.issues, vec!["第1字平仄未对。", "第2字平仄未对。", "上联句末应以仄收。", "下联句末应以平收。"]);
    assert_eq!(r.repaired, None);
    assert_eq!(r.tally, Tally { good: 1, polyphonic: 1, unknown: 0, fail: 2 });
    assert_eq!(unopposed_positions("风雨看天", "花月看落", &o.lexicon()), Ok(vec![(0, '风'), (1, '雨')]));
  }

  #[test]
  fn suggestions_repair_the_lower_line() {
    let o = oracle();
    let mut s = HashMap::new();
    s.insert(0, vec!["春风".to_string(), "天".to_string(), "雨".to_string()]);
    let r = check_couplet("风花雨", "秋月天", &o.lexicon(), &s).expect("report");
    assert_eq!(r.repaired.as_deref(), Some("雨月天"));
    assert!(r.text.ends_with("\n自动替换：雨月天"));
  }

  #[test]
  fn shape_errors() {
    let o = oracle();
    assert_eq!(
      check_couplet("风花", "雨月天", &o.lexicon(), &HashMap::new()).err(),
      Some(CoupletError::LengthMismatch { upper: 2, lower: 3 })
    );
    assert_eq!(check_couplet("，", "。", &o.lexicon(), &HashMap::new()).err(), Some(CoupletError::Empty));
  }
}
