//! Per-position tone verdicts against a template's 平仄 mask.

use serde::Serialize;

use crate::domain::{Tone, ToneMark};
use crate::oracle::Lexicon;

/// Closing glyph of a segment whose rhyme holds.
pub const PASS_GLYPH: char = '□';
/// Closing glyph of a segment whose rhyme breaks.
pub const FAIL_GLYPH: char = '■';

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneVerdict {
  Match,
  Mismatch,
  PolyphonicUnresolved,
  UnknownGlyph,
}

impl ToneVerdict {
  pub fn judge(mark: ToneMark, tone: Tone) -> Self {
    match tone {
      Tone::Polyphonic => ToneVerdict::PolyphonicUnresolved,
      Tone::Unknown => ToneVerdict::UnknownGlyph,
      t if mark.admits(t) => ToneVerdict::Match,
      _ => ToneVerdict::Mismatch,
    }
  }

  pub fn glyph(self) -> char {
    match self {
      ToneVerdict::Match => '〇',
      ToneVerdict::Mismatch => '●',
      ToneVerdict::PolyphonicUnresolved => '◎',
      ToneVerdict::UnknownGlyph => '\u{FFFD}',
    }
  }
}

/// Glyph kinds as the ranker and the scores count them.
pub fn is_fail_glyph(c: char) -> bool {
  c == '●' || c == FAIL_GLYPH
}

pub fn is_good_glyph(c: char) -> bool {
  c == '〇' || c == PASS_GLYPH
}

/// One verdict per character. Positions past the shorter of the two inputs are ignored.
pub fn check_tones(content: &[char], mask: &[ToneMark], lex: &Lexicon<'_>) -> Vec<ToneVerdict> {
  content
    .iter()
    .zip(mask)
    .map(|(&ch, &mark)| ToneVerdict::judge(mark, lex.tone(ch)))
    .collect()
}
