//! Domain models shared by the checkers: tone marks and classes, rhyme books, script and
//! catalog selectors, form ids and the per-format template record.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TemplateError;

/// Required tone at one template position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ToneMark {
  /// 平
  Level,
  /// 仄
  Oblique,
  /// 中: either tone is fine.
  Either,
}

impl ToneMark {
  pub fn from_char(ch: char) -> Option<Self> {
    match ch {
      '平' => Some(ToneMark::Level),
      '仄' => Some(ToneMark::Oblique),
      '中' => Some(ToneMark::Either),
      _ => None,
    }
  }

  pub fn as_char(self) -> char {
    match self {
      ToneMark::Level => '平',
      ToneMark::Oblique => '仄',
      ToneMark::Either => '中',
    }
  }

  pub fn admits(self, tone: Tone) -> bool {
    match (self, tone) {
      (ToneMark::Either, _) => true,
      (ToneMark::Level, Tone::Level) => true,
      (ToneMark::Oblique, Tone::Oblique) => true,
      _ => false,
    }
  }
}

/// Ordered tone requirements of one template format. Deserialized from a string over 平仄中.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ToneMask(Vec<ToneMark>);

impl ToneMask {
  pub fn marks(&self) -> &[ToneMark] {
    &self.0
  }

  pub fn len(&self) -> usize {
    self.0.len()
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl TryFrom<String> for ToneMask {
  type Error = String;

  fn try_from(s: String) -> Result<Self, Self::Error> {
    s.chars()
      .map(|c| ToneMark::from_char(c).ok_or_else(|| format!("invalid tone mark '{c}' in \"{s}\"")))
      .collect::<Result<Vec<_>, _>>()
      .map(ToneMask)
  }
}

impl From<ToneMask> for String {
  fn from(m: ToneMask) -> Self {
    m.0.iter().map(|t| t.as_char()).collect()
  }
}

impl std::str::FromStr for ToneMask {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    ToneMask::try_from(s.to_string())
  }
}

/// What the phonology oracle says about one character.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
  Level,
  Oblique,
  /// Several readings disagree on level/oblique.
  Polyphonic,
  /// Not in the lexicon.
  Unknown,
}

/// Rhyme-book numbering scheme in use for a check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RhymeBook {
  /// 词林正韵, 19 部.
  #[default]
  #[serde(rename = "cilin", alias = "1")]
  CiLin,
  /// 中华新韵, 14 韵.
  #[serde(rename = "xinyun", alias = "2")]
  XinYun,
  /// 中华通韵, 16 韵.
  #[serde(rename = "tongyun", alias = "3")]
  TongYun,
}

impl RhymeBook {
  pub fn file_stem(self) -> &'static str {
    match self {
      RhymeBook::CiLin => "cilin",
      RhymeBook::XinYun => "xinyun",
      RhymeBook::TongYun => "tongyun",
    }
  }
}

/// Glyph set of the user's text and of the rendered report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Script {
  #[default]
  Simplified,
  Traditional,
}

impl Script {
  pub fn from_trad_flag(trad: bool) -> Self {
    if trad { Script::Traditional } else { Script::Simplified }
  }

  pub fn is_trad(self) -> bool {
    self == Script::Traditional
  }
}

/// Which template catalog to search: 钦定词谱 or 龙榆生《唐宋词格律》.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CatalogVariant {
  #[default]
  #[serde(alias = "1")]
  Qin,
  #[serde(alias = "2")]
  Long,
}

/// Stable id of a named form (词牌).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "IdRepr")]
pub struct FormId(pub u32);

impl fmt::Display for FormId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

/// Catalog files store ids either as numbers or as numeric strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
  Num(u32),
  Str(String),
}

impl TryFrom<IdRepr> for FormId {
  type Error = String;
  fn try_from(r: IdRepr) -> Result<Self, Self::Error> {
    match r {
      IdRepr::Num(n) => Ok(FormId(n)),
      IdRepr::Str(s) => s.trim().parse().map(FormId).map_err(|_| format!("invalid form id \"{s}\"")),
    }
  }
}

/// Index entry for one form.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FormRecord {
  #[serde(alias = "idx")]
  pub id: FormId,
  pub names: Vec<String>,
  #[serde(default)]
  pub names_trad: Vec<String>,
  #[serde(default, alias = "long_exist")]
  pub long_available: bool,
}

impl FormRecord {
  pub fn answers_to(&self, name: &str) -> bool {
    self.names.iter().chain(self.names_trad.iter()).any(|n| n == name)
  }

  pub fn display_name(&self, script: Script) -> Option<&str> {
    let preferred = if script.is_trad() { self.names_trad.first() } else { None };
    preferred.or_else(|| self.names.first()).map(String::as_str)
  }
}

/// One metrical format (格) of a form.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Template {
  #[serde(alias = "ge_lyu_str")]
  pub tone_mask: ToneMask,
  /// Example text split into clause chunks, caesurae as U+3000.
  #[serde(alias = "ci_sep")]
  pub content_segments: Vec<String>,
  /// Display form of the mask per chunk, with rhyme annotations.
  #[serde(alias = "ge_lyu_sep")]
  pub template_segments: Vec<String>,
  #[serde(alias = "rhyme_pos")]
  pub rhyme_positions: Vec<usize>,
  /// Group id → signed positions; a negative position is a near-rhyme occurrence.
  #[serde(alias = "yun_classify", default)]
  pub rhyme_groups: BTreeMap<String, Vec<i64>>,
}

impl Template {
  pub fn char_count(&self) -> usize {
    self.tone_mask.len()
  }

  /// Character count of the example segments, caesurae and punctuation excluded.
  pub fn segment_char_count(&self) -> usize {
    self.content_segments
      .iter()
      .map(|s| s.chars().filter(|&c| !crate::text::is_symbol(c)).count())
      .sum()
  }

  /// Structural invariants a catalog format must hold before it is served.
  pub fn validate(&self) -> Result<(), TemplateError> {
    let (segments, mask) = (self.segment_char_count(), self.char_count());
    if segments != mask {
      return Err(TemplateError::LengthDrift { segments, mask });
    }
    if let Some(&position) = self.rhyme_positions.iter().find(|&&p| p >= mask) {
      return Err(TemplateError::RhymeOutOfRange { position, len: mask });
    }
    Ok(())
  }
}
