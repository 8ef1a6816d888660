//! Rhyme-book table loaded from JSON.
//!
//! Schema:
//! ```json
//! {
//!   "chars": { "东": { "tone": "level", "rhymes": [1], "line_end": [1] } },
//!   "traditional": { "東": "东" }
//! }
//! ```
//! `line_end` is optional and narrows the candidates used at rhyme positions.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;

use crate::domain::{Script, Tone};
use crate::error::StoreError;
use crate::oracle::LookupContext;

#[derive(Deserialize)]
struct RawTable {
  #[serde(default)]
  chars: HashMap<String, RawEntry>,
  #[serde(default)]
  traditional: HashMap<String, String>,
}

#[derive(Deserialize)]
struct RawEntry {
  tone: Tone,
  #[serde(default)]
  rhymes: Vec<i32>,
  #[serde(default)]
  line_end: Option<Vec<i32>>,
}

#[derive(Clone, Debug)]
struct Entry {
  tone: Tone,
  rhymes: Vec<i32>,
  line_end: Option<Vec<i32>>,
}

#[derive(Clone, Debug, Default)]
pub struct RhymeTable {
  entries: HashMap<char, Entry>,
  trad_to_simp: HashMap<char, char>,
}

fn single_char(s: &str) -> Option<char> {
  let mut it = s.chars();
  match (it.next(), it.next()) {
    (Some(c), None) => Some(c),
    _ => None,
  }
}

impl RhymeTable {
  pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
    let raw: RawTable = serde_json::from_str(s)?;
    let entries = raw
      .chars
      .into_iter()
      .filter_map(|(k, e)| {
        single_char(&k).map(|c| (c, Entry { tone: e.tone, rhymes: dedup(e.rhymes), line_end: e.line_end.map(dedup) }))
      })
      .collect();
    let trad_to_simp = raw
      .traditional
      .into_iter()
      .filter_map(|(t, s)| Some((single_char(&t)?, single_char(&s)?)))
      .collect();
    Ok(Self { entries, trad_to_simp })
  }

  pub fn from_path(path: &Path) -> Result<Self, StoreError> {
    let s = std::fs::read_to_string(path)
      .map_err(|source| StoreError::Io { path: path.display().to_string(), source })?;
    Self::from_json_str(&s).map_err(|source| StoreError::Json { path: path.display().to_string(), source })
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  fn entry(&self, ch: char, script: Script) -> Option<&Entry> {
    self.entries.get(&ch).or_else(|| {
      if script.is_trad() {
        self.trad_to_simp.get(&ch).and_then(|s| self.entries.get(s))
      } else {
        None
      }
    })
  }

  pub fn tone(&self, ch: char, script: Script) -> Option<Tone> {
    self.entry(ch, script).map(|e| e.tone)
  }

  pub fn categories(&self, ch: char, script: Script, ctx: LookupContext) -> Option<Vec<i32>> {
    self.entry(ch, script).map(|e| match (ctx, &e.line_end) {
      (LookupContext::RhymePosition, Some(end)) => end.clone(),
      _ => e.rhymes.clone(),
    })
  }
}

fn dedup(v: Vec<i32>) -> Vec<i32> {
  let mut out = Vec::with_capacity(v.len());
  for x in v {
    if !out.contains(&x) {
      out.push(x);
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn duplicate_rhymes_collapse_in_order() {
    let t = RhymeTable::from_json_str(r#"{"chars":{"家":{"tone":"level","rhymes":[10,10,-10]}}}"#).expect("table");
    assert_eq!(t.categories('家', Script::Simplified, LookupContext::Lexicon), Some(vec![10, -10]));
  }

  #[test]
  fn traditional_glyphs_only_map_in_traditional_mode() {
    let t = RhymeTable::from_json_str(r#"{"chars":{"东":{"tone":"level","rhymes":[1]}},"traditional":{"東":"东"}}"#)
      .expect("table");
    assert_eq!(t.tone('東', Script::Traditional), Some(Tone::Level));
    assert_eq!(t.tone('東', Script::Simplified), None);
  }

  #[test]
  fn multi_char_keys_are_ignored() {
    let t = RhymeTable::from_json_str(r#"{"chars":{"东风":{"tone":"level"}}}"#).expect("table");
    assert_eq!(t.len(), 0);
  }
}
