//! Fixtures shared by the unit tests: a table-free oracle and template builders.

use std::collections::HashMap;

use crate::catalog::TemplateCatalog;
use crate::domain::{CatalogVariant, FormId, FormRecord, RhymeBook, Script, Template, Tone};
use crate::oracle::{Lexicon, LookupContext, PhonologyOracle};

/// Oracle answering from a fixed per-character table, whatever the book or script.
#[derive(Default)]
pub struct FakeOracle {
  entries: HashMap<char, (Tone, Vec<i32>)>,
}

impl FakeOracle {
  pub fn new() -> Self {
    Self::default()
  }

  /// Every character of `chars` gets the same tone and categories.
  pub fn with(mut self, chars: &str, tone: Tone, rhymes: &[i32]) -> Self {
    for c in chars.chars() {
      self.entries.insert(c, (tone, rhymes.to_vec()));
    }
    self
  }

  pub fn lexicon(&self) -> Lexicon<'_> {
    Lexicon::new(self, RhymeBook::CiLin, Script::Simplified)
  }
}

impl PhonologyOracle for FakeOracle {
  fn tone(&self, ch: char, _book: RhymeBook, _script: Script) -> Tone {
    self.entries.get(&ch).map(|e| e.0).unwrap_or(Tone::Unknown)
  }

  fn rhyme_categories(&self, ch: char, _book: RhymeBook, _script: Script, _ctx: LookupContext) -> Vec<i32> {
    self.entries.get(&ch).map(|e| e.1.clone()).unwrap_or_default()
  }
}

pub fn template(
  mask: &str,
  content: &[&str],
  display: &[&str],
  rhymes: &[usize],
  groups: &[(&str, &[i64])],
) -> Template {
  Template {
    tone_mask: mask.parse().expect("mask"),
    content_segments: content.iter().map(|s| s.to_string()).collect(),
    template_segments: display.iter().map(|s| s.to_string()).collect(),
    rhyme_positions: rhymes.to_vec(),
    rhyme_groups: groups.iter().map(|(k, v)| (k.to_string(), v.to_vec())).collect(),
  }
}

/// Catalog of `(id, names, formats)` entries, all in 钦谱.
pub fn catalog(forms: Vec<(u32, &[&str], Vec<Template>)>) -> TemplateCatalog {
  let records = forms
    .iter()
    .map(|(id, names, _)| FormRecord {
      id: FormId(*id),
      names: names.iter().map(|s| s.to_string()).collect(),
      names_trad: Vec::new(),
      long_available: false,
    })
    .collect();
  let mut cat = TemplateCatalog::new(records);
  for (id, _, formats) in forms {
    cat.insert_formats(FormId(id), CatalogVariant::Qin, formats).expect("valid fixture");
  }
  cat
}
