//! Phonology oracle: character → tone class and rhyme categories.
//!
//! The checkers only see the `PhonologyOracle` trait. `Phonology` is the production
//! implementation: rhyme-book tables loaded from JSON first, the Mandarin (pinyin-derived)
//! oracle as the fallback for the two modern books.

use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::domain::{RhymeBook, Script, Tone};

pub mod mandarin;
pub mod table;

pub use mandarin::MandarinOracle;
pub use table::RhymeTable;

/// Distinguishes a lexicon-wide lookup from one made for a line-final rhyme position, where a
/// polyphone may be restricted to the readings that can rhyme.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LookupContext {
  Lexicon,
  RhymePosition,
}

pub trait PhonologyOracle: Send + Sync {
  fn tone(&self, ch: char, book: RhymeBook, script: Script) -> Tone;

  /// Signed rhyme-category candidates, in lexicon order, without duplicates.
  fn rhyme_categories(&self, ch: char, book: RhymeBook, script: Script, ctx: LookupContext) -> Vec<i32>;
}

/// An oracle pinned to the rhyme book and script of one check.
#[derive(Clone, Copy)]
pub struct Lexicon<'a> {
  pub oracle: &'a dyn PhonologyOracle,
  pub book: RhymeBook,
  pub script: Script,
}

impl<'a> Lexicon<'a> {
  pub fn new(oracle: &'a dyn PhonologyOracle, book: RhymeBook, script: Script) -> Self {
    Self { oracle, book, script }
  }

  pub fn tone(&self, ch: char) -> Tone {
    self.oracle.tone(ch, self.book, self.script)
  }

  pub fn rhymes(&self, ch: char, ctx: LookupContext) -> Vec<i32> {
    self.oracle.rhyme_categories(ch, self.book, self.script, ctx)
  }
}

/// Tables per rhyme book, with the Mandarin oracle behind them.
#[derive(Default)]
pub struct Phonology {
  tables: HashMap<RhymeBook, RhymeTable>,
  mandarin: MandarinOracle,
}

impl Phonology {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_table(mut self, book: RhymeBook, table: RhymeTable) -> Self {
    self.tables.insert(book, table);
    self
  }

  /// Load `rhyme/{cilin,xinyun,tongyun}.json` under `dir`. Missing or broken files are logged
  /// and skipped; the book then relies on the Mandarin fallback (or reports unknown glyphs).
  pub fn load_dir(dir: &Path) -> Self {
    let mut me = Self::new();
    for book in [RhymeBook::CiLin, RhymeBook::XinYun, RhymeBook::TongYun] {
      let path = dir.join("rhyme").join(format!("{}.json", book.file_stem()));
      if !path.exists() {
        warn!(target: "catalog", path = %path.display(), ?book, "No rhyme table; using fallback");
        continue;
      }
      match RhymeTable::from_path(&path) {
        Ok(t) => {
          info!(target: "catalog", path = %path.display(), ?book, entries = t.len(), "Loaded rhyme table");
          me = me.with_table(book, t);
        }
        Err(e) => warn!(target: "catalog", path = %path.display(), error = %e, "Failed to load rhyme table"),
      }
    }
    me
  }

  pub fn has_table(&self, book: RhymeBook) -> bool {
    self.tables.contains_key(&book)
  }
}

impl PhonologyOracle for Phonology {
  fn tone(&self, ch: char, book: RhymeBook, script: Script) -> Tone {
    if let Some(t) = self.tables.get(&book).and_then(|t| t.tone(ch, script)) {
      return t;
    }
    match book {
      RhymeBook::CiLin => Tone::Unknown,
      RhymeBook::XinYun | RhymeBook::TongYun => self.mandarin.tone(ch),
    }
  }

  fn rhyme_categories(&self, ch: char, book: RhymeBook, script: Script, ctx: LookupContext) -> Vec<i32> {
    if let Some(c) = self.tables.get(&book).and_then(|t| t.categories(ch, script, ctx)) {
      return c;
    }
    self.mandarin.categories(ch, book)
  }
}
