//! Qu (散曲) check: text against a free 平仄中 pattern, line by line.
//!
//! The pattern comes from the caller or, by tune name, from `qu_patterns.md`, where each tune
//! is a `## name` heading followed by a fenced block with one pattern line per verse line.

use std::collections::HashMap;
use std::path::Path;

use serde::Serialize;
use tracing::{info, instrument};

use crate::domain::ToneMark;
use crate::error::{QuError, StoreError};
use crate::oracle::Lexicon;
use crate::report::Tally;
use crate::text::split_lines;
use crate::tone::check_tones;

/// Named patterns from the tune book.
#[derive(Clone, Debug, Default)]
pub struct QuPatterns {
  by_name: HashMap<String, String>,
}

impl QuPatterns {
  /// `## name` headings followed by a fenced block holding the pattern. A block without a
  /// preceding heading, or an empty one, is ignored; an unterminated final block still counts.
  pub fn parse(markdown: &str) -> Self {
    let mut by_name = HashMap::new();
    let mut name: Option<String> = None;
    let mut block: Option<Vec<&str>> = None;

    let mut flush = |name: &Option<String>, lines: Vec<&str>| {
      let pattern = lines.join("\n").trim().to_string();
      if let (Some(n), false) = (name, pattern.is_empty()) {
        by_name.insert(n.clone(), pattern);
      }
    };

    for line in markdown.lines() {
      if let Some(h) = line.strip_prefix("## ") {
        name = Some(h.trim().to_string());
        continue;
      }
      if line.trim().starts_with("```") {
        match block.take() {
          Some(lines) => flush(&name, lines),
          None => block = Some(Vec::new()),
        }
        continue;
      }
      if let Some(lines) = block.as_mut() {
        lines.push(line);
      }
    }
    if let Some(lines) = block {
      flush(&name, lines);
    }
    Self { by_name }
  }

  pub fn load(path: &Path) -> Result<Self, StoreError> {
    let s = std::fs::read_to_string(path)
      .map_err(|source| StoreError::Io { path: path.display().to_string(), source })?;
    let me = Self::parse(&s);
    info!(target: "catalog", path = %path.display(), patterns = me.len(), "Loaded qu patterns");
    Ok(me)
  }

  pub fn get(&self, name: &str) -> Option<&str> {
    self.by_name.get(name.trim()).map(String::as_str)
  }

  pub fn len(&self) -> usize {
    self.by_name.len()
  }

  pub fn is_empty(&self) -> bool {
    self.by_name.is_empty()
  }
}

/// One line per pattern line; `/`, `／` and `|` also break lines. Only 平仄中 are kept.
pub fn normalize_pattern(pattern: &str) -> Vec<String> {
  pattern
    .split(|c| matches!(c, '\n' | '/' | '／' | '|'))
    .map(str::trim)
    .filter(|l| !l.is_empty())
    .map(|l| l.chars().filter(|&c| ToneMark::from_char(c).is_some()).collect())
    .collect()
}

#[derive(Clone, Debug, Serialize)]
pub struct QuReport {
  pub text: String,
  pub tally: Tally,
}

impl QuReport {
  pub fn passed(&self) -> bool {
    self.tally.fail == 0
  }
}

/// Check `text` against `pattern`, or against the book pattern named `tune` when no pattern is
/// given.
#[instrument(level = "info", skip_all, fields(tune = ?tune))]
pub fn check_qu(
  text: &str,
  pattern: Option<&str>,
  tune: Option<&str>,
  patterns: &QuPatterns,
  lex: &Lexicon<'_>,
) -> Result<QuReport, QuError> {
  let pattern = pattern
    .map(str::trim)
    .filter(|p| !p.is_empty())
    .or_else(|| tune.and_then(|t| patterns.get(t)))
    .ok_or(QuError::MissingPattern)?;

  let pattern_lines = normalize_pattern(pattern);
  let text_lines = split_lines(text);
  if pattern_lines.len() != text_lines.len() {
    return Err(QuError::LineCountMismatch { pattern: pattern_lines.len(), text: text_lines.len() });
  }

  let mut blocks = Vec::with_capacity(pattern_lines.len());
  let mut tally = Tally::default();
  for (i, (pat, line)) in pattern_lines.iter().zip(&text_lines).enumerate() {
    let marks: Vec<ToneMark> = pat.chars().filter_map(ToneMark::from_char).collect();
    let chars: Vec<char> = line.chars().collect();
    if marks.len() != chars.len() {
      return Err(QuError::LineLengthMismatch { line: i + 1, pattern: marks.len(), text: chars.len() });
    }
    let verdicts: String = check_tones(&chars, &marks, lex).iter().map(|v| v.glyph()).collect();
    tally = tally.merge(Tally::of(&verdicts));
    blocks.push(format!("{pat}\n{line}\n{verdicts}\n"));
  }

  Ok(QuReport { text: blocks.join("\n").trim_end().to_string(), tally })
}
