//! Text normalization: drop bracketed annotations and punctuation, remember where the
//! punctuation was.
//!
//! Example:
//!   输入: "江南好（其一），风景旧曾谙。"
//!   内容: "江南好风景旧曾谙"   锚点: [2, 7]

/// Full-width space, used as the caesura marker in template segments and rendered lines.
pub const CAESURA: char = '\u{3000}';

const OPEN_BRACKETS: &[char] = &['(', '[', '{', '（', '【', '《', '<'];
const CLOSE_BRACKETS: &[char] = &[')', ']', '}', '）', '】', '》', '>'];

/// Delimiters removed without touching what they enclose.
const PAIRED_DELIMITERS: &[char] = &[
  '“', '”', '‘', '’', '"', '\'', '(', ')', '[', ']', '{', '}', '<', '>', '《', '》', '【', '】', '（', '）',
];

/// Content characters plus punctuation anchors.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct NormalizedText {
  pub content: Vec<char>,
  /// For each retained punctuation mark, index of the content character before it (-1 if none).
  pub anchors: Vec<isize>,
}

impl NormalizedText {
  pub fn len(&self) -> usize {
    self.content.len()
  }

  pub fn is_empty(&self) -> bool {
    self.content.is_empty()
  }

  pub fn text(&self) -> String {
    self.content.iter().collect()
  }
}

/// True for characters treated as punctuation/whitespace rather than content.
pub fn is_symbol(ch: char) -> bool {
  matches!(ch,
    '\u{2000}'..='\u{206F}'     // general punctuation
    | '\u{3000}'..='\u{303F}'   // CJK punctuation
    | '\u{FF00}'..='\u{FFEF}'   // full-width forms
    | '\u{2600}'..='\u{26FF}'   // misc symbols
    | '\u{2700}'..='\u{27BF}'   // dingbats
    | '\n' | '\r' | '\t' | '\u{0B}' | '\u{0C}' | ' '
  ) || ch.is_ascii_punctuation()
}

/// Drop every bracketed span. Any opening glyph enters bracket mode and any closing glyph
/// leaves it, whether or not the two pair up.
pub fn strip_bracketed(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  let mut inside = false;
  for ch in text.chars() {
    if OPEN_BRACKETS.contains(&ch) {
      inside = true;
      continue;
    }
    if CLOSE_BRACKETS.contains(&ch) {
      inside = false;
      continue;
    }
    if !inside {
      out.push(ch);
    }
  }
  out
}

pub fn normalize(raw: &str) -> NormalizedText {
  let stripped = strip_bracketed(raw);

  let mut out = NormalizedText::default();
  let mut prev_was_symbol = false;
  for ch in stripped.chars().filter(|c| !PAIRED_DELIMITERS.contains(c)) {
    if is_symbol(ch) {
      // Runs of punctuation count once.
      if !prev_was_symbol {
        out.anchors.push(out.content.len() as isize - 1);
        prev_was_symbol = true;
      }
    } else {
      out.content.push(ch);
      prev_was_symbol = false;
    }
  }
  out
}

/// Cut `content` after every anchor. An anchor of -1 yields a leading empty part.
pub fn split_by_anchors(content: &[char], anchors: &[isize]) -> Vec<String> {
  if anchors.is_empty() {
    return vec![content.iter().collect()];
  }
  let mut parts = Vec::with_capacity(anchors.len() + 1);
  let mut start = 0usize;
  for &a in anchors {
    let end = ((a + 1).max(0) as usize).clamp(start, content.len());
    parts.push(content[start..end].iter().collect());
    start = end;
  }
  if start < content.len() {
    parts.push(content[start..].iter().collect());
  }
  parts
}

/// Per-line content for multi-line callers. Lines holding only punctuation are dropped; falls
/// back to punctuation-based splitting when no line is left.
pub fn split_lines(raw: &str) -> Vec<String> {
  let lines: Vec<String> = raw
    .lines()
    .map(str::trim)
    .filter(|l| !l.is_empty())
    .map(normalize)
    .filter(|n| !n.is_empty())
    .map(|n| n.text())
    .collect();
  if !lines.is_empty() {
    return lines;
  }
  let n = normalize(raw);
  if n.is_empty() {
    return Vec::new();
  }
  split_by_anchors(&n.content, &n.anchors)
}
