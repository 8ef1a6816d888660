//! Report rendering: template line, the user's text with its rhyme label, and the verdict line,
//! segment by segment.
//!
//! ```text
//! 你的格式为 格一
//!
//! 中平仄，中仄仄平平（韵）。
//! 江南好　风景旧曾谙　一部平 第一组韵 押韵
//! 〇〇〇　〇〇〇〇□
//! ```

use serde::Serialize;

use crate::domain::{FormId, Template, Tone};
use crate::oracle::Lexicon;
use crate::rhyme::{RhymeLabel, RhymeRecord};
use crate::text::{is_symbol, CAESURA};
use crate::tone::{is_fail_glyph, is_good_glyph, ToneVerdict, FAIL_GLYPH, PASS_GLYPH};
use crate::util::num_to_cn;

/// 水龙吟 格二十四: the final character's tone is checked on its own.
const FREE_FINAL_FORMAT: (FormId, usize) = (FormId(658), 23);

const SIMPLIFIED_ONLY: &str = "换叠读举儿韵";
const TRADITIONAL_FORMS: &str = "換疊讀舉兒韻";

/// Glyph counts of a rendered report.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
  /// 〇 and □
  pub good: usize,
  /// ◎
  pub polyphonic: usize,
  /// �
  pub unknown: usize,
  /// ● and ■
  pub fail: usize,
}

impl Tally {
  pub fn of(line: &str) -> Self {
    let mut t = Tally::default();
    for c in line.chars() {
      if is_good_glyph(c) {
        t.good += 1;
      } else if is_fail_glyph(c) {
        t.fail += 1;
      } else if c == ToneVerdict::PolyphonicUnresolved.glyph() {
        t.polyphonic += 1;
      } else if c == ToneVerdict::UnknownGlyph.glyph() {
        t.unknown += 1;
      }
    }
    t
  }

  pub fn merge(self, o: Tally) -> Tally {
    Tally {
      good: self.good + o.good,
      polyphonic: self.polyphonic + o.polyphonic,
      unknown: self.unknown + o.unknown,
      fail: self.fail + o.fail,
    }
  }

  pub fn unresolved(&self) -> usize {
    self.polyphonic + self.unknown
  }

  /// Share of good glyphs, 0–100. Polyphones count in favour; unknown glyphs are left out.
  pub fn meter_score(&self) -> u32 {
    let good = self.good + self.polyphonic;
    let total = good + self.fail;
    if total == 0 {
      return 0;
    }
    ((100.0 * good as f64 / total as f64).round() as u32).min(100)
  }

  pub fn grade(&self) -> char {
    match self.meter_score() {
      s if s >= 85 => 'A',
      s if s >= 70 => 'B',
      s if s >= 55 => 'C',
      _ => 'D',
    }
  }
}

/// Replace the simplified-only report vocabulary with its traditional forms.
pub fn to_traditional(s: &str) -> String {
  s.chars()
    .map(|c| match SIMPLIFIED_ONLY.chars().position(|x| x == c) {
      Some(i) => TRADITIONAL_FORMS.chars().nth(i).unwrap_or(c),
      None => c,
    })
    .collect()
}

/// Lay `items` over the template's segments: punctuation in a segment is kept, every other
/// slot takes the next item.
fn weave<T>(segments: &[String], items: &[T], show: impl Fn(&T) -> char) -> Vec<String> {
  let mut next = items.iter();
  segments
    .iter()
    .map(|seg| {
      seg
        .chars()
        .filter_map(|c| if is_symbol(c) { Some(c) } else { next.next().map(&show) })
        .collect()
    })
    .collect()
}

/// The user's characters cut like the template's example text.
pub fn align_user_text(content_segments: &[String], content: &[char]) -> Vec<String> {
  weave(content_segments, content, |&c| c)
}

pub fn verdict_lines(content_segments: &[String], verdicts: &[ToneVerdict]) -> Vec<String> {
  weave(content_segments, verdicts, |v| v.glyph())
}

/// Verdict line with its closing glyph. A segment that rhymes ends in □, or ■ if its last
/// character is off-tone; a broken rhyme always ends in ■; unknown rhyme keeps the line as is.
pub fn close_line(line: &str, label: Option<&RhymeLabel>) -> String {
  let last = line.chars().last();
  let closing = match label {
    Some(RhymeLabel::Breaks(_)) => FAIL_GLYPH,
    Some(RhymeLabel::Rhymes(_)) if last == Some(ToneVerdict::Mismatch.glyph()) => FAIL_GLYPH,
    Some(RhymeLabel::Rhymes(_)) => PASS_GLYPH,
    Some(RhymeLabel::Unknown) | None => return line.to_string(),
  };
  let mut out: String = line.chars().take(line.chars().count().saturating_sub(1)).collect();
  out.push(closing);
  out
}

/// Body of a report: one block per segment. A segment with no rhyme label has no label text and
/// no closing glyph.
pub fn render_body(
  template_segments: &[String],
  user_segments: &[String],
  labels: &[RhymeLabel],
  verdict_lines: &[String],
  lex: &Lexicon<'_>,
) -> (String, Tally) {
  let mut out = String::new();
  let mut tally = Tally::default();
  for (i, (user, verdicts)) in user_segments.iter().zip(verdict_lines).enumerate() {
    let template = template_segments.get(i).map(String::as_str).unwrap_or_default();
    let label = labels.get(i);
    if lex.script.is_trad() {
      out.push_str(&to_traditional(template));
    } else {
      out.push_str(template);
    }
    out.push('\n');
    out.push_str(user);
    if let Some(l) = label {
      out.push(CAESURA);
      out.push_str(l.text(lex.script));
    }
    out.push('\n');
    let closed = close_line(verdicts, label);
    tally = tally.merge(Tally::of(&closed));
    out.push_str(&closed);
    out.push_str("\n\n");
  }
  (out.trim_end().to_string() + "\n", tally)
}

fn isolated_tone_mark(t: Tone) -> char {
  match t {
    Tone::Polyphonic => '◎',
    Tone::Level => '●',
    Tone::Oblique => '〇',
    Tone::Unknown => '\u{FFFD}',
  }
}

/// Outcome of checking one format of one form.
#[derive(Clone, Debug, Serialize)]
pub struct ValidationReport {
  pub form: FormId,
  pub format_index: usize,
  pub text: String,
  pub verdicts: Vec<ToneVerdict>,
  pub rhymes: Vec<RhymeRecord>,
  pub tally: Tally,
}

impl ValidationReport {
  pub fn render(
    form: FormId,
    format_index: usize,
    template: &Template,
    content: &[char],
    verdicts: Vec<ToneVerdict>,
    rhymes: Vec<RhymeRecord>,
    lex: &Lexicon<'_>,
  ) -> Self {
    let labels: Vec<RhymeLabel> = rhymes.iter().map(|r| RhymeLabel::for_record(r, lex.book, lex.script)).collect();
    let user = align_user_text(&template.content_segments, content);
    let lines = verdict_lines(&template.content_segments, &verdicts);
    let (body, mut tally) = render_body(&template.template_segments, &user, &labels, &lines, lex);

    let header = if lex.script.is_trad() { "你的格式為" } else { "你的格式为" };
    let mut text = format!("{header} 格{}\n\n{body}", num_to_cn(format_index as u32 + 1));

    if (form, format_index) == FREE_FINAL_FORMAT {
      if let Some(&last) = content.last() {
        let mark = isolated_tone_mark(lex.tone(last));
        tally = tally.merge(Tally::of(&mark.to_string()));
        text.push_str(&format!("\n仄句\n{last}\n{mark}\n"));
      }
    }

    Self { form, format_index, text, verdicts, rhymes, tally }
  }

  /// No off-tone position and no broken rhyme.
  pub fn passed(&self) -> bool {
    self.tally.fail == 0
  }

  pub fn meter_score(&self) -> u32 {
    self.tally.meter_score()
  }

  pub fn with_preamble(mut self, line: &str) -> Self {
    self.text = format!("{line}\n{}", self.text);
    self
  }
}
