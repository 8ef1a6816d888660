//! Mandarin phonology from the `pinyin` crate: tone class from the tone number, rhyme
//! category from the final, for 中华新韵 and 中华通韵.
//!
//! Example:
//!   天 tiān → 平, final "ian" → 新韵 八寒 (8)
//!   月 yuè  → 仄, final "üe"  → 新韵 三皆 (-3); its rare reading rù adds 十四姑 (-14)
//!
//! Every reading the crate knows is considered, rare ones included, in the crate's order. A
//! polyphone with both level and oblique readings comes back as `Tone::Polyphonic`; its
//! categories keep one signed entry per reading. Neutral-tone readings are ignored.
use pinyin::ToPinyinMulti;

use crate::domain::{RhymeBook, Tone};
use crate::rhyme_book::modern_category;
use crate::util::is_cjk;

const INITIALS: [&str; 21] = [
    "zh", "ch", "sh", "b", "p", "m", "f", "d", "t", "n", "l", "g", "k", "h", "j", "q", "x", "r", "z", "c", "s",
];

/// One reading: toneless syllable plus tone number (1–4).
#[derive(Clone, Debug, PartialEq, Eq)]
struct Reading {
    plain: String,
    tone: u8,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MandarinOracle;

impl MandarinOracle {
    fn readings(&self, ch: char) -> Vec<Reading> {
        if !is_cjk(ch) {
            return Vec::new();
        }
        let Some(multi) = ch.to_pinyin_multi() else {
            return Vec::new();
        };
        let mut out: Vec<Reading> = Vec::new();
        for py in multi {
            let numbered = py.with_tone_num_end();
            let tone = match numbered.chars().last().and_then(|c| c.to_digit(10)) {
                Some(t @ 1..=4) => t as u8,
                // Neutral tone carries no level/oblique information.
                _ => continue,
            };
            let r = Reading { plain: py.plain().to_string(), tone };
            if !out.contains(&r) {
                out.push(r);
            }
        }
        out
    }

    pub fn tone(&self, ch: char) -> Tone {
        let readings = self.readings(ch);
        let level = readings.iter().any(|r| r.tone <= 2);
        let oblique = readings.iter().any(|r| r.tone >= 3);
        match (level, oblique) {
            (true, true) => Tone::Polyphonic,
            (true, false) => Tone::Level,
            (false, true) => Tone::Oblique,
            (false, false) => Tone::Unknown,
        }
    }

    /// Signed categories of every reading under a modern book; empty for 词林正韵.
    pub fn categories(&self, ch: char, book: RhymeBook) -> Vec<i32> {
        let mut out = Vec::new();
        for r in self.readings(ch) {
            let Some(cat) = final_of(&r.plain).and_then(|f| modern_category(book, &f)) else {
                continue;
            };
            let signed = if r.tone <= 2 { cat } else { -cat };
            if !out.contains(&signed) {
                out.push(signed);
            }
        }
        out
    }
}

/// Normalized final of a toneless syllable: y/w spellings undone, ü restored after j/q/x,
/// and `-i` for the buzzed vowel. Syllabic nasals (m, n, ng) have no final.
pub fn final_of(plain: &str) -> Option<String> {
    let s = plain.to_lowercase().replace("u:", "ü").replace('v', "ü");
    if !s.chars().any(|c| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'ü')) {
        return None;
    }

    if let Some(rest) = s.strip_prefix('y') {
        let fin = match rest {
            "u" | "ü" => "ü".to_string(),
            "ue" | "üe" => "üe".to_string(),
            "uan" | "üan" => "üan".to_string(),
            "un" | "ün" => "ün".to_string(),
            "i" | "in" | "ing" => rest.to_string(),
            "ou" => "iu".to_string(),
            "ong" => "iong".to_string(),
            _ => format!("i{rest}"),
        };
        return Some(fin);
    }

    if let Some(rest) = s.strip_prefix('w') {
        let fin = match rest {
            "u" => "u".to_string(),
            "ei" => "ui".to_string(),
            "en" => "un".to_string(),
            _ => format!("u{rest}"),
        };
        return Some(fin);
    }

    let initial = INITIALS.iter().find(|i| s.starts_with(*i)).copied().unwrap_or("");
    let rest = &s[initial.len()..];
    let fin = match initial {
        "zh" | "ch" | "sh" | "r" | "z" | "c" | "s" if rest == "i" => "-i".to_string(),
        "j" | "q" | "x" if rest.starts_with('u') => format!("ü{}", &rest[1..]),
        _ => rest.to_string(),
    };
    Some(fin)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finals_undo_spelling_rules() {
        assert_eq!(final_of("tian").as_deref(), Some("ian"));
        assert_eq!(final_of("yue").as_deref(), Some("üe"));
        assert_eq!(final_of("you").as_deref(), Some("iu"));
        assert_eq!(final_of("wei").as_deref(), Some("ui"));
        assert_eq!(final_of("xuan").as_deref(), Some("üan"));
        assert_eq!(final_of("lv").as_deref(), Some("ü"));
        assert_eq!(final_of("shi").as_deref(), Some("-i"));
        assert_eq!(final_of("li").as_deref(), Some("i"));
        assert_eq!(final_of("er").as_deref(), Some("er"));
        assert_eq!(final_of("zhong").as_deref(), Some("ong"));
        assert_eq!(final_of("n"), None);
        assert_eq!(final_of("ng"), None);
    }

    #[test]
    fn tones_from_pinyin() {
        let o = MandarinOracle;
        assert_eq!(o.tone('天'), Tone::Level);
        assert_eq!(o.tone('月'), Tone::Oblique);
        assert_eq!(o.tone('a'), Tone::Unknown);
    }

    #[test]
    fn categories_are_signed_by_tone() {
        let o = MandarinOracle;
        assert_eq!(o.categories('天', RhymeBook::XinYun), vec![8]);
        // 月 yuè, then the rare rù.
        assert_eq!(o.categories('月', RhymeBook::XinYun), vec![-3, -14]);
        assert_eq!(o.categories('月', RhymeBook::TongYun), vec![-3, -5]);
        // 不 bù bú fǒu fōu: both tones, so both signs.
        let bu = o.categories('不', RhymeBook::XinYun);
        assert!(bu.contains(&-14) && bu.contains(&14));
        assert!(o.categories('天', RhymeBook::CiLin).is_empty());
    }
}
