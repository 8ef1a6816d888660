//! Rhyme-book numbering schemes.
//!
//! Category numbers are signed: a negative number is the oblique (仄) use of the category.
//! 词林正韵 numbers 1–14 are level/oblique 部, 15–19 are the entering-tone 部.
//! The two modern books (中华新韵, 中华通韵) are derived from Mandarin finals.

use crate::domain::{RhymeBook, Script};
use crate::util::num_to_cn;

const XIN_YUN: [&str; 14] = ["麻", "波", "皆", "开", "微", "豪", "尤", "寒", "文", "唐", "庚", "齐", "支", "姑"];
const XIN_YUN_TRAD: [&str; 14] = ["麻", "波", "皆", "開", "微", "豪", "尤", "寒", "文", "唐", "庚", "齊", "支", "姑"];

const TONG_YUN: [&str; 16] = [
  "啊", "喔", "鹅", "衣", "乌", "迂", "哀", "欸", "熬", "欧", "安", "恩", "昂", "英", "雍", "儿",
];
const TONG_YUN_TRAD: [&str; 16] = [
  "啊", "喔", "鵝", "衣", "烏", "迂", "哀", "欸", "熬", "歐", "安", "恩", "昂", "英", "雍", "兒",
];

const CILIN_PARTS: i32 = 19;
const CILIN_LEVEL_PARTS: i32 = 14;

/// Category of a normalized Mandarin final under one of the modern books.
/// Finals use `ü` and `-i` for the buzzed vowel of zhi/chi/shi/ri/zi/ci/si.
pub fn modern_category(book: RhymeBook, fin: &str) -> Option<i32> {
  match book {
    RhymeBook::CiLin => None,
    RhymeBook::XinYun => match fin {
      "a" | "ia" | "ua" => Some(1),
      "o" | "e" | "uo" => Some(2),
      "ie" | "üe" => Some(3),
      "ai" | "uai" => Some(4),
      "ei" | "ui" => Some(5),
      "ao" | "iao" => Some(6),
      "ou" | "iu" => Some(7),
      "an" | "ian" | "uan" | "üan" => Some(8),
      "en" | "in" | "un" | "ün" => Some(9),
      "ang" | "iang" | "uang" => Some(10),
      "eng" | "ing" | "ong" | "iong" | "ueng" => Some(11),
      "i" | "er" | "ü" => Some(12),
      "-i" => Some(13),
      "u" => Some(14),
      _ => None,
    },
    RhymeBook::TongYun => match fin {
      "a" | "ia" | "ua" => Some(1),
      "o" | "uo" => Some(2),
      "e" | "ie" | "üe" => Some(3),
      "i" | "-i" => Some(4),
      "u" => Some(5),
      "ü" => Some(6),
      "ai" | "uai" => Some(7),
      "ei" | "ui" => Some(8),
      "ao" | "iao" => Some(9),
      "ou" | "iu" => Some(10),
      "an" | "ian" | "uan" | "üan" => Some(11),
      "en" | "in" | "un" | "ün" => Some(12),
      "ang" | "iang" | "uang" => Some(13),
      "eng" | "ing" | "ueng" => Some(14),
      "ong" | "iong" => Some(15),
      "er" => Some(16),
      _ => None,
    },
  }
}

/// Human-readable name of one signed category, or None when it names no category.
pub fn category_label(book: RhymeBook, category: i32, script: Script) -> Option<String> {
  let n = category.abs();
  if n == 0 {
    return None;
  }
  let tone = if category < 0 { "仄" } else { "平" };
  match book {
    RhymeBook::CiLin => {
      if n > CILIN_PARTS {
        return None;
      }
      let suffix = if category < 0 {
        "仄"
      } else if n > CILIN_LEVEL_PARTS {
        if script.is_trad() { "入聲" } else { "入声" }
      } else {
        "平"
      };
      Some(format!("{}部{}", num_to_cn(n as u32), suffix))
    }
    RhymeBook::XinYun => {
      let names = if script.is_trad() { &XIN_YUN_TRAD[..] } else { &XIN_YUN[..] };
      names.get(n as usize - 1).map(|name| format!("{}{}{}", num_to_cn(n as u32), name, tone))
    }
    RhymeBook::TongYun => {
      let names = if script.is_trad() { &TONG_YUN_TRAD[..] } else { &TONG_YUN[..] };
      names.get(n as usize - 1).map(|name| format!("{}{}{}", num_to_cn(n as u32), name, tone))
    }
  }
}

/// Joined label of every candidate category. None if there is no candidate or any candidate
/// names no category.
pub fn categories_label(book: RhymeBook, categories: &[i32], script: Script) -> Option<String> {
  if categories.is_empty() {
    return None;
  }
  categories
    .iter()
    .map(|&c| category_label(book, c, script))
    .collect::<Option<Vec<_>>>()
    .map(|v| v.join("、"))
}
