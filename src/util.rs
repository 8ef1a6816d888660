//! Small utility helpers used across modules.

const DIGITS: [char; 10] = ['零', '一', '二', '三', '四', '五', '六', '七', '八', '九'];

/// Chinese numeral for small counts (format numbers, rhyme groups, 部 numbers).
/// 0 → 零, 10 → 十, 12 → 十二, 20 → 二十, 23 → 二十三; values ≥ 100 fall back to digits.
pub fn num_to_cn(n: u32) -> String {
  match n {
    0..=9 => DIGITS[n as usize].to_string(),
    10..=19 => {
      let mut s = String::from('十');
      if n > 10 { s.push(DIGITS[(n - 10) as usize]); }
      s
    }
    20..=99 => {
      let mut s = String::new();
      s.push(DIGITS[(n / 10) as usize]);
      s.push('十');
      if n % 10 != 0 { s.push(DIGITS[(n % 10) as usize]); }
      s
    }
    _ => n.to_string(),
  }
}

/// True if unicode char belongs to CJK ranges.
pub fn is_cjk(ch: char) -> bool {
  (ch >= '\u{4E00}' && ch <= '\u{9FFF}')
    || (ch >= '\u{3400}' && ch <= '\u{4DBF}')
    || (ch >= '\u{20000}' && ch <= '\u{2A6DF}')
    || (ch >= '\u{2A700}' && ch <= '\u{2B73F}')
    || (ch >= '\u{2B740}' && ch <= '\u{2B81F}')
    || (ch >= '\u{2B820}' && ch <= '\u{2CEAF}')
    || (ch >= '\u{F900}' && ch <= '\u{FAFF}')
}

/// Log-safe truncation for large strings, on a char boundary.
pub fn trunc_for_log(s: &str, max_chars: usize) -> String {
  let count = s.chars().count();
  if count <= max_chars {
    s.to_string()
  } else {
    let head: String = s.chars().take(max_chars).collect();
    format!("{}… ({} chars total)", head, count)
  }
}
