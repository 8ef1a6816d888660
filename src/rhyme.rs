//! Rhyme grouping: which rhyme positions belong together, what category each group settles
//! on, and whether each position honours it.
//!
//! Near-rhyme (协韵) occurrences vote with negated categories, so a strict 5 and a near-rhyme 5
//! never count as the same sound.

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;

use crate::domain::{RhymeBook, Script};
use crate::oracle::{Lexicon, LookupContext};
use crate::rhyme_book::categories_label;
use crate::util::num_to_cn;

/// One designated rhyme position after grouping.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RhymeRecord {
  pub position: usize,
  pub character: char,
  /// Oracle categories as looked up, never negated.
  pub candidates: Vec<i32>,
  pub near_rhyme: bool,
  /// Ordinal group id (1-based, by earliest member); None if the template leaves it ungrouped.
  pub group: Option<u32>,
  /// Majority of the group, in the voting sign convention.
  pub accepted_category: Option<i32>,
  pub accepted: bool,
}

impl RhymeRecord {
  fn votes(candidates: &[i32], near_rhyme: bool) -> Vec<i32> {
    if near_rhyme {
      candidates.iter().map(|c| -c).collect()
    } else {
      candidates.to_vec()
    }
  }
}

/// Most frequent value; among equally frequent values the one seen first wins.
pub fn majority<I: IntoIterator<Item = i32>>(values: I) -> Option<i32> {
  let mut counts: HashMap<i32, usize> = HashMap::new();
  let mut order: Vec<i32> = Vec::new();
  for v in values {
    let n = counts.entry(v).or_insert(0);
    if *n == 0 {
      order.push(v);
    }
    *n += 1;
  }
  let mut best: Option<(i32, usize)> = None;
  for v in order {
    let n = counts[&v];
    if best.map_or(true, |(_, m)| n > m) {
      best = Some((v, n));
    }
  }
  best.map(|(v, _)| v)
}

/// Group rhyme positions whose candidates are already known. `candidates[i]` belongs to
/// `positions[i]`; `chars[i]` is the character there.
pub fn group_records(
  positions: &[usize],
  chars: &[char],
  candidates: Vec<Vec<i32>>,
  groups: &BTreeMap<String, Vec<i64>>,
) -> Vec<RhymeRecord> {
  let mut membership: HashMap<usize, (&str, bool)> = HashMap::new();
  for (key, members) in groups {
    for &p in members {
      membership.insert(p.unsigned_abs() as usize, (key.as_str(), p < 0));
    }
  }

  let mut first_seen: Vec<(&str, usize)> = Vec::new();
  for &p in positions {
    if let Some(&(key, _)) = membership.get(&p) {
      match first_seen.iter_mut().find(|(k, _)| *k == key) {
        Some(entry) => entry.1 = entry.1.min(p),
        None => first_seen.push((key, p)),
      }
    }
  }
  first_seen.sort_by_key(|&(_, p)| p);
  let ordinal: HashMap<&str, u32> = first_seen.iter().enumerate().map(|(i, &(k, _))| (k, i as u32 + 1)).collect();

  let mut records: Vec<RhymeRecord> = positions
    .iter()
    .zip(chars)
    .zip(candidates)
    .map(|((&position, &character), candidates)| {
      let (group, near_rhyme) = match membership.get(&position) {
        Some(&(key, near)) => (ordinal.get(key).copied(), near),
        None => (None, false),
      };
      RhymeRecord { position, character, candidates, near_rhyme, group, accepted_category: None, accepted: false }
    })
    .collect();

  let mut winners: HashMap<u32, Option<i32>> = HashMap::new();
  for r in &records {
    let Some(g) = r.group else { continue };
    winners.entry(g).or_insert_with(|| {
      majority(
        records
          .iter()
          .filter(|o| o.group == Some(g))
          .flat_map(|o| RhymeRecord::votes(&o.candidates, o.near_rhyme)),
      )
    });
  }

  for r in &mut records {
    let winner = r.group.and_then(|g| winners.get(&g).copied().flatten());
    r.accepted_category = winner;
    r.accepted = winner.is_some_and(|w| RhymeRecord::votes(&r.candidates, r.near_rhyme).contains(&w));
  }
  records
}

/// Look up the characters at `positions` and group them.
pub fn group_rhymes(
  positions: &[usize],
  content: &[char],
  groups: &BTreeMap<String, Vec<i64>>,
  lex: &Lexicon<'_>,
) -> Vec<RhymeRecord> {
  let present: Vec<usize> = positions.iter().copied().filter(|&p| p < content.len()).collect();
  let chars: Vec<char> = present.iter().map(|&p| content[p]).collect();
  let candidates = chars.iter().map(|&c| lex.rhymes(c, LookupContext::RhymePosition)).collect();
  group_records(&present, &chars, candidates, groups)
}

/// Rhyme annotation shown after a segment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum RhymeLabel {
  /// "{categories} 第N组韵 押韵"
  Rhymes(String),
  /// "{categories} 第N组韵 不押韵", or "{categories} 不押韵" when ungrouped.
  Breaks(String),
  /// 不知韵部
  Unknown,
}

impl RhymeLabel {
  pub fn for_record(r: &RhymeRecord, book: RhymeBook, script: Script) -> Self {
    let trad = script.is_trad();
    let Some(categories) = categories_label(book, &r.candidates, script) else {
      return RhymeLabel::Unknown;
    };
    let verdict = match (r.accepted, trad) {
      (true, false) => "押韵",
      (true, true) => "押韻",
      (false, false) => "不押韵",
      (false, true) => "不押韻",
    };
    let text = match r.group {
      Some(g) if trad => format!("{categories} 第{}組韻 {verdict}", num_to_cn(g)),
      Some(g) => format!("{categories} 第{}组韵 {verdict}", num_to_cn(g)),
      None => format!("{categories} {verdict}"),
    };
    if r.accepted {
      RhymeLabel::Rhymes(text)
    } else {
      RhymeLabel::Breaks(text)
    }
  }

  pub fn text(&self, script: Script) -> &str {
    match self {
      RhymeLabel::Rhymes(s) | RhymeLabel::Breaks(s) => s,
      RhymeLabel::Unknown if script.is_trad() => "不知韻部",
      RhymeLabel::Unknown => "不知韵部",
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::Tone;
  use crate::test_support::FakeOracle;

  fn groups_of(groups: &[(&str, &[i64])]) -> BTreeMap<String, Vec<i64>> {
    groups.iter().map(|(k, v)| (k.to_string(), v.to_vec())).collect()
  }

  #[test]
  fn majority_breaks_ties_by_first_seen() {
    assert_eq!(majority([1, 2, 2, 2, 3]), Some(2));
    assert_eq!(majority([3, 1, 1, 3]), Some(3));
    assert_eq!(majority([-4, 4]), Some(-4));
    assert_eq!(majority(std::iter::empty::<i32>()), None);
  }

  #[test]
  fn majority_vote_decides_acceptance() {
    let recs = group_records(
      &[3, 7, 11, 15],
      &['甲', '乙', '丙', '丁'],
      vec![vec![1, 2], vec![2], vec![2, 3], vec![3]],
      &groups_of(&[("1", &[3, 7, 11, 15])]),
    );
    assert!(recs.iter().all(|r| r.accepted_category == Some(2)));
    let accepted: Vec<bool> = recs.iter().map(|r| r.accepted).collect();
    assert_eq!(accepted, vec![true, true, true, false]);
  }

  #[test]
  fn near_rhyme_never_matches_strict_category() {
    let recs = group_records(
      &[4, 9, 14],
      &['甲', '乙', '丙'],
      vec![vec![5], vec![5], vec![5]],
      &groups_of(&[("a", &[4, 9, -14])]),
    );
    assert!(recs[2].near_rhyme);
    assert_eq!(recs[2].accepted_category, Some(5));
    assert!(recs[0].accepted && recs[1].accepted);
    assert!(!recs[2].accepted);
  }

  #[test]
  fn groups_are_renumbered_by_earliest_member() {
    let recs = group_records(
      &[2, 5, 8, 11],
      &['甲', '乙', '丙', '丁'],
      vec![vec![1], vec![3], vec![1], vec![3]],
      &groups_of(&[("9", &[2, 8]), ("10", &[5, 11])]),
    );
    let groups: Vec<Option<u32>> = recs.iter().map(|r| r.group).collect();
    assert_eq!(groups, vec![Some(1), Some(2), Some(1), Some(2)]);
    assert!(recs.iter().all(|r| r.accepted));
  }

  #[test]
  fn ungrouped_positions_never_rhyme() {
    let recs = group_records(&[1, 3], &['甲', '乙'], vec![vec![1], vec![1]], &groups_of(&[("1", &[1])]));
    assert_eq!(recs[1].group, None);
    assert!(!recs[1].accepted);
    assert_eq!(
      RhymeLabel::for_record(&recs[1], RhymeBook::CiLin, Script::Simplified),
      RhymeLabel::Breaks("一部平 不押韵".into())
    );
  }

  #[test]
  fn polyphone_sharing_the_majority_is_accepted() {
    let oracle = FakeOracle::new().with("甲乙", Tone::Level, &[4]).with("看", Tone::Polyphonic, &[4, -9]);
    let content: Vec<char> = "甲乙看".chars().collect();
    let recs = group_rhymes(&[0, 1, 2], &content, &groups_of(&[("1", &[0, 1, 2])]), &oracle.lexicon());
    assert!(recs[2].accepted);
    assert_eq!(recs[2].accepted_category, Some(4));
  }

  #[test]
  fn labels_in_both_scripts() {
    let recs = group_records(&[0, 1], &['甲', '乙'], vec![vec![1], vec![-3]], &groups_of(&[("1", &[0, 1])]));
    assert_eq!(
      RhymeLabel::for_record(&recs[0], RhymeBook::CiLin, Script::Simplified).text(Script::Simplified),
      "一部平 第一组韵 押韵"
    );
    assert_eq!(
      RhymeLabel::for_record(&recs[1], RhymeBook::CiLin, Script::Traditional).text(Script::Traditional),
      "三部仄 第一組韻 不押韻"
    );
    let unknown = group_records(&[0], &['龘'], vec![vec![]], &groups_of(&[("1", &[0])]));
    assert_eq!(RhymeLabel::for_record(&unknown[0], RhymeBook::CiLin, Script::Simplified), RhymeLabel::Unknown);
    assert_eq!(RhymeLabel::Unknown.text(Script::Traditional), "不知韻部");
  }
}
