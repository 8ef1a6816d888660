//! Template selection: which forms, and which of their formats, could the input be?
//!
//! A format is plausible when its character count equals the input's and its punctuation
//! anchors overlap the input's by more than a length-scaled threshold. Short poems are matched
//! on length alone; long ones need the caesurae to line up.

use std::collections::BTreeSet;

use tracing::debug;

use crate::catalog::TemplateStore;
use crate::domain::{CatalogVariant, FormId, Template};
use crate::error::CheckError;
use crate::text::{normalize, NormalizedText, CAESURA};

/// A form that survived selection, with the indices of its plausible formats in catalog order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
  pub form: FormId,
  pub formats: Vec<usize>,
}

/// 0 up to 14 characters, 0.7 from 100, linear in between.
pub fn threshold(length: usize) -> f64 {
  if length <= 14 {
    0.0
  } else if length >= 100 {
    0.7
  } else {
    0.7 * (length - 14) as f64 / 86.0
  }
}

/// Anchors of a format, derived from its example segments joined by caesurae.
pub fn template_anchors(t: &Template) -> Vec<isize> {
  let joined = t.content_segments.join(&CAESURA.to_string());
  normalize(&joined).anchors
}

/// Jaccard overlap of two anchor sets. Two empty sets agree completely.
pub fn overlap_ratio(user: &[isize], template: &[isize]) -> f64 {
  let a: BTreeSet<isize> = user.iter().copied().collect();
  let b: BTreeSet<isize> = template.iter().copied().collect();
  let union = a.union(&b).count();
  if union == 0 {
    return 1.0;
  }
  a.intersection(&b).count() as f64 / union as f64
}

/// Indices of the formats that could describe `input`.
pub fn plausible_formats(input: &NormalizedText, formats: &[Template]) -> Vec<usize> {
  let limit = threshold(input.len());
  formats
    .iter()
    .enumerate()
    .filter(|(_, t)| t.char_count() == input.len())
    .filter(|(_, t)| overlap_ratio(&input.anchors, &template_anchors(t)) > limit)
    .map(|(i, _)| i)
    .collect()
}

/// Candidate forms for `input`, each with at least one plausible format.
///
/// With an explicit name the lookup errors (`UnknownForm`, `VariantUnavailable`) are returned as
/// they are; without one, forms are gathered by length (`NoLengthMatch` if there are none).
/// Either way, `NoStructuralMatch` if no form keeps a plausible format.
pub fn select_candidates(
  store: &dyn TemplateStore,
  input: &NormalizedText,
  explicit_name: Option<&str>,
  variant: CatalogVariant,
) -> Result<Vec<Candidate>, CheckError> {
  let length = input.len();
  let forms = match explicit_name {
    Some(name) => vec![store.find_by_name(name, variant)?],
    None => {
      let ids = store.forms_of_length(length, variant);
      if ids.is_empty() {
        return Err(CheckError::NoLengthMatch { length });
      }
      ids
    }
  };

  let mut out = Vec::new();
  for form in forms {
    let formats = plausible_formats(input, store.variants_of(form, variant)?);
    debug!(target: "check", %form, plausible = ?formats, "Plausibility filter");
    if !formats.is_empty() {
      out.push(Candidate { form, formats });
    }
  }

  if out.is_empty() {
    return Err(CheckError::NoStructuralMatch { length });
  }
  Ok(out)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::builtin_catalog;

  #[test]
  fn threshold_boundaries() {
    assert_eq!(threshold(0), 0.0);
    assert_eq!(threshold(14), 0.0);
    assert!((threshold(57) - 0.35).abs() < 1e-9);
    assert_eq!(threshold(100), 0.7);
    assert_eq!(threshold(240), 0.7);
  }

  #[test]
  fn overlap_is_jaccard_over_sets() {
    assert_eq!(overlap_ratio(&[2, 7, 7], &[2, 7]), 1.0);
    assert_eq!(overlap_ratio(&[2, 7, 14, 21], &[2, 7, 14]), 0.75);
    assert_eq!(overlap_ratio(&[1, 3], &[2, 4]), 0.0);
    assert_eq!(overlap_ratio(&[], &[]), 1.0);
  }

  #[test]
  fn template_anchors_sit_at_caesurae() {
    let cat = builtin_catalog();
    let id = cat.find_by_name("忆江南", CatalogVariant::Qin).expect("form");
    let t = &cat.variants_of(id, CatalogVariant::Qin).expect("formats")[0];
    assert_eq!(template_anchors(t), vec![2, 7, 14, 21]);
  }

  #[test]
  fn auto_detect_by_length_and_punctuation() {
    let cat = builtin_catalog();
    let input = normalize("江南好，风景旧曾谙。日出江花红胜火，春来江水绿如蓝。能不忆江南。");
    let got = select_candidates(&cat, &input, None, CatalogVariant::Qin).expect("candidates");
    assert_eq!(got.len(), 1);
    assert_eq!(got[0].formats, vec![0]);
  }

  #[test]
  fn misplaced_punctuation_is_not_plausible() {
    let cat = builtin_catalog();
    let input = normalize("江南好风，景旧曾谙日，出江花红胜火春，来江水绿如蓝能，不忆江南");
    assert_eq!(
      select_candidates(&cat, &input, None, CatalogVariant::Qin),
      Err(CheckError::NoStructuralMatch { length: 27 })
    );
  }

  #[test]
  fn selection_errors_pass_through() {
    let cat = builtin_catalog();
    let input = normalize("一二三四五");
    assert_eq!(
      select_candidates(&cat, &input, None, CatalogVariant::Qin),
      Err(CheckError::NoLengthMatch { length: 5 })
    );
    assert_eq!(
      select_candidates(&cat, &input, Some("无名令"), CatalogVariant::Qin),
      Err(CheckError::UnknownForm)
    );
  }

  #[test]
  fn explicit_name_still_needs_matching_length() {
    let cat = builtin_catalog();
    let input = normalize("一二三，四五。");
    assert_eq!(
      select_candidates(&cat, &input, Some("忆江南"), CatalogVariant::Qin),
      Err(CheckError::NoStructuralMatch { length: 5 })
    );
  }
}
