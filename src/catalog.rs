//! Template store: form index, formats per catalog variant, and the length index.
//!
//! Directory layout read by `TemplateCatalog::load_dir`:
//!   ci_index.json                  index records
//!   ci_list/cipai_{id}.json        钦谱 formats of a form
//!   ci_long/cipai_{id}_long.json   龙谱 formats of a form
//!
//! The catalog is built once and shared read-only; checkers reach it through `TemplateStore`.

use std::collections::HashMap;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

use crate::domain::{CatalogVariant, FormId, FormRecord, Script, Template};
use crate::error::{CheckError, StoreError};

pub trait TemplateStore: Send + Sync {
  /// Resolve a simplified or traditional alias. Fails with `UnknownForm`, or with
  /// `VariantUnavailable` when the form is not in the requested catalog.
  fn find_by_name(&self, name: &str, variant: CatalogVariant) -> Result<FormId, CheckError>;

  /// Ordered formats of a form; the index in the slice is the format index.
  fn variants_of(&self, form: FormId, variant: CatalogVariant) -> Result<&[Template], CheckError>;

  /// Forms with at least one format of exactly `n` characters, ascending by id.
  fn forms_of_length(&self, n: usize, variant: CatalogVariant) -> Vec<FormId>;

  fn display_name(&self, form: FormId, script: Script) -> Option<String>;
}

#[derive(Clone, Debug, Default)]
pub struct TemplateCatalog {
  records: Vec<FormRecord>,
  by_id: HashMap<FormId, usize>,
  formats: HashMap<(FormId, CatalogVariant), Vec<Template>>,
  by_length: HashMap<(CatalogVariant, usize), Vec<FormId>>,
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
  let s = std::fs::read_to_string(path)
    .map_err(|source| StoreError::Io { path: path.display().to_string(), source })?;
  serde_json::from_str(&s).map_err(|source| StoreError::Json { path: path.display().to_string(), source })
}

impl TemplateCatalog {
  pub fn new(records: Vec<FormRecord>) -> Self {
    let by_id = records.iter().enumerate().map(|(i, r)| (r.id, i)).collect();
    Self { records, by_id, ..Default::default() }
  }

  /// Add the formats of one form in one catalog. Every format is validated first; nothing is
  /// inserted if any of them is malformed.
  pub fn insert_formats(
    &mut self,
    form: FormId,
    variant: CatalogVariant,
    formats: Vec<Template>,
  ) -> Result<(), StoreError> {
    for (i, t) in formats.iter().enumerate() {
      t.validate()
        .map_err(|source| StoreError::InvalidTemplate { form, format: i, source })?;
    }
    for t in &formats {
      let ids = self.by_length.entry((variant, t.char_count())).or_default();
      if !ids.contains(&form) {
        ids.push(form);
        ids.sort();
      }
    }
    self.formats.insert((form, variant), formats);
    Ok(())
  }

  pub fn load_dir(dir: &Path) -> Result<Self, StoreError> {
    let records: Vec<FormRecord> = read_json(&dir.join("ci_index.json"))?;
    let mut cat = Self::new(records.clone());

    for r in &records {
      let mut wanted = vec![(CatalogVariant::Qin, dir.join("ci_list").join(format!("cipai_{}.json", r.id)))];
      if r.long_available {
        wanted.push((CatalogVariant::Long, dir.join("ci_long").join(format!("cipai_{}_long.json", r.id))));
      }
      for (variant, path) in wanted {
        if !path.exists() {
          warn!(target: "catalog", form = %r.id, path = %path.display(), "Format file missing; skipping");
          continue;
        }
        let loaded = read_json::<Vec<Template>>(&path).and_then(|f| cat.insert_formats(r.id, variant, f));
        if let Err(e) = loaded {
          error!(target: "catalog", form = %r.id, ?variant, error = %e, "Skipping form");
        }
      }
    }

    info!(target: "catalog", dir = %dir.display(), forms = cat.records.len(), loaded = cat.formats.len(), "Template catalog loaded");
    Ok(cat)
  }

  pub fn form_count(&self) -> usize {
    self.records.len()
  }

  pub fn record(&self, form: FormId) -> Option<&FormRecord> {
    self.by_id.get(&form).map(|&i| &self.records[i])
  }
}

impl TemplateStore for TemplateCatalog {
  fn find_by_name(&self, name: &str, variant: CatalogVariant) -> Result<FormId, CheckError> {
    let name = name.trim();
    let r = self.records.iter().find(|r| r.answers_to(name)).ok_or(CheckError::UnknownForm)?;
    match variant {
      CatalogVariant::Qin => Ok(r.id),
      CatalogVariant::Long if r.long_available => Ok(r.id),
      CatalogVariant::Long => Err(CheckError::VariantUnavailable(r.id)),
    }
  }

  fn variants_of(&self, form: FormId, variant: CatalogVariant) -> Result<&[Template], CheckError> {
    self.formats
      .get(&(form, variant))
      .map(Vec::as_slice)
      .ok_or(CheckError::VariantUnavailable(form))
  }

  fn forms_of_length(&self, n: usize, variant: CatalogVariant) -> Vec<FormId> {
    self.by_length.get(&(variant, n)).cloned().unwrap_or_default()
  }

  fn display_name(&self, form: FormId, script: Script) -> Option<String> {
    self.record(form).and_then(|r| r.display_name(script)).map(str::to_string)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::seeds::builtin_catalog;

  #[test]
  fn builtin_catalog_indexes_lengths() {
    let cat = builtin_catalog();
    let ids = cat.forms_of_length(27, CatalogVariant::Qin);
    assert_eq!(ids.len(), 1);
    assert_eq!(cat.display_name(ids[0], Script::Simplified).as_deref(), Some("忆江南"));
    assert_eq!(cat.display_name(ids[0], Script::Traditional).as_deref(), Some("憶江南"));
    assert!(cat.forms_of_length(31, CatalogVariant::Qin).is_empty());
  }

  #[test]
  fn name_lookup_respects_catalog_variant() {
    let cat = builtin_catalog();
    assert!(cat.find_by_name("望江南", CatalogVariant::Long).is_ok());
    let id = cat.find_by_name("如梦令", CatalogVariant::Qin).expect("qin");
    assert_eq!(cat.find_by_name("如夢令", CatalogVariant::Long), Err(CheckError::VariantUnavailable(id)));
    assert_eq!(cat.find_by_name("不存在", CatalogVariant::Qin), Err(CheckError::UnknownForm));
  }

  #[test]
  fn malformed_formats_are_rejected() {
    let mut cat = TemplateCatalog::new(vec![]);
    let bad: Template = serde_json::from_value(serde_json::json!({
      "tone_mask": "平平",
      "content_segments": ["春风"],
      "template_segments": ["平平"],
      "rhyme_positions": [5]
    }))
    .expect("template");
    let err = cat.insert_formats(FormId(1), CatalogVariant::Qin, vec![bad]).unwrap_err();
    assert!(matches!(err, StoreError::InvalidTemplate { format: 0, .. }));
    assert!(cat.forms_of_length(2, CatalogVariant::Qin).is_empty());
  }

  #[test]
  fn load_dir_reads_index_and_formats() {
    let dir = std::env::temp_dir().join(format!("gelv-catalog-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(dir.join("ci_list")).expect("mkdir");
    std::fs::write(
      dir.join("ci_index.json"),
      r#"[{"idx":"7","names":["十六字令"],"names_trad":["十六字令"],"long_exist":false}]"#,
    )
    .expect("index");
    std::fs::write(
      dir.join("ci_list").join("cipai_7.json"),
      r#"[{"ge_lyu_str":"平中仄平平仄仄平平平仄中仄仄平平",
           "ci_sep":["天","休使圆蟾照客眠","人何在　桂影自婵娟"],
           "ge_lyu_sep":["平（韵）","中仄平平仄仄平（韵）","平平仄，中仄仄平平（韵）"],
           "rhyme_pos":[0,7,15],
           "yun_classify":{"1":[0,7,15]}}]"#,
    )
    .expect("formats");

    let cat = TemplateCatalog::load_dir(&dir).expect("load");
    assert_eq!(cat.forms_of_length(16, CatalogVariant::Qin), vec![FormId(7)]);
    assert_eq!(cat.variants_of(FormId(7), CatalogVariant::Qin).map(|v| v.len()), Ok(1));
    let _ = std::fs::remove_dir_all(&dir);
  }
}
