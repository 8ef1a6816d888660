//! Built-in forms that keep the service useful without a data directory.
//!
//! Ids here are local to the built-in catalog. Masks follow 钦定词谱; only 忆江南 carries a
//! 龙谱 entry.

use std::collections::BTreeMap;

use tracing::error;

use crate::catalog::TemplateCatalog;
use crate::domain::{CatalogVariant, FormId, FormRecord, Template};

struct SeedForm {
  id: u32,
  names: &'static [&'static str],
  names_trad: &'static [&'static str],
  long: bool,
  mask: &'static str,
  content: &'static [&'static str],
  display: &'static [&'static str],
  rhymes: &'static [usize],
  groups: &'static [(&'static str, &'static [i64])],
}

const SEED_FORMS: &[SeedForm] = &[
  SeedForm {
    id: 1,
    names: &["忆江南", "望江南", "梦江南"],
    names_trad: &["憶江南", "望江南", "夢江南"],
    long: true,
    mask: "中平仄中仄仄平平中仄中平平仄仄中平中仄仄平平中仄仄平平",
    content: &["江南好\u{3000}风景旧曾谙", "日出江花红胜火\u{3000}春来江水绿如蓝", "能不忆江南"],
    display: &["中平仄，中仄仄平平（韵）。", "中仄中平平仄仄，中平中仄仄平平（韵）。", "中仄仄平平（韵）。"],
    rhymes: &[7, 21, 26],
    groups: &[("1", &[7, 21, 26])],
  },
  SeedForm {
    id: 2,
    names: &["杨柳枝", "柳枝"],
    names_trad: &["楊柳枝", "柳枝"],
    long: false,
    mask: "中仄平平中仄平中平中仄仄平平中平中仄平平仄中仄平平中仄平",
    content: &["塞北梅花羌笛吹", "淮南桂树小山词", "请君莫奏前朝曲\u{3000}听唱新翻杨柳枝"],
    display: &["中仄平平中仄平（韵），", "中平中仄仄平平（韵）。", "中平中仄平平仄，中仄平平中仄平（韵）。"],
    rhymes: &[6, 13, 27],
    groups: &[("1", &[6, 13, 27])],
  },
  SeedForm {
    id: 3,
    names: &["如梦令", "忆仙姿", "宴桃源"],
    names_trad: &["如夢令", "憶仙姿", "宴桃源"],
    long: false,
    mask: "中仄中平平仄中仄中平平仄中仄仄平平中仄中平平仄平仄平仄中仄中平平仄",
    content: &["昨夜雨疏风骤", "浓睡不消残酒", "试问卷帘人\u{3000}却道海棠依旧", "知否", "知否", "应是绿肥红瘦"],
    display: &[
      "中仄中平平仄（韵），",
      "中仄中平平仄（韵）。",
      "中仄仄平平，中仄中平平仄（韵）。",
      "平仄（韵），",
      "平仄（叠韵），",
      "中仄中平平仄（韵）。",
    ],
    rhymes: &[5, 11, 22, 24, 26, 32],
    groups: &[("1", &[5, 11, 22, 24, 26, 32])],
  },
  SeedForm {
    id: 4,
    names: &["十六字令", "苍梧谣", "归字谣"],
    names_trad: &["十六字令", "蒼梧謠", "歸字謠"],
    long: false,
    mask: "平中仄平平仄仄平平平仄中仄仄平平",
    content: &["天", "休使圆蟾照客眠", "人何在\u{3000}桂影自婵娟"],
    display: &["平（韵）。", "中仄平平仄仄平（韵）。", "平平仄，中仄仄平平（韵）。"],
    rhymes: &[0, 7, 15],
    groups: &[("1", &[0, 7, 15])],
  },
  SeedForm {
    id: 5,
    names: &["菩萨蛮", "子夜歌", "重叠金"],
    names_trad: &["菩薩蠻", "子夜歌", "重疊金"],
    long: false,
    mask: "中平中仄平平仄中平中仄平平仄中仄仄平平中平中仄平中平平仄仄中仄平平仄中仄仄平平中平中仄平",
    content: &[
      "平林漠漠烟如织",
      "寒山一带伤心碧",
      "暝色入高楼",
      "有人楼上愁",
      "玉阶空伫立",
      "宿鸟归飞急",
      "何处是归程",
      "长亭更短亭",
    ],
    display: &[
      "中平中仄平平仄（韵），",
      "中平中仄平平仄（韵）。",
      "中仄仄平平（换平韵），",
      "中平中仄平（韵）。",
      "中平平仄仄（换仄韵），",
      "中仄平平仄（韵）。",
      "中仄仄平平（换平韵），",
      "中平中仄平（韵）。",
    ],
    rhymes: &[6, 13, 18, 23, 28, 33, 38, 43],
    groups: &[("1", &[6, 13]), ("2", &[18, 23]), ("3", &[28, 33]), ("4", &[38, 43])],
  },
];

fn to_template(f: &SeedForm) -> Result<Template, String> {
  Ok(Template {
    tone_mask: f.mask.parse()?,
    content_segments: f.content.iter().map(|s| s.to_string()).collect(),
    template_segments: f.display.iter().map(|s| s.to_string()).collect(),
    rhyme_positions: f.rhymes.to_vec(),
    rhyme_groups: f.groups.iter().map(|(k, v)| (k.to_string(), v.to_vec())).collect::<BTreeMap<_, _>>(),
  })
}

/// Catalog of the built-in forms. A seed that fails validation is logged and left out.
pub fn builtin_catalog() -> TemplateCatalog {
  let records = SEED_FORMS
    .iter()
    .map(|f| FormRecord {
      id: FormId(f.id),
      names: f.names.iter().map(|s| s.to_string()).collect(),
      names_trad: f.names_trad.iter().map(|s| s.to_string()).collect(),
      long_available: f.long,
    })
    .collect();
  let mut cat = TemplateCatalog::new(records);

  for f in SEED_FORMS {
    let template = match to_template(f) {
      Ok(t) => t,
      Err(e) => {
        error!(target: "catalog", form = f.id, error = %e, "Bad built-in seed");
        continue;
      }
    };
    let mut variants = vec![CatalogVariant::Qin];
    if f.long {
      variants.push(CatalogVariant::Long);
    }
    for v in variants {
      if let Err(e) = cat.insert_formats(FormId(f.id), v, vec![template.clone()]) {
        error!(target: "catalog", form = f.id, error = %e, "Bad built-in seed");
      }
    }
  }
  cat
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::catalog::TemplateStore;

  #[test]
  fn every_seed_is_structurally_valid() {
    for f in SEED_FORMS {
      let t = to_template(f).expect("mask parses");
      assert_eq!(t.validate(), Ok(()), "seed {} invalid", f.names[0]);
      assert_eq!(t.content_segments.len(), t.rhyme_positions.len(), "seed {}", f.names[0]);
    }
  }

  #[test]
  fn builtin_catalog_serves_every_seed() {
    let cat = builtin_catalog();
    for f in SEED_FORMS {
      let v = cat.variants_of(FormId(f.id), CatalogVariant::Qin).expect("qin formats");
      assert_eq!(v.len(), 1);
    }
  }
}
