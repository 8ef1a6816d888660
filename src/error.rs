//! Error types. Every checker returns a tagged `Result`; user-facing messages are available in
//! both scripts and each variant carries a stable machine code for the API.

use thiserror::Error;

use crate::domain::{FormId, Script};

/// Why a Ci check produced no report.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
  #[error("不能找到你输入的词牌。")]
  UnknownForm,

  #[error("龙谱中没有该词谱，请切换为钦谱。")]
  VariantUnavailable(FormId),

  #[error("输入内容无法匹配已有词牌，请检查内容或将词谱更换为钦谱，你输入了{length}字。")]
  NoLengthMatch { length: usize },

  #[error("格式与输入词牌不匹配，可能有不能识别的生僻字，你输入了{length}字。")]
  NoStructuralMatch { length: usize },

  #[error("格式数字错误。")]
  MalformedVariantSelector,
}

impl CheckError {
  pub fn code(&self) -> &'static str {
    match self {
      CheckError::UnknownForm => "unknown_form",
      CheckError::VariantUnavailable(_) => "variant_unavailable",
      CheckError::NoLengthMatch { .. } => "no_length_match",
      CheckError::NoStructuralMatch { .. } => "no_structural_match",
      CheckError::MalformedVariantSelector => "malformed_variant_selector",
    }
  }

  pub fn message(&self, script: Script) -> String {
    if !script.is_trad() {
      return self.to_string();
    }
    match self {
      CheckError::UnknownForm => "不能找到你輸入的詞牌。".into(),
      CheckError::VariantUnavailable(_) => "龍譜中沒有該詞譜，請切換為欽譜。".into(),
      CheckError::NoLengthMatch { length } => {
        format!("輸入內容無法匹配已有詞牌，請檢查內容或將詞譜更換為欽譜，你輸入了{length}字。")
      }
      CheckError::NoStructuralMatch { length } => {
        format!("格式與輸入詞牌不匹配，可能有不能識別的生僻字，你輸入了{length}字。")
      }
      CheckError::MalformedVariantSelector => "格式數字錯誤。".into(),
    }
  }
}

/// Qu (free pattern) check failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuError {
  #[error("缺少曲格 pattern。请提供由平/仄/中组成的格律。")]
  MissingPattern,

  #[error("曲格行数不匹配：pattern {pattern} 行，文本 {text} 行。")]
  LineCountMismatch { pattern: usize, text: usize },

  #[error("第{line}行字数不匹配：pattern {pattern} 字，文本 {text} 字。")]
  LineLengthMismatch { line: usize, pattern: usize, text: usize },
}

impl QuError {
  pub fn code(&self) -> &'static str {
    match self {
      QuError::MissingPattern => "missing_pattern",
      QuError::LineCountMismatch { .. } => "line_count_mismatch",
      QuError::LineLengthMismatch { .. } => "line_length_mismatch",
    }
  }
}

/// Couplet check failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoupletError {
  #[error("上下联字数不一致：上联{upper}字，下联{lower}字。")]
  LengthMismatch { upper: usize, lower: usize },

  #[error("上下联不能为空。")]
  Empty,
}

impl CoupletError {
  pub fn code(&self) -> &'static str {
    match self {
      CoupletError::LengthMismatch { .. } => "length_mismatch",
      CoupletError::Empty => "empty",
    }
  }
}

/// Reference-data loading failures.
#[derive(Error, Debug)]
pub enum StoreError {
  #[error("I/O error reading {path}: {source}")]
  Io { path: String, #[source] source: std::io::Error },

  #[error("JSON error in {path}: {source}")]
  Json { path: String, #[source] source: serde_json::Error },

  #[error("invalid format {format} of form {form}: {source}")]
  InvalidTemplate { form: FormId, format: usize, #[source] source: TemplateError },
}

/// A catalog format that breaks its structural invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
  #[error("segments hold {segments} characters but the tone mask has {mask}")]
  LengthDrift { segments: usize, mask: usize },

  #[error("rhyme position {position} outside 0..{len}")]
  RhymeOutOfRange { position: usize, len: usize },
}

/// Suggestion service failures.
#[derive(Error, Debug)]
pub enum SuggestError {
  #[error("HTTP error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("Sou-Yun HTTP {status}: {body}")]
  Status { status: u16, body: String },
}
