//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! The same request bodies travel over both transports; WS messages wrap them with a `type` tag.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{CatalogVariant, FormId, RhymeBook};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    CheckCi(CiCheckIn),
    CheckQu(QuCheckIn),
    CheckCouplet(CoupletCheckIn),
    LookupForms(FormsQuery),
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    CiResult(CheckOut),
    QuResult(CheckOut),
    CoupletResult(CheckOut),
    Forms(FormsOut),
    Error {
        message: String,
    },
}

//
// HTTP request/response DTOs
//

/// Options left out fall back to the configured defaults.
#[derive(Debug, Deserialize)]
pub struct CiCheckIn {
    pub text: String,
    /// 词牌 name; omitted to auto-detect.
    #[serde(default)]
    pub form: Option<String>,
    /// 1-based format (格) number.
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub catalog: Option<CatalogVariant>,
    #[serde(default)]
    pub rhyme_book: Option<RhymeBook>,
    #[serde(default)]
    pub trad: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct QuCheckIn {
    pub text: String,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub tune: Option<String>,
    #[serde(default)]
    pub rhyme_book: Option<RhymeBook>,
    #[serde(default)]
    pub trad: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct CoupletCheckIn {
    pub upper: String,
    pub lower: String,
    #[serde(default)]
    pub rhyme_book: Option<RhymeBook>,
    #[serde(default)]
    pub trad: Option<bool>,
    /// Ask Sou-Yun for replacements at unopposed positions.
    #[serde(default)]
    pub auto_suggest: bool,
}

/// Result of any check. On failure `ok` is false and `code`/`message` say why.
#[derive(Debug, Serialize, Default)]
pub struct CheckOut {
    pub request_id: String,
    pub ok: bool,
    /// The check ran and found no failing position.
    pub passed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meter_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grade: Option<char>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub form: Option<FormId>,
    /// 1-based format number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repaired: Option<String>,
}

impl CheckOut {
    pub fn success(report: String) -> Self {
        Self { request_id: Uuid::new_v4().to_string(), ok: true, report: Some(report), ..Default::default() }
    }

    pub fn failure(code: &str, message: String) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            ok: false,
            code: Some(code.to_string()),
            message: Some(message),
            ..Default::default()
        }
    }
}

/// Look forms up by name or by character count.
#[derive(Debug, Deserialize)]
pub struct FormsQuery {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub length: Option<usize>,
    #[serde(default)]
    pub catalog: Option<CatalogVariant>,
    #[serde(default)]
    pub trad: Option<bool>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct FormOut {
    pub id: FormId,
    pub name: String,
    pub formats: usize,
}

#[derive(Debug, Serialize)]
pub struct FormsOut {
    pub forms: Vec<FormOut>,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
    pub forms: usize,
}
