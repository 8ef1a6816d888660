//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::logic::*;
use crate::state::AppState;

#[instrument(level = "info", skip(ws, state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "gelv_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "gelv_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = handle_text(&txt, &state).await;
        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "gelv_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "gelv_backend", "WebSocket disconnected");
}

/// Parse one text frame and produce the reply.
pub async fn handle_text(txt: &str, state: &AppState) -> ServerWsMessage {
  match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(incoming) => {
      debug!(target: "gelv_backend", "WS received: {:?}", &incoming);
      handle_client_ws(incoming, state).await
    }
    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
  }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::CheckCi(body) => {
      let out = do_check_ci(state, &body);
      info!(target: "check", request_id = %out.request_id, ok = out.ok, "WS ci check served");
      ServerWsMessage::CiResult(out)
    }

    ClientWsMessage::CheckQu(body) => ServerWsMessage::QuResult(do_check_qu(state, &body)),

    ClientWsMessage::CheckCouplet(body) => ServerWsMessage::CoupletResult(do_check_couplet(state, &body).await),

    ClientWsMessage::LookupForms(q) => ServerWsMessage::Forms(do_lookup_forms(state, &q)),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::Defaults;
  use crate::oracle::Phonology;
  use crate::qu::QuPatterns;
  use crate::seeds::builtin_catalog;

  fn state() -> AppState {
    AppState::from_parts(builtin_catalog(), Phonology::new(), QuPatterns::default(), None, Defaults::default())
  }

  #[tokio::test]
  async fn ping_and_bad_json() {
    let s = state();
    assert!(matches!(handle_text(r#"{"type":"ping"}"#, &s).await, ServerWsMessage::Pong));
    match handle_text("not json", &s).await {
      ServerWsMessage::Error { message } => assert!(message.starts_with("Invalid JSON")),
      other => panic!("unexpected {other:?}"),
    }
  }

  #[tokio::test]
  async fn check_ci_over_ws() {
    let s = state();
    let reply = handle_text(r#"{"type":"check_ci","text":"春眠不觉晓"}"#, &s).await;
    let v = serde_json::to_value(&reply).expect("json");
    assert_eq!(v["type"], "ci_result");
    assert_eq!(v["ok"], false);
    assert_eq!(v["code"], "no_length_match");
  }

  #[tokio::test]
  async fn lookup_forms_over_ws() {
    let s = state();
    let v = serde_json::to_value(handle_text(r#"{"type":"lookup_forms","length":16}"#, &s).await).expect("json");
    assert_eq!(v["type"], "forms");
    assert_eq!(v["forms"][0]["name"], "十六字令");
  }
}
