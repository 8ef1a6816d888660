//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs basic request and result info.

use std::sync::Arc;
use axum::{extract::{State, Query}, Json, response::IntoResponse};
use tracing::{info, instrument};

use crate::protocol::*;
use crate::state::AppState;
use crate::logic::*;

#[instrument(level = "info", skip(state))]
pub async fn http_health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(HealthOut { ok: true, forms: state.catalog.form_count() })
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len(), form = ?body.form))]
pub async fn http_post_check_ci(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CiCheckIn>,
) -> impl IntoResponse {
  let out = do_check_ci(&state, &body);
  info!(target: "check", request_id = %out.request_id, ok = out.ok, passed = out.passed, "HTTP ci check served");
  Json(out)
}

#[instrument(level = "info", skip(state, body), fields(text_len = body.text.len(), tune = ?body.tune))]
pub async fn http_post_check_qu(
  State(state): State<Arc<AppState>>,
  Json(body): Json<QuCheckIn>,
) -> impl IntoResponse {
  let out = do_check_qu(&state, &body);
  info!(target: "check", request_id = %out.request_id, ok = out.ok, passed = out.passed, "HTTP qu check served");
  Json(out)
}

#[instrument(level = "info", skip(state, body), fields(auto_suggest = body.auto_suggest))]
pub async fn http_post_check_couplet(
  State(state): State<Arc<AppState>>,
  Json(body): Json<CoupletCheckIn>,
) -> impl IntoResponse {
  let out = do_check_couplet(&state, &body).await;
  info!(target: "check", request_id = %out.request_id, ok = out.ok, passed = out.passed, "HTTP couplet check served");
  Json(out)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_forms(
  State(state): State<Arc<AppState>>,
  Query(q): Query<FormsQuery>,
) -> impl IntoResponse {
  Json(do_lookup_forms(&state, &q))
}
