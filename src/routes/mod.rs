//! Router assembly: HTTP endpoints, WebSocket upgrade, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - REST-ish API under `/api/v1/...`
/// - CORS (allow any origin/method/headers); adjust for production if needed
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // HTTP API
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/check/ci", post(http::http_post_check_ci))
        .route("/api/v1/check/qu", post(http::http_post_check_qu))
        .route("/api/v1/check/couplet", post(http::http_post_check_couplet))
        .route("/api/v1/forms", get(http::http_get_forms))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::config::Defaults;
    use crate::oracle::Phonology;
    use crate::qu::QuPatterns;
    use crate::seeds::builtin_catalog;

    fn app() -> Router {
        let book = QuPatterns::parse("## 小令\n```\n平平仄\n```\n");
        let state = AppState::from_parts(builtin_catalog(), Phonology::new(), book, None, Defaults::default());
        build_router(Arc::new(state))
    }

    async fn json_of(res: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn health_reports_form_count() {
        let res = app()
            .oneshot(Request::builder().uri("/api/v1/health").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        let v = json_of(res).await;
        assert_eq!(v["ok"], true);
        assert_eq!(v["forms"], 5);
    }

    #[tokio::test]
    async fn ci_check_round_trip() {
        let body = serde_json::json!({
            "text": "江南好，风景旧曾谙。日出江花红胜火，春来江水绿如蓝。能不忆江南。",
            "form": "忆江南",
            "format": "１",
        });
        let res = app().oneshot(post_json("/api/v1/check/ci", body)).await.expect("response");
        assert_eq!(res.status(), StatusCode::OK);
        let v = json_of(res).await;
        assert_eq!(v["ok"], true);
        assert_eq!(v["form"], 1);
        assert_eq!(v["format"], 1);
        assert!(v["report"].as_str().unwrap_or_default().starts_with("你的格式为 格一"));
        assert!(v["request_id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn ci_errors_are_ok_responses_with_codes() {
        let body = serde_json::json!({ "text": "江南好", "form": "忆江南", "format": "x" });
        let v = json_of(app().oneshot(post_json("/api/v1/check/ci", body)).await.expect("response")).await;
        assert_eq!(v["ok"], false);
        assert_eq!(v["code"], "no_structural_match");
    }

    #[tokio::test]
    async fn qu_uses_named_tune() {
        let body = serde_json::json!({ "text": "江南好", "tune": "小令", "rhyme_book": "xinyun" });
        let v = json_of(app().oneshot(post_json("/api/v1/check/qu", body)).await.expect("response")).await;
        assert_eq!(v["ok"], true);
        assert!(v["report"].as_str().unwrap_or_default().starts_with("平平仄\n江南好\n"));
    }

    #[tokio::test]
    async fn couplet_length_mismatch() {
        let body = serde_json::json!({ "upper": "天高", "lower": "地" });
        let v = json_of(app().oneshot(post_json("/api/v1/check/couplet", body)).await.expect("response")).await;
        assert_eq!(v["ok"], false);
        assert_eq!(v["code"], "length_mismatch");
    }

    #[tokio::test]
    async fn forms_lookup_by_length() {
        let res = app()
            .oneshot(Request::builder().uri("/api/v1/forms?length=33").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        let v = json_of(res).await;
        assert_eq!(v["forms"][0]["name"], "如梦令");
    }
}
