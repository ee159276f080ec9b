mod common;

use std::sync::atomic::Ordering;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{Harness, ScriptedModel, ALICE_TOKEN, BOB_TOKEN, CLEANUP_SECRET};
use yf_domain::message::Role;
use yf_prompt::contract::{FALLBACK_REPLY_EN, NAME_REPLY};
use yf_sessions::Clock;

fn app(h: &Harness) -> Router {
    yf_gateway::api::router().with_state(h.state.clone())
}

async fn call(h: &Harness, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app(h).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn send_req(token: Option<&str>, body: Value) -> Request<Body> {
    let mut b = Request::builder()
        .method("POST")
        .uri("/v1/chat/send")
        .header("content-type", "application/json");
    if let Some(t) = token {
        b = b.header("authorization", format!("Bearer {t}"));
    }
    b.body(Body::from(body.to_string())).unwrap()
}

fn get_req(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().method("GET").uri(uri);
    if let Some(t) = token {
        b = b.header("authorization", format!("Bearer {t}"));
    }
    b.body(Body::empty()).unwrap()
}

fn authed(method: &str, uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn cleanup_req(secret: Option<&str>) -> Request<Body> {
    let mut b = Request::builder().method("POST").uri("/v1/cleanup");
    if let Some(s) = secret {
        b = b.header("x-cleanup-secret", s);
    }
    b.body(Body::empty()).unwrap()
}

// ── send ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn send_returns_both_messages_and_window() {
    let h = Harness::new();
    let (status, body) = call(
        &h,
        send_req(Some(ALICE_TOKEN), json!({ "message": "Hi, what is your name?" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["userMessage"]["role"], "user");
    assert_eq!(body["userMessage"]["content"], "Hi, what is your name?");
    assert_eq!(body["assistantMessage"]["role"], "assistant");
    assert_eq!(body["assistantMessage"]["content"], NAME_REPLY);
    assert_eq!(body["history"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn wire_messages_hide_expiry_and_owner() {
    let h = Harness::new();
    let (_, body) = call(&h, send_req(Some(ALICE_TOKEN), json!({ "message": "hello" }))).await;
    let msg = body["userMessage"].as_object().unwrap();
    let mut keys: Vec<_> = msg.keys().map(String::as_str).collect();
    keys.sort_unstable();
    assert_eq!(keys, ["attachments", "content", "created_at", "id", "role"]);
}

#[tokio::test]
async fn send_with_model_outage_still_succeeds() {
    let h = Harness::with_model(ScriptedModel::failing());
    let (status, body) =
        call(&h, send_req(Some(ALICE_TOKEN), json!({ "message": "Suggest a snack" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["assistantMessage"]["content"], FALLBACK_REPLY_EN);
    assert_eq!(h.store.inner.row_count(), 2);
}

#[tokio::test]
async fn send_rejects_bad_input_before_auth() {
    let h = Harness::new();
    let cases = [
        json!({ "message": "" }),
        json!({ "message": "   " }),
        json!({ "message": "x".repeat(4_001) }),
        json!({}),
    ];
    for body in cases {
        let (status, resp) = call(&h, send_req(None, body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(resp["error"].is_string());
    }
    assert_eq!(h.verifier.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn send_rejects_malformed_json() {
    let h = Harness::new();
    let req = Request::builder()
        .method("POST")
        .uri("/v1/chat/send")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = call(&h, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid request body");
}

#[tokio::test]
async fn send_accepts_the_longest_message() {
    let h = Harness::new();
    let (status, _) =
        call(&h, send_req(Some(ALICE_TOKEN), json!({ "message": "x".repeat(4_000) }))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn send_requires_a_valid_token() {
    let h = Harness::new();
    for token in [None, Some("forged")] {
        let (status, body) = call(&h, send_req(token, json!({ "message": "hi" }))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "Unauthorized");
    }
    assert_eq!(h.store.appends.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn store_failure_is_a_generic_500() {
    let h = Harness::new();
    h.store.fail_load.store(true, Ordering::SeqCst);
    let (status, body) = call(&h, send_req(Some(ALICE_TOKEN), json!({ "message": "hi" }))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Storage unavailable");
}

#[tokio::test]
async fn null_attachments_and_locale_are_accepted() {
    let h = Harness::new();
    let (status, body) = call(
        &h,
        send_req(
            Some(ALICE_TOKEN),
            json!({ "message": "hello", "attachments": null, "locale": null }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["userMessage"]["attachments"], json!([]));
}

// ── history ──────────────────────────────────────────────────────────

#[tokio::test]
async fn history_lists_the_callers_messages() {
    let h = Harness::new();
    call(&h, send_req(Some(ALICE_TOKEN), json!({ "message": "one" }))).await;
    call(&h, send_req(Some(BOB_TOKEN), json!({ "message": "bob" }))).await;

    let (status, body) = call(&h, get_req("/v1/chat/history", Some(ALICE_TOKEN))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 2);
    assert_eq!(body["history"][0]["content"], "one");
    assert_eq!(body["expiresInfo"], "Messages are kept for 24 hours");
}

#[tokio::test]
async fn history_limit_is_clamped() {
    let h = Harness::new();
    let now = h.clock.now();
    for i in 0..110 {
        h.seed(
            "alice",
            Role::User,
            &format!("m{i}"),
            now - Duration::minutes(200 - i),
        );
    }

    let cases = [
        ("/v1/chat/history?limit=0", 1),
        ("/v1/chat/history?limit=-3", 1),
        ("/v1/chat/history?limit=101", 100),
        ("/v1/chat/history?limit=7", 7),
        ("/v1/chat/history?limit=abc", 40),
        ("/v1/chat/history", 40),
    ];
    for (uri, expected) in cases {
        let (status, body) = call(&h, get_req(uri, Some(ALICE_TOKEN))).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["count"], expected, "{uri}");
    }

    // Newest messages win; oldest first within the page.
    let (_, body) = call(&h, get_req("/v1/chat/history?limit=1", Some(ALICE_TOKEN))).await;
    assert_eq!(body["history"][0]["content"], "m109");
}

#[tokio::test]
async fn malformed_history_query_falls_back_to_default() {
    let h = Harness::new();
    let now = h.clock.now();
    for i in 0..50 {
        h.seed("alice", Role::User, &format!("m{i}"), now - Duration::minutes(60 - i));
    }

    let (status, body) = call(
        &h,
        get_req("/v1/chat/history?limit=1&limit=2", Some(ALICE_TOKEN)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 40);
}

#[tokio::test]
async fn history_requires_auth() {
    let h = Harness::new();
    let (status, _) = call(&h, get_req("/v1/chat/history", None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ── clear ────────────────────────────────────────────────────────────

#[tokio::test]
async fn clear_then_history_is_empty() {
    let h = Harness::new();
    call(&h, send_req(Some(ALICE_TOKEN), json!({ "message": "one" }))).await;
    call(&h, send_req(Some(ALICE_TOKEN), json!({ "message": "two" }))).await;

    let (status, body) = call(&h, authed("DELETE", "/v1/chat/history", ALICE_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "success": true, "message": "Chat history cleared" }));

    let (_, body) = call(&h, get_req("/v1/chat/history", Some(ALICE_TOKEN))).await;
    assert_eq!(body["count"], 0);
    assert_eq!(body["history"], json!([]));
}

#[tokio::test]
async fn clear_alias_only_touches_the_caller() {
    let h = Harness::new();
    call(&h, send_req(Some(ALICE_TOKEN), json!({ "message": "alice" }))).await;
    call(&h, send_req(Some(BOB_TOKEN), json!({ "message": "bob" }))).await;

    let (status, _) = call(&h, authed("POST", "/v1/chat/clear", ALICE_TOKEN)).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&h, get_req("/v1/chat/history", Some(BOB_TOKEN))).await;
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn clear_requires_auth() {
    let h = Harness::new();
    call(&h, send_req(Some(ALICE_TOKEN), json!({ "message": "keep me" }))).await;
    let (status, _) = call(&h, authed("DELETE", "/v1/chat/history", "forged")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(h.store.inner.row_count(), 2);
}

// ── cleanup ──────────────────────────────────────────────────────────

#[tokio::test]
async fn cleanup_without_secret_is_forbidden_and_deletes_nothing() {
    let h = Harness::new();
    let now = h.clock.now();
    h.seed("alice", Role::User, "stale", now - Duration::hours(30));

    for secret in [None, Some("wrong")] {
        let (status, body) = call(&h, cleanup_req(secret)).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden");
    }
    assert_eq!(h.store.inner.row_count(), 1);
}

#[tokio::test]
async fn cleanup_with_secret_sweeps_expired_rows() {
    let h = Harness::new();
    let now = h.clock.now();
    h.seed("alice", Role::User, "stale", now - Duration::hours(30));
    h.seed("bob", Role::User, "fresh", now - Duration::hours(1));

    let (status, body) = call(&h, cleanup_req(Some(CLEANUP_SECRET))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["deleted"], 1);
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));

    let (_, body) = call(&h, cleanup_req(Some(CLEANUP_SECRET))).await;
    assert_eq!(body["deleted"], 0);
    assert_eq!(h.store.inner.row_count(), 1);
}

#[tokio::test]
async fn cleanup_store_failure_is_500() {
    let h = Harness::new();
    h.store.fail_sweep.store(true, Ordering::SeqCst);
    let (status, _) = call(&h, cleanup_req(Some(CLEANUP_SECRET))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

// ── health ───────────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_public() {
    let h = Harness::new();
    let (status, body) = call(&h, get_req("/health", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}
