use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use autonoindex_core::db::unix_timestamp;
use autonoindex_server::routes::{AppState, build_router};
use autonoindex_server::storage::{TokenDatabase, TokenRegistration};

async fn app_with_db() -> (axum::Router, TokenDatabase) {
    let db = TokenDatabase::open_in_memory().await.unwrap();
    let router = build_router(AppState { db: db.clone() });
    (router, db)
}

async fn seed(db: &TokenDatabase, token: &str, status: &str, expires_at: i64, grace_until: i64, sites: &[&str]) {
    db.upsert_token(
        token,
        &TokenRegistration {
            status: status.to_string(),
            expires_at,
            grace_until,
            sites: sites.iter().map(ToString::to_string).collect(),
        },
    )
    .await
    .unwrap();
}

/// POST a raw body and return (status, parsed JSON body).
async fn send(router: &axum::Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = router.clone().oneshot(request).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn validate(router: &axum::Router, body: &str) -> (StatusCode, Value) {
    send(router, "POST", "/v1/noindex/validate", body).await
}

#[tokio::test]
async fn active_token_validates() {
    let (router, db) = app_with_db().await;
    seed(&db, "tok-1", "active", 0, 500, &[]).await;

    let body = json!({"token": "tok-1", "site": "example.com", "home_url": ""}).to_string();
    let (status, value) = validate(&router, &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["active"], json!(true));
    assert_eq!(value["grace_until"], json!(500));
}

#[tokio::test]
async fn unknown_and_empty_tokens_answer_200_denied() {
    let (router, _db) = app_with_db().await;

    for body in [
        json!({"token": "missing", "site": "example.com"}).to_string(),
        json!({"token": "", "site": "example.com"}).to_string(),
    ] {
        let (status, value) = validate(&router, &body).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["active"], json!(false));
        assert_eq!(value["grace_until"], json!(0));
    }
}

#[tokio::test]
async fn malformed_body_answers_200_denied() {
    let (router, _db) = app_with_db().await;
    let (status, value) = validate(&router, "{not json").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["active"], json!(false));
}

#[tokio::test]
async fn site_binding_is_enforced() {
    let (router, db) = app_with_db().await;
    seed(&db, "tok-1", "active", 0, 77, &["one.example"]).await;

    let body = json!({"token": "tok-1", "site": "other.example"}).to_string();
    let (_, value) = validate(&router, &body).await;
    assert_eq!(value["active"], json!(false));
    assert_eq!(value["grace_until"], json!(77));

    let body = json!({"token": "tok-1", "site": "https://ONE.example:443/"}).to_string();
    let (_, value) = validate(&router, &body).await;
    assert_eq!(value["active"], json!(true));
}

#[tokio::test]
async fn home_url_is_fallback_site_identity() {
    let (router, db) = app_with_db().await;
    seed(&db, "tok-1", "active", 0, 0, &["one.example"]).await;

    let body = json!({"token": "tok-1", "site": "", "home_url": "https://one.example/"}).to_string();
    let (_, value) = validate(&router, &body).await;
    assert_eq!(value["active"], json!(true));
}

#[tokio::test]
async fn expired_token_reports_inactive_with_surfaced_grace() {
    let (router, db) = app_with_db().await;
    let now = unix_timestamp();
    seed(&db, "tok-1", "active", now - 10, now + 3600, &[]).await;

    let body = json!({"token": "tok-1", "site": "example.com"}).to_string();
    let (_, value) = validate(&router, &body).await;
    assert_eq!(value["active"], json!(false));
    assert_eq!(value["grace_until"], json!(now + 3600));
}

#[tokio::test]
async fn repeated_validation_is_idempotent() {
    let (router, db) = app_with_db().await;
    seed(&db, "tok-1", "active", 0, 42, &["one.example"]).await;

    let body = json!({"token": "tok-1", "site": "one.example"}).to_string();
    let (_, first) = validate(&router, &body).await;
    let (_, second) = validate(&router, &body).await;
    assert_eq!(first, second);
}

#[tokio::test]
async fn admin_upsert_list_delete_roundtrip() {
    let (router, _db) = app_with_db().await;

    let payload = json!({
        "status": "active",
        "expires_at": 0,
        "grace_until": 9,
        "sites": [" one.example ", ""]
    })
    .to_string();
    let (status, value) = send(&router, "PUT", "/v1/tokens/tok-9", &payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value["status"], json!("active"));
    assert_eq!(value["sites"], json!("one.example"));

    let (status, value) = send(&router, "GET", "/v1/tokens", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(value.as_array().unwrap().len(), 1);

    let (status, _) = send(&router, "DELETE", "/v1/tokens/tok-9", "").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&router, "DELETE", "/v1/tokens/tok-9", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
