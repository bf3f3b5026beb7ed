use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use mimcal::router::init_router;
use mimcal::state::AppState;
use mimcal_auth::create_access_token;
use mimcal_config::{CorsConfig, JwtConfig};
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

#[allow(dead_code)]
pub struct TestUser {
    pub id: Uuid,
    pub username: String,
    pub token: String,
}

pub fn jwt_config() -> JwtConfig {
    JwtConfig::from_lookup(|key| match key {
        "JWT_SECRET" => Some("integration-test-secret".to_string()),
        _ => None,
    })
}

pub fn setup_test_app(pool: PgPool) -> Router {
    let state = AppState {
        db: pool,
        jwt_config: jwt_config(),
        cors_config: CorsConfig::from_lookup(|_| None),
    };
    init_router(state)
}

/// Inserts a user directly and mints a token for it, the way the identity
/// provider would.
pub async fn create_test_user(pool: &PgPool, username: &str) -> TestUser {
    let id: Uuid = sqlx::query_scalar(
        "INSERT INTO users (username, password_hash) VALUES ($1, 'unused') RETURNING id",
    )
    .bind(username)
    .fetch_one(pool)
    .await
    .unwrap();

    let token = create_access_token(id, username, &jwt_config()).unwrap();

    TestUser {
        id,
        username: username.to_string(),
        token,
    }
}

/// Sends one request through a fresh router and returns status and JSON body
/// (`Value::Null` for empty bodies).
pub async fn send(
    pool: &PgPool,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = setup_test_app(pool.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

/// Creates a schedule as `owner` and returns its id.
#[allow(dead_code)]
pub async fn create_schedule(pool: &PgPool, owner: &TestUser, default_level: i32) -> String {
    let (status, body) = send(
        pool,
        "POST",
        "/api/schedules",
        Some(&owner.token),
        Some(serde_json::json!({
            "name": "Linear Algebra",
            "default_permission_level": default_level
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

/// Creates an event in `schedule_id` as `user` and returns its id.
#[allow(dead_code)]
pub async fn create_event(pool: &PgPool, user: &TestUser, schedule_id: &str) -> String {
    let (status, body) = send(
        pool,
        "POST",
        "/api/events",
        Some(&user.token),
        Some(serde_json::json!({
            "schedule_id": schedule_id,
            "title": "Lecture 1",
            "start_date": "2026-03-02T10:00:00Z",
            "end_date": "2026-03-02T12:00:00Z"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}
