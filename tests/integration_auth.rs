mod common;

use axum::http::StatusCode;
use common::{create_test_user, send};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;

#[sqlx::test(migrations = "./migrations")]
async fn test_register_user(pool: PgPool) {
    let (status, body) = send(
        &pool,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "marta", "password": "correct-horse" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "marta");
    assert!(body.get("password_hash").is_none());
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_duplicate_username(pool: PgPool) {
    create_test_user(&pool, "marta").await;

    let (status, body) = send(
        &pool,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "marta", "password": "correct-horse" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already exists"));
}

#[sqlx::test(migrations = "./migrations")]
async fn test_register_short_password(pool: PgPool) {
    let (status, _) = send(
        &pool,
        "POST",
        "/api/auth/register",
        None,
        Some(json!({ "username": "marta", "password": "short" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_profile_requires_token(pool: PgPool) {
    let (status, _) = send(&pool, "GET", "/api/users/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&pool, "GET", "/api/users/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_profile_counts_owned_schedules(pool: PgPool) {
    let user = create_test_user(&pool, "marta").await;
    common::create_schedule(&pool, &user, 1).await;

    let (status, body) = send(&pool, "GET", "/api/users/me", Some(&user.token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "marta");
    assert_eq!(body["owned_schedules"], 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_bad_token_rejected_on_public_route(pool: PgPool) {
    // An anonymous caller may list schedules, but a broken token is never
    // silently downgraded to anonymous.
    let (status, _) = send(&pool, "GET", "/api/schedules", None, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&pool, "GET", "/api/schedules", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
async fn test_token_for_unregistered_user_is_rejected(pool: PgPool) {
    let owner = create_test_user(&pool, "marta").await;
    let schedule_id = common::create_schedule(&pool, &owner, 2).await;
    let event_id = common::create_event(&pool, &owner, &schedule_id).await;

    let token =
        mimcal_auth::create_access_token(Uuid::new_v4(), "ghost", &common::jwt_config()).unwrap();

    let requests = [
        ("GET", "/api/users/me".to_string(), None),
        ("GET", "/api/schedules".to_string(), None),
        (
            "POST",
            "/api/schedules".to_string(),
            Some(json!({ "name": "Ghost", "default_permission_level": 1 })),
        ),
        ("POST", format!("/api/events/{event_id}/check"), None),
        (
            "POST",
            "/api/comments".to_string(),
            Some(json!({ "event_id": event_id, "content": "boo" })),
        ),
    ];

    for (method, uri, body) in requests {
        let (status, body) = send(&pool, method, &uri, Some(&token), body).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["error"], "User is not registered");
    }
}
