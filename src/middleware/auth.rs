use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};
use mimcal_auth::{Claims, verify_token};
use mimcal_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::state::AppState;

/// Extractor that validates the bearer token and provides its claims.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Claims);

impl AuthUser {
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        self.0
            .user_id()
            .ok_or_else(|| AppError::unauthorized("Invalid user ID in token"))
    }

    pub fn username(&self) -> &str {
        &self.0.username
    }
}

fn bearer_token(parts: &Parts) -> Result<Option<&str>, AppError> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
        return Ok(None);
    };

    value
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(Some)
        .ok_or_else(|| AppError::unauthorized("Invalid authorization header format"))
}

/// Foreign keys that point a written row at its acting user.
const USER_REFERENCE_SUFFIXES: [&str; 3] = ["user_id_fkey", "author_id_fkey", "owner_id_fkey"];

/// A signed token may name a user that was never registered here, or one
/// deleted since the token was issued. Both are rejected as unauthenticated.
async fn ensure_registered(db: &PgPool, user_id: Uuid) -> Result<(), AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
        .bind(user_id)
        .fetch_one(db)
        .await?;

    if exists {
        Ok(())
    } else {
        Err(AppError::unauthorized("User is not registered"))
    }
}

pub(crate) fn references_missing_user(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err
        && db_err.is_foreign_key_violation()
    {
        return db_err
            .constraint()
            .is_some_and(|name| USER_REFERENCE_SUFFIXES.iter().any(|s| name.ends_with(s)));
    }
    false
}

/// Maps a write that references a missing acting user to 401. The user may
/// be deleted between authentication and the write.
pub(crate) fn map_unregistered_user(err: sqlx::Error) -> AppError {
    if references_missing_user(&err) {
        AppError::unauthorized("User is not registered")
    } else {
        AppError::from(err)
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?
            .ok_or_else(|| AppError::unauthorized("Missing authorization header"))?;

        let claims = verify_token(token, &state.jwt_config)?;
        let auth_user = AuthUser(claims);
        ensure_registered(&state.db, auth_user.user_id()?).await?;

        Ok(auth_user)
    }
}

/// The acting identity of a request, which may be anonymous.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Caller {
    #[default]
    Anonymous,
    User(Uuid),
}

impl Caller {
    pub fn user_id(self) -> Option<Uuid> {
        match self {
            Caller::Anonymous => None,
            Caller::User(id) => Some(id),
        }
    }

    /// Fails with 401 for anonymous callers.
    pub fn require_user(self) -> Result<Uuid, AppError> {
        self.user_id()
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts)? else {
            return Ok(Caller::Anonymous);
        };

        let claims = verify_token(token, &state.jwt_config)?;
        let user_id = claims
            .user_id()
            .ok_or_else(|| AppError::unauthorized("Invalid user ID in token"))?;
        ensure_registered(&state.db, user_id).await?;

        Ok(Caller::User(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};

    fn claims_for(sub: String) -> Claims {
        Claims {
            sub,
            username: "ola".to_string(),
            exp: 9999999999,
            iat: 1234567890,
        }
    }

    fn parts_with(header_value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/schedules");
        if let Some(value) = header_value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_user_id() {
        let user_id = Uuid::new_v4();
        let auth_user = AuthUser(claims_for(user_id.to_string()));
        assert_eq!(auth_user.user_id().unwrap(), user_id);
        assert_eq!(auth_user.username(), "ola");
    }

    #[test]
    fn test_user_id_rejects_malformed_subject() {
        let auth_user = AuthUser(claims_for("not-a-uuid".to_string()));
        let err = auth_user.user_id().unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token(&parts_with(None)).unwrap(), None);
        assert_eq!(
            bearer_token(&parts_with(Some("Bearer abc.def"))).unwrap(),
            Some("abc.def")
        );
        assert!(bearer_token(&parts_with(Some("Token abc"))).is_err());
    }

    #[test]
    fn test_anonymous_caller_requires_user() {
        let err = Caller::Anonymous.require_user().unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        let id = Uuid::new_v4();
        assert_eq!(Caller::User(id).require_user().unwrap(), id);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_ensure_registered(pool: PgPool) {
        let user_id = crate::test_support::create_user(&pool, "ola").await;
        ensure_registered(&pool, user_id).await.unwrap();

        let err = ensure_registered(&pool, Uuid::new_v4()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_missing_user_reference_maps_to_unauthorized(pool: PgPool) {
        let err = sqlx::query("INSERT INTO schedules (name, owner_id, default_permission_level) VALUES ('s', $1, 1)")
            .bind(Uuid::new_v4())
            .execute(&pool)
            .await
            .unwrap_err();
        assert_eq!(map_unregistered_user(err).status, StatusCode::UNAUTHORIZED);

        let err = sqlx::query("SELECT 1/0").execute(&pool).await.unwrap_err();
        assert_eq!(
            map_unregistered_user(err).status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
