use axum::http::{header, HeaderMap};
use sqlx::PgPool;
use time::OffsetDateTime;

use crate::db::{AuthSession, SessionRepository, User, UserRole};
use crate::error::{AppError, AppResult};

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Read-path session resolution: a missing, unknown, or expired token is
/// `None`, letting query endpoints degrade to an empty result instead of
/// failing.
pub async fn resolve_session(
    pool: &PgPool,
    headers: &HeaderMap,
) -> AppResult<Option<(AuthSession, User)>> {
    let Some(token) = bearer_token(headers) else {
        return Ok(None);
    };
    Ok(SessionRepository::find_valid_session_user(pool, token, OffsetDateTime::now_utc()).await?)
}

/// Mutation-path session resolution: fails instead of degrading.
pub async fn require_session(pool: &PgPool, headers: &HeaderMap) -> AppResult<(AuthSession, User)> {
    resolve_session(pool, headers)
        .await?
        .ok_or_else(|| AppError::Unauthenticated("missing or expired session".to_string()))
}

/// Announcers own their calendar; admins may act on any calendar through
/// the privileged routes.
pub async fn require_announcer(pool: &PgPool, headers: &HeaderMap) -> AppResult<User> {
    let (_, user) = require_session(pool, headers).await?;
    match user.role {
        UserRole::Announcer | UserRole::Admin => Ok(user),
        UserRole::Client => Err(AppError::Unauthorized(
            "announcer role required".to_string(),
        )),
    }
}

pub async fn require_admin(pool: &PgPool, headers: &HeaderMap) -> AppResult<User> {
    let (_, user) = require_session(pool, headers).await?;
    if user.role != UserRole::Admin {
        return Err(AppError::Unauthorized("admin role required".to_string()));
    }
    Ok(user)
}
