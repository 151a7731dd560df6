use sqlx::PgPool;
use time::OffsetDateTime;

use crate::db::models::{AuthSession, User};

pub struct SessionRepository;

impl SessionRepository {
    pub async fn find_by_token(
        pool: &PgPool,
        token: &str,
    ) -> Result<Option<AuthSession>, sqlx::Error> {
        sqlx::query_as::<_, AuthSession>(
            "SELECT id, user_id, token, expires_at, created_at
             FROM auth_sessions WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(pool)
        .await
    }

    /// Resolve a bearer token to its (non-expired) session and user in one
    /// step. Expired or unknown tokens resolve to `None`.
    pub async fn find_valid_session_user(
        pool: &PgPool,
        token: &str,
        now: OffsetDateTime,
    ) -> Result<Option<(AuthSession, User)>, sqlx::Error> {
        let session = match Self::find_by_token(pool, token).await? {
            Some(session) if !session.is_expired(now) => session,
            _ => return Ok(None),
        };

        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, display_name, role, status, created_at, updated_at
             FROM users WHERE id = $1",
        )
        .bind(session.user_id)
        .fetch_optional(pool)
        .await?;

        Ok(user.map(|user| (session, user)))
    }
}
