use mimcal_core::AppError;
use mimcal_observability::{track_attendance, track_like};
use sqlx::{FromRow, PgPool};
use tracing::{debug, instrument};
use uuid::Uuid;

use crate::middleware::auth::{map_unregistered_user, references_missing_user};

/// Something that can be liked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LikeTarget {
    Comment,
    Reply,
}

impl LikeTarget {
    fn table(self) -> &'static str {
        match self {
            LikeTarget::Comment => "comments",
            LikeTarget::Reply => "comment_replies",
        }
    }

    fn likes_table(self) -> &'static str {
        match self {
            LikeTarget::Comment => "comment_likes",
            LikeTarget::Reply => "reply_likes",
        }
    }

    fn likes_column(self) -> &'static str {
        match self {
            LikeTarget::Comment => "comment_id",
            LikeTarget::Reply => "reply_id",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LikeTarget::Comment => "comment",
            LikeTarget::Reply => "reply",
        }
    }

    fn not_found(self) -> AppError {
        let message = match self {
            LikeTarget::Comment => "Comment not found",
            LikeTarget::Reply => "Reply not found",
        };
        AppError::not_found(anyhow::anyhow!(message))
    }

    fn like_sql(self) -> String {
        format!(
            r#"WITH changed AS (
                   INSERT INTO {likes} ({column}, user_id) VALUES ($1, $2)
                   ON CONFLICT DO NOTHING
                   RETURNING 1
               )
               UPDATE {table}
               SET likes_count = likes_count + (SELECT COUNT(*)::int FROM changed)
               WHERE id = $1
               RETURNING likes_count, (SELECT COUNT(*)::int FROM changed) AS changed"#,
            likes = self.likes_table(),
            column = self.likes_column(),
            table = self.table(),
        )
    }

    fn unlike_sql(self) -> String {
        format!(
            r#"WITH changed AS (
                   DELETE FROM {likes} WHERE {column} = $1 AND user_id = $2
                   RETURNING 1
               )
               UPDATE {table}
               SET likes_count = likes_count - (SELECT COUNT(*)::int FROM changed)
               WHERE id = $1
               RETURNING likes_count, (SELECT COUNT(*)::int FROM changed) AS changed"#,
            likes = self.likes_table(),
            column = self.likes_column(),
            table = self.table(),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, FromRow)]
pub struct LikeOutcome {
    pub likes_count: i32,
    /// Rows added to or removed from the liked-users set (0 or 1).
    pub changed: i32,
}

pub struct EngagementService;

impl EngagementService {
    /// Adds the user to the event's marked set. Marking twice is a no-op.
    #[instrument(skip(db))]
    pub async fn mark(db: &PgPool, event_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO event_marks (event_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(event_id)
        .bind(user_id)
        .execute(db)
        .await
        .map_err(map_unregistered_user)?;

        track_attendance(true);
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn unmark(db: &PgPool, event_id: Uuid, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("DELETE FROM event_marks WHERE event_id = $1 AND user_id = $2")
            .bind(event_id)
            .bind(user_id)
            .execute(db)
            .await?;

        track_attendance(false);
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn like(
        db: &PgPool,
        kind: LikeTarget,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<LikeOutcome, AppError> {
        Self::apply(db, kind, kind.like_sql(), id, user_id, true).await
    }

    #[instrument(skip(db))]
    pub async fn unlike(
        db: &PgPool,
        kind: LikeTarget,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<LikeOutcome, AppError> {
        Self::apply(db, kind, kind.unlike_sql(), id, user_id, false).await
    }

    async fn apply(
        db: &PgPool,
        kind: LikeTarget,
        sql: String,
        id: Uuid,
        user_id: Uuid,
        liked: bool,
    ) -> Result<LikeOutcome, AppError> {
        let outcome = sqlx::query_as::<_, LikeOutcome>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(db)
            .await
            .map_err(|e| {
                if !references_missing_user(&e)
                    && let sqlx::Error::Database(db_err) = &e
                    && db_err.is_foreign_key_violation()
                {
                    return kind.not_found();
                }
                map_unregistered_user(e)
            })?
            .ok_or_else(|| kind.not_found())?;

        debug!(
            kind = kind.label(),
            liked,
            changed = outcome.changed,
            likes_count = outcome.likes_count,
            "Like state updated"
        );
        track_like(kind.label(), liked, outcome.changed > 0);

        Ok(outcome)
    }
}
