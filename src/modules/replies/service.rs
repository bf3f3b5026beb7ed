use mimcal_core::AppError;
use mimcal_models::{CreateReplyDto, LikeResponse, ReplyView, UpdateCommentDto};
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::{AccessTarget, ScheduleAction, ScheduleGuard};
use crate::middleware::auth::{Caller, map_unregistered_user};
use crate::modules::engagement::{EngagementService, LikeTarget};

/// `$1` is the caller (NULL when anonymous).
const REPLY_VIEW_SELECT: &str = r#"SELECT r.id, r.reply_to, r.event_id, r.content, r.likes_count,
       u.username AS author,
       EXISTS (SELECT 1 FROM reply_likes l
               WHERE l.reply_id = r.id AND l.user_id = $1) AS is_liked_by_me,
       r.created_at
FROM comment_replies r
JOIN users u ON u.id = r.author_id"#;

pub struct ReplyService;

impl ReplyService {
    /// Replies to any of `comment_ids`, oldest first. Access to the parent
    /// comments must already be authorized.
    pub(crate) async fn fetch_for_comments(
        db: &PgPool,
        caller: Caller,
        comment_ids: &[Uuid],
    ) -> Result<Vec<ReplyView>, AppError> {
        if comment_ids.is_empty() {
            return Ok(Vec::new());
        }

        let query = format!("{REPLY_VIEW_SELECT} WHERE r.reply_to = ANY($2) ORDER BY r.created_at, r.id");
        let replies = sqlx::query_as::<_, ReplyView>(&query)
            .bind(caller.user_id())
            .bind(comment_ids)
            .fetch_all(db)
            .await?;

        Ok(replies)
    }

    async fn fetch_view(db: &PgPool, caller: Caller, reply_id: Uuid) -> Result<ReplyView, AppError> {
        let query = format!("{REPLY_VIEW_SELECT} WHERE r.id = $2");
        sqlx::query_as::<_, ReplyView>(&query)
            .bind(caller.user_id())
            .bind(reply_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Reply not found")))
    }

    /// An author-scoped write matched no row. The reply is either gone since
    /// the access check or belongs to someone else.
    async fn refused(db: &PgPool, reply_id: Uuid) -> AppError {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM comment_replies WHERE id = $1)",
        )
        .bind(reply_id)
        .fetch_one(db)
        .await;

        match exists {
            Ok(true) => AppError::access_denied(reply_id),
            Ok(false) => AppError::not_found(anyhow::anyhow!("Reply not found")),
            Err(err) => AppError::from(err),
        }
    }

    /// The reply's event is always taken from its parent comment.
    #[instrument(skip(db))]
    pub async fn create_reply(
        db: &PgPool,
        caller: Caller,
        dto: CreateReplyDto,
    ) -> Result<ReplyView, AppError> {
        ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::CreateComment,
            AccessTarget::Comment(dto.reply_to),
        )
        .await?;
        let author_id = caller.require_user()?;

        let reply_id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO comment_replies (reply_to, event_id, author_id, content)
               SELECT c.id, c.event_id, $2, $3
               FROM comments c
               WHERE c.id = $1
               RETURNING id"#,
        )
        .bind(dto.reply_to)
        .bind(author_id)
        .bind(&dto.content)
        .fetch_optional(db)
        .await
        .map_err(map_unregistered_user)?
        .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Comment not found")))?;

        info!(reply_id = %reply_id, comment_id = %dto.reply_to, "Reply created");

        Self::fetch_view(db, caller, reply_id).await
    }

    #[instrument(skip(db))]
    pub async fn get_reply(db: &PgPool, caller: Caller, reply_id: Uuid) -> Result<ReplyView, AppError> {
        ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::ReadComments,
            AccessTarget::Reply(reply_id),
        )
        .await?;

        Self::fetch_view(db, caller, reply_id).await
    }

    #[instrument(skip(db))]
    pub async fn update_reply(
        db: &PgPool,
        caller: Caller,
        reply_id: Uuid,
        dto: UpdateCommentDto,
    ) -> Result<ReplyView, AppError> {
        ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::EditOwnComment,
            AccessTarget::Reply(reply_id),
        )
        .await?;
        let author_id = caller.require_user()?;

        let result = sqlx::query(
            r#"UPDATE comment_replies SET content = $3, updated_at = NOW()
               WHERE id = $1 AND author_id = $2"#,
        )
        .bind(reply_id)
        .bind(author_id)
        .bind(&dto.content)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Self::refused(db, reply_id).await);
        }

        Self::fetch_view(db, caller, reply_id).await
    }

    #[instrument(skip(db))]
    pub async fn delete_reply(db: &PgPool, caller: Caller, reply_id: Uuid) -> Result<(), AppError> {
        ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::EditOwnComment,
            AccessTarget::Reply(reply_id),
        )
        .await?;
        let author_id = caller.require_user()?;

        let result = sqlx::query("DELETE FROM comment_replies WHERE id = $1 AND author_id = $2")
            .bind(reply_id)
            .bind(author_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Self::refused(db, reply_id).await);
        }

        info!(reply_id = %reply_id, "Reply deleted");
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn like_reply(
        db: &PgPool,
        caller: Caller,
        reply_id: Uuid,
    ) -> Result<LikeResponse, AppError> {
        ScheduleGuard::authorize(db, caller, ScheduleAction::LikeComment, AccessTarget::Reply(reply_id))
            .await?;

        let outcome =
            EngagementService::like(db, LikeTarget::Reply, reply_id, caller.require_user()?).await?;

        Ok(LikeResponse {
            status: "reply liked".to_string(),
            likes_count: outcome.likes_count,
            liked: true,
        })
    }

    #[instrument(skip(db))]
    pub async fn unlike_reply(
        db: &PgPool,
        caller: Caller,
        reply_id: Uuid,
    ) -> Result<LikeResponse, AppError> {
        ScheduleGuard::authorize(db, caller, ScheduleAction::LikeComment, AccessTarget::Reply(reply_id))
            .await?;

        let outcome =
            EngagementService::unlike(db, LikeTarget::Reply, reply_id, caller.require_user()?)
                .await?;

        Ok(LikeResponse {
            status: "reply unliked".to_string(),
            likes_count: outcome.likes_count,
            liked: false,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::comments::service::CommentService;
    use crate::test_support::{create_event, create_schedule, create_user};
    use axum::http::StatusCode;
    use mimcal_core::PermissionLevel;
    use mimcal_models::CreateCommentDto;

    async fn setup(pool: &PgPool) -> (Uuid, Uuid, Uuid, Uuid) {
        let owner = create_user(pool, "owner").await;
        let amy = create_user(pool, "amy").await;
        let schedule = create_schedule(pool, owner, PermissionLevel::ReadWrite).await;
        let event = create_event(pool, owner, schedule).await;
        let comment = CommentService::create_comment(
            pool,
            Caller::User(owner),
            CreateCommentDto {
                event_id: event,
                content: "Questions go here".to_string(),
            },
        )
        .await
        .unwrap();
        (owner, amy, event, comment.id)
    }

    fn reply(reply_to: Uuid, content: &str) -> CreateReplyDto {
        CreateReplyDto {
            reply_to,
            content: content.to_string(),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_reply_takes_event_from_parent(pool: PgPool) {
        let (_, amy, event, comment) = setup(&pool).await;

        let created = ReplyService::create_reply(&pool, Caller::User(amy), reply(comment, "When?"))
            .await
            .unwrap();
        assert_eq!(created.reply_to, comment);
        assert_eq!(created.event_id, event);
        assert_eq!(created.author, "amy");
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_reply_to_missing_comment(pool: PgPool) {
        let (_, amy, _, _) = setup(&pool).await;

        let err = ReplyService::create_reply(&pool, Caller::User(amy), reply(Uuid::new_v4(), "?"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_only_author_edits_reply(pool: PgPool) {
        let (owner, amy, _, comment) = setup(&pool).await;
        let created = ReplyService::create_reply(&pool, Caller::User(amy), reply(comment, "typo"))
            .await
            .unwrap();
        let edit = || UpdateCommentDto {
            content: "fixed".to_string(),
        };

        let err = ReplyService::update_reply(&pool, Caller::User(owner), created.id, edit())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.object_id, Some(created.id));

        let updated = ReplyService::update_reply(&pool, Caller::User(amy), created.id, edit())
            .await
            .unwrap();
        assert_eq!(updated.content, "fixed");

        ReplyService::delete_reply(&pool, Caller::User(amy), created.id)
            .await
            .unwrap();
        let err = ReplyService::get_reply(&pool, Caller::Anonymous, created.id)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_deleting_comment_removes_replies(pool: PgPool) {
        let (owner, amy, _, comment) = setup(&pool).await;
        let created = ReplyService::create_reply(&pool, Caller::User(amy), reply(comment, "hi"))
            .await
            .unwrap();

        CommentService::delete_comment(&pool, Caller::User(owner), comment)
            .await
            .unwrap();

        let err = ReplyService::get_reply(&pool, Caller::User(amy), created.id)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_like_reply(pool: PgPool) {
        let (owner, amy, _, comment) = setup(&pool).await;
        let created = ReplyService::create_reply(&pool, Caller::User(amy), reply(comment, "hi"))
            .await
            .unwrap();

        let liked = ReplyService::like_reply(&pool, Caller::User(owner), created.id)
            .await
            .unwrap();
        assert_eq!(liked.status, "reply liked");
        assert_eq!(liked.likes_count, 1);

        let view = ReplyService::get_reply(&pool, Caller::User(owner), created.id)
            .await
            .unwrap();
        assert!(view.is_liked_by_me);

        let unliked = ReplyService::unlike_reply(&pool, Caller::User(owner), created.id)
            .await
            .unwrap();
        assert_eq!(unliked.likes_count, 0);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_refused_write_on_vanished_reply_is_not_found(pool: PgPool) {
        let (_, amy, _, comment) = setup(&pool).await;
        let created = ReplyService::create_reply(&pool, Caller::User(amy), reply(comment, "bye"))
            .await
            .unwrap();

        let err = ReplyService::refused(&pool, created.id).await;
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        sqlx::query("DELETE FROM comment_replies WHERE id = $1")
            .bind(created.id)
            .execute(&pool)
            .await
            .unwrap();
        let err = ReplyService::refused(&pool, created.id).await;
        assert!(err.is_not_found());
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_unregistered_reply_author_is_unauthorized(pool: PgPool) {
        let (_, _, _, comment) = setup(&pool).await;

        let err = ReplyService::create_reply(&pool, Caller::User(Uuid::new_v4()), reply(comment, "?"))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
