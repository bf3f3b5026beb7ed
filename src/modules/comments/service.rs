use std::collections::HashMap;

use mimcal_core::AppError;
use mimcal_models::{CommentView, CreateCommentDto, LikeResponse, UpdateCommentDto};
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::{AccessTarget, ScheduleAction, ScheduleGuard};
use crate::middleware::auth::{Caller, map_unregistered_user};
use crate::modules::engagement::{EngagementService, LikeTarget};
use crate::modules::replies::service::ReplyService;

/// `$1` is the caller (NULL when anonymous).
const COMMENT_VIEW_SELECT: &str = r#"SELECT c.id, c.event_id, c.content, c.likes_count,
       u.username AS author,
       EXISTS (SELECT 1 FROM comment_likes l
               WHERE l.comment_id = c.id AND l.user_id = $1) AS is_liked_by_me,
       c.created_at
FROM comments c
JOIN users u ON u.id = c.author_id"#;

pub struct CommentService;

impl CommentService {
    /// Attaches each comment's replies, oldest first.
    async fn with_replies(
        db: &PgPool,
        caller: Caller,
        mut comments: Vec<CommentView>,
    ) -> Result<Vec<CommentView>, AppError> {
        let ids: Vec<Uuid> = comments.iter().map(|c| c.id).collect();
        let mut replies_by_comment: HashMap<Uuid, Vec<_>> = HashMap::new();
        for reply in ReplyService::fetch_for_comments(db, caller, &ids).await? {
            replies_by_comment.entry(reply.reply_to).or_default().push(reply);
        }

        for comment in &mut comments {
            comment.replies = replies_by_comment.remove(&comment.id).unwrap_or_default();
        }

        Ok(comments)
    }

    async fn fetch_view(
        db: &PgPool,
        caller: Caller,
        comment_id: Uuid,
    ) -> Result<CommentView, AppError> {
        let query = format!("{COMMENT_VIEW_SELECT} WHERE c.id = $2");
        let comment = sqlx::query_as::<_, CommentView>(&query)
            .bind(caller.user_id())
            .bind(comment_id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Comment not found")))?;

        Self::with_replies(db, caller, vec![comment])
            .await?
            .pop()
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("Comment not found")))
    }

    /// An author-scoped write matched no row. The comment is either gone
    /// since the access check or belongs to someone else.
    async fn refused(db: &PgPool, comment_id: Uuid) -> AppError {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM comments WHERE id = $1)",
        )
        .bind(comment_id)
        .fetch_one(db)
        .await;

        match exists {
            Ok(true) => AppError::access_denied(comment_id),
            Ok(false) => AppError::not_found(anyhow::anyhow!("Comment not found")),
            Err(err) => AppError::from(err),
        }
    }

    #[instrument(skip(db))]
    pub async fn list_for_event(
        db: &PgPool,
        caller: Caller,
        event_id: Uuid,
    ) -> Result<Vec<CommentView>, AppError> {
        ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::ReadComments,
            AccessTarget::Event(event_id),
        )
        .await?;

        let query = format!("{COMMENT_VIEW_SELECT} WHERE c.event_id = $2 ORDER BY c.created_at, c.id");
        let comments = sqlx::query_as::<_, CommentView>(&query)
            .bind(caller.user_id())
            .bind(event_id)
            .fetch_all(db)
            .await?;

        Self::with_replies(db, caller, comments).await
    }

    #[instrument(skip(db))]
    pub async fn create_comment(
        db: &PgPool,
        caller: Caller,
        dto: CreateCommentDto,
    ) -> Result<CommentView, AppError> {
        ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::CreateComment,
            AccessTarget::Event(dto.event_id),
        )
        .await?;
        let author_id = caller.require_user()?;

        let comment_id = sqlx::query_scalar::<_, Uuid>(
            r#"INSERT INTO comments (event_id, author_id, content)
               VALUES ($1, $2, $3)
               RETURNING id"#,
        )
        .bind(dto.event_id)
        .bind(author_id)
        .bind(&dto.content)
        .fetch_one(db)
        .await
        .map_err(map_unregistered_user)?;

        info!(comment_id = %comment_id, event_id = %dto.event_id, "Comment created");

        Self::fetch_view(db, caller, comment_id).await
    }

    #[instrument(skip(db))]
    pub async fn get_comment(
        db: &PgPool,
        caller: Caller,
        comment_id: Uuid,
    ) -> Result<CommentView, AppError> {
        ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::ReadComments,
            AccessTarget::Comment(comment_id),
        )
        .await?;

        Self::fetch_view(db, caller, comment_id).await
    }

    /// Only the author may edit. Others get access denied on the comment.
    #[instrument(skip(db))]
    pub async fn update_comment(
        db: &PgPool,
        caller: Caller,
        comment_id: Uuid,
        dto: UpdateCommentDto,
    ) -> Result<CommentView, AppError> {
        ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::EditOwnComment,
            AccessTarget::Comment(comment_id),
        )
        .await?;
        let author_id = caller.require_user()?;

        let result = sqlx::query(
            r#"UPDATE comments SET content = $3, updated_at = NOW()
               WHERE id = $1 AND author_id = $2"#,
        )
        .bind(comment_id)
        .bind(author_id)
        .bind(&dto.content)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(Self::refused(db, comment_id).await);
        }

        Self::fetch_view(db, caller, comment_id).await
    }

    #[instrument(skip(db))]
    pub async fn delete_comment(
        db: &PgPool,
        caller: Caller,
        comment_id: Uuid,
    ) -> Result<(), AppError> {
        ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::EditOwnComment,
            AccessTarget::Comment(comment_id),
        )
        .await?;
        let author_id = caller.require_user()?;

        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND author_id = $2")
            .bind(comment_id)
            .bind(author_id)
            .execute(db)
            .await?;

        if result.rows_affected() == 0 {
            return Err(Self::refused(db, comment_id).await);
        }

        info!(comment_id = %comment_id, "Comment deleted");
        Ok(())
    }

    #[instrument(skip(db))]
    pub async fn like_comment(
        db: &PgPool,
        caller: Caller,
        comment_id: Uuid,
    ) -> Result<LikeResponse, AppError> {
        ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::LikeComment,
            AccessTarget::Comment(comment_id),
        )
        .await?;

        let outcome =
            EngagementService::like(db, LikeTarget::Comment, comment_id, caller.require_user()?)
                .await?;

        Ok(LikeResponse {
            status: "comment liked".to_string(),
            likes_count: outcome.likes_count,
            liked: true,
        })
    }

    #[instrument(skip(db))]
    pub async fn unlike_comment(
        db: &PgPool,
        caller: Caller,
        comment_id: Uuid,
    ) -> Result<LikeResponse, AppError> {
        ScheduleGuard::authorize(
            db,
            caller,
            ScheduleAction::LikeComment,
            AccessTarget::Comment(comment_id),
        )
        .await?;

        let outcome =
            EngagementService::unlike(db, LikeTarget::Comment, comment_id, caller.require_user()?)
                .await?;

        Ok(LikeResponse {
            status: "comment unliked".to_string(),
            likes_count: outcome.likes_count,
            liked: false,
        })
    }
}
