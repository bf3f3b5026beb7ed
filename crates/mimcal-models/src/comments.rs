//! Comment and reply models and DTOs.
//!
//! Comments hang off an event; replies hang off a comment and inherit its
//! event. Both keep a cached `likes_count` that always equals the size of
//! their liked-users set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Comment {
    pub id: Uuid,
    pub event_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub likes_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct CommentReply {
    pub id: Uuid,
    pub reply_to: Uuid,
    pub event_id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub likes_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A reply as seen by the caller. `author` is the author's username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct ReplyView {
    pub id: Uuid,
    pub reply_to: Uuid,
    pub event_id: Uuid,
    pub content: String,
    pub likes_count: i32,
    pub author: String,
    pub is_liked_by_me: bool,
    pub created_at: DateTime<Utc>,
}

/// A comment as seen by the caller, with its replies oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct CommentView {
    pub id: Uuid,
    pub event_id: Uuid,
    pub content: String,
    pub likes_count: i32,
    pub author: String,
    pub is_liked_by_me: bool,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub replies: Vec<ReplyView>,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateCommentDto {
    pub event_id: Uuid,
    #[validate(length(min = 1, max = 1024, message = "content must be 1-1024 characters"))]
    pub content: String,
}

/// Body for editing either a comment or a reply.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateCommentDto {
    #[validate(length(min = 1, max = 1024, message = "content must be 1-1024 characters"))]
    pub content: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct CreateReplyDto {
    /// Parent comment id. The reply's event is taken from it.
    pub reply_to: Uuid,
    #[validate(length(min = 1, max = 1024, message = "content must be 1-1024 characters"))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LikeResponse {
    pub status: String,
    pub likes_count: i32,
    pub liked: bool,
}
