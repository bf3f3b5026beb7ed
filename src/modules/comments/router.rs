use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_comment, delete_comment, get_comment, like_comment, unlike_comment, update_comment,
};

pub fn init_comments_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_comment))
        .route(
            "/{id}",
            get(get_comment).patch(update_comment).delete(delete_comment),
        )
        .route("/{id}/like", post(like_comment))
        .route("/{id}/unlike", post(unlike_comment))
}
