use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    create_reply, delete_reply, get_reply, like_reply, unlike_reply, update_reply,
};

pub fn init_replies_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_reply))
        .route(
            "/{id}",
            get(get_reply).patch(update_reply).delete(delete_reply),
        )
        .route("/{id}/like", post(like_reply))
        .route("/{id}/unlike", post(unlike_reply))
}
