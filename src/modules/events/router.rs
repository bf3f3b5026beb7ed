use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{
    check_event, create_event, delete_event, get_event, get_event_comments, list_event_types,
    uncheck_event, update_event,
};

pub fn init_events_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_event))
        .route(
            "/{id}",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/{id}/check", post(check_event))
        .route("/{id}/uncheck", post(uncheck_event))
        .route("/{id}/comments", get(get_event_comments))
}

pub fn init_event_types_router() -> Router<AppState> {
    Router::new().route("/", get(list_event_types))
}
