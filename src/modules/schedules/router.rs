use axum::{
    Router,
    routing::{delete, get},
};

use crate::modules::permissions::controller::{
    grant_permission, list_permissions, revoke_permission,
};
use crate::state::AppState;

use super::controller::{
    create_schedule, delete_schedule, get_schedule, get_schedule_events, get_schedules,
    update_schedule,
};

pub fn init_schedules_router() -> Router<AppState> {
    Router::new()
        .route("/", get(get_schedules).post(create_schedule))
        .route(
            "/{id}",
            get(get_schedule).patch(update_schedule).delete(delete_schedule),
        )
        .route("/{id}/events", get(get_schedule_events))
        .route(
            "/{id}/permissions",
            get(list_permissions).put(grant_permission),
        )
        .route("/{id}/permissions/{username}", delete(revoke_permission))
}
