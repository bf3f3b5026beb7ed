use mimcal_core::ErrorResponse;
use mimcal_models::{
    CommentView, CreateCommentDto, CreateEventDto, CreateReplyDto, CreateScheduleDto, Event,
    EventType, EventView, GrantPermissionDto, LikeResponse, PermissionChangeResponse,
    ProfileResponse, RegisterUserDto, ReplyView, SchedulePermission, ScheduleView,
    ScheduleWithEvents, StatusResponse, UpdateCommentDto, UpdateEventDto, UpdateScheduleDto, User,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::auth::controller::register_user,
        crate::modules::users::controller::get_profile,
        crate::modules::events::controller::list_event_types,
        crate::modules::schedules::controller::get_schedules,
        crate::modules::schedules::controller::create_schedule,
        crate::modules::schedules::controller::get_schedule,
        crate::modules::schedules::controller::update_schedule,
        crate::modules::schedules::controller::delete_schedule,
        crate::modules::schedules::controller::get_schedule_events,
        crate::modules::permissions::controller::list_permissions,
        crate::modules::permissions::controller::grant_permission,
        crate::modules::permissions::controller::revoke_permission,
        crate::modules::events::controller::create_event,
        crate::modules::events::controller::get_event,
        crate::modules::events::controller::update_event,
        crate::modules::events::controller::delete_event,
        crate::modules::events::controller::check_event,
        crate::modules::events::controller::uncheck_event,
        crate::modules::events::controller::get_event_comments,
        crate::modules::comments::controller::create_comment,
        crate::modules::comments::controller::get_comment,
        crate::modules::comments::controller::update_comment,
        crate::modules::comments::controller::delete_comment,
        crate::modules::comments::controller::like_comment,
        crate::modules::comments::controller::unlike_comment,
        crate::modules::replies::controller::create_reply,
        crate::modules::replies::controller::get_reply,
        crate::modules::replies::controller::update_reply,
        crate::modules::replies::controller::delete_reply,
        crate::modules::replies::controller::like_reply,
        crate::modules::replies::controller::unlike_reply,
    ),
    components(
        schemas(
            ErrorResponse,
            StatusResponse,
            User,
            RegisterUserDto,
            ProfileResponse,
            ScheduleView,
            ScheduleWithEvents,
            CreateScheduleDto,
            UpdateScheduleDto,
            SchedulePermission,
            GrantPermissionDto,
            PermissionChangeResponse,
            EventType,
            Event,
            EventView,
            CreateEventDto,
            UpdateEventDto,
            CommentView,
            ReplyView,
            CreateCommentDto,
            CreateReplyDto,
            UpdateCommentDto,
            LikeResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Account registration"),
        (name = "Users", description = "Current user"),
        (name = "Schedules", description = "Schedules visible to the caller"),
        (name = "Permissions", description = "Per-user permission overrides (manage access)"),
        (name = "Events", description = "Events and attendance marks"),
        (name = "Comments", description = "Comments, replies and likes")
    ),
    info(
        title = "Mimcal API",
        version = "0.1.0",
        description = "Shared calendars with per-schedule permission levels. Permission levels: 0 restricted, 1 read, 2 read and write, 3 manage."
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_permission_routes() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/schedules/{id}/permissions"));
        assert!(
            doc.paths
                .paths
                .contains_key("/api/schedules/{id}/permissions/{username}")
        );
        assert!(doc.paths.paths.contains_key("/api/comment-replies/{id}/like"));
    }
}
