use mimcal_core::{AppError, PermissionLevel};
use mimcal_observability::track_access_denied;
use sqlx::PgPool;
use tracing::{instrument, warn};
use uuid::Uuid;

use super::resolver::{AccessResolver, ScheduleAccess};
use crate::middleware::auth::Caller;

/// Everything a caller can do to schedule-scoped data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleAction {
    ReadSchedule,
    ListEvents,
    ReadEvent,
    ReadComments,
    WriteEvent,
    MarkAttendance,
    RenameSchedule,
    ChangeDefaultLevel,
    DeleteSchedule,
    ManagePermissions,
    CreateComment,
    EditOwnComment,
    LikeComment,
}

impl ScheduleAction {
    pub fn required_level(self) -> PermissionLevel {
        match self {
            ScheduleAction::ReadSchedule
            | ScheduleAction::ListEvents
            | ScheduleAction::ReadEvent
            | ScheduleAction::ReadComments
            | ScheduleAction::MarkAttendance
            | ScheduleAction::EditOwnComment
            | ScheduleAction::LikeComment => PermissionLevel::Read,
            ScheduleAction::WriteEvent
            | ScheduleAction::RenameSchedule
            | ScheduleAction::CreateComment => PermissionLevel::ReadWrite,
            ScheduleAction::ChangeDefaultLevel
            | ScheduleAction::DeleteSchedule
            | ScheduleAction::ManagePermissions => PermissionLevel::Manage,
        }
    }

    /// Actions recorded against a user. Anonymous callers get 401 for these
    /// even when the schedule default would otherwise allow them.
    pub fn requires_identity(self) -> bool {
        matches!(
            self,
            ScheduleAction::MarkAttendance
                | ScheduleAction::CreateComment
                | ScheduleAction::EditOwnComment
                | ScheduleAction::LikeComment
        )
    }
}

/// The object an action is aimed at. Each resolves to its owning schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessTarget {
    Schedule(Uuid),
    Event(Uuid),
    Comment(Uuid),
    Reply(Uuid),
}

impl AccessTarget {
    pub fn id(self) -> Uuid {
        match self {
            AccessTarget::Schedule(id)
            | AccessTarget::Event(id)
            | AccessTarget::Comment(id)
            | AccessTarget::Reply(id) => id,
        }
    }

    /// Scalar subquery yielding the owning schedule id from `$2`.
    fn schedule_id_sql(self) -> &'static str {
        match self {
            AccessTarget::Schedule(_) => "$2",
            AccessTarget::Event(_) => "(SELECT schedule_id FROM events WHERE id = $2)",
            AccessTarget::Comment(_) => {
                "(SELECT e.schedule_id FROM comments c \
                 JOIN events e ON e.id = c.event_id WHERE c.id = $2)"
            }
            AccessTarget::Reply(_) => {
                "(SELECT e.schedule_id FROM comment_replies r \
                 JOIN events e ON e.id = r.event_id WHERE r.id = $2)"
            }
        }
    }

    fn not_found(self) -> AppError {
        let message = match self {
            AccessTarget::Schedule(_) => "Schedule not found",
            AccessTarget::Event(_) => "Event not found",
            AccessTarget::Comment(_) => "Comment not found",
            AccessTarget::Reply(_) => "Reply not found",
        };
        AppError::not_found(anyhow::anyhow!(message))
    }
}

pub struct ScheduleGuard;

impl ScheduleGuard {
    /// Authorizes `action` on `target` for `caller`.
    ///
    /// A target the caller cannot READ is reported exactly like a missing
    /// one. Once it is visible, a level below the action's requirement is
    /// reported as access denied on the owning schedule.
    #[instrument(skip(db))]
    pub async fn authorize(
        db: &PgPool,
        caller: Caller,
        action: ScheduleAction,
        target: AccessTarget,
    ) -> Result<ScheduleAccess, AppError> {
        if action.requires_identity() {
            caller.require_user()?;
        }

        let loaded =
            AccessResolver::load_by(db, caller, target.schedule_id_sql(), target.id()).await?;
        let effective = loaded.as_ref().map(ScheduleAccess::effective_level);

        let required = action.required_level();
        AccessResolver::decide(loaded, required, || target.not_found()).inspect_err(|err| {
            if let Some(schedule_id) = err.object_id {
                warn!(
                    %schedule_id,
                    ?action,
                    required = required.value(),
                    effective = effective.map(PermissionLevel::value),
                    "Schedule access denied"
                );
                track_access_denied(required.label());
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_levels() {
        use ScheduleAction::*;

        for action in [ReadSchedule, ListEvents, ReadEvent, ReadComments, LikeComment] {
            assert_eq!(action.required_level(), PermissionLevel::Read);
        }
        for action in [WriteEvent, RenameSchedule, CreateComment] {
            assert_eq!(action.required_level(), PermissionLevel::ReadWrite);
        }
        for action in [ChangeDefaultLevel, DeleteSchedule, ManagePermissions] {
            assert_eq!(action.required_level(), PermissionLevel::Manage);
        }
    }

    #[test]
    fn test_attendance_and_engagement_need_identity() {
        assert!(ScheduleAction::MarkAttendance.requires_identity());
        assert!(ScheduleAction::LikeComment.requires_identity());
        assert!(ScheduleAction::CreateComment.requires_identity());
        assert!(!ScheduleAction::ReadSchedule.requires_identity());
        assert!(!ScheduleAction::ReadComments.requires_identity());
        assert!(!ScheduleAction::WriteEvent.requires_identity());
    }

    #[test]
    fn test_target_not_found_is_404() {
        let err = AccessTarget::Comment(Uuid::new_v4()).not_found();
        assert!(err.is_not_found());
    }
}
