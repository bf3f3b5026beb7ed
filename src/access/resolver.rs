use mimcal_core::{AppError, PermissionLevel};
use mimcal_models::{Schedule, ScheduleView};
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use uuid::Uuid;

use crate::middleware::auth::Caller;

/// Joins the caller's override (if any) onto `schedules s` as `p`.
/// `$1` is the caller's user id, NULL for anonymous callers.
pub(crate) const CALLER_OVERRIDE_JOIN: &str =
    "LEFT JOIN schedule_permissions p ON p.schedule_id = s.id AND p.user_id = $1";

/// SQL form of `PermissionLevel::resolve` over `s` and `p`.
pub(crate) const EFFECTIVE_LEVEL: &str =
    "GREATEST(s.default_permission_level, COALESCE(p.level, 0))";

const SCHEDULE_COLUMNS: &str = "s.id, s.name, s.owner_id, s.default_permission_level, \
     s.created_at, s.updated_at, p.level AS override_level";

#[derive(Debug, FromRow)]
struct ScheduleAccessRow {
    #[sqlx(flatten)]
    schedule: Schedule,
    override_level: Option<i32>,
}

/// A schedule together with the caller's override on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleAccess {
    pub schedule: Schedule,
    pub override_level: Option<PermissionLevel>,
}

impl TryFrom<ScheduleAccessRow> for ScheduleAccess {
    type Error = AppError;

    fn try_from(row: ScheduleAccessRow) -> Result<Self, Self::Error> {
        let override_level = row
            .override_level
            .map(PermissionLevel::try_from)
            .transpose()
            .map_err(AppError::internal)?;

        Ok(Self {
            schedule: row.schedule,
            override_level,
        })
    }
}

impl ScheduleAccess {
    pub fn schedule_id(&self) -> Uuid {
        self.schedule.id
    }

    pub fn effective_level(&self) -> PermissionLevel {
        PermissionLevel::resolve(self.schedule.default_permission_level, self.override_level)
    }

    pub fn has_access(&self, required: PermissionLevel) -> bool {
        self.effective_level().allows(required)
    }

    /// Refuses with the schedule id only; the reason is never disclosed.
    pub fn require_access(&self, required: PermissionLevel) -> Result<(), AppError> {
        if self.has_access(required) {
            Ok(())
        } else {
            Err(AppError::access_denied(self.schedule.id))
        }
    }

    pub fn is_owner(&self, user_id: Uuid) -> bool {
        self.schedule.owner_id == user_id
    }

    pub fn into_view(self) -> ScheduleView {
        let level = self.effective_level();
        ScheduleView::new(self.schedule, level)
    }
}

fn schedule_not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Schedule not found"))
}

pub struct AccessResolver;

impl AccessResolver {
    /// The single access decision. Whatever the caller cannot READ is
    /// reported through `not_found`, whether it exists or not. A visible
    /// schedule below `required` is refused with its id.
    pub(crate) fn decide(
        access: Option<ScheduleAccess>,
        required: PermissionLevel,
        not_found: impl FnOnce() -> AppError,
    ) -> Result<ScheduleAccess, AppError> {
        let access = access
            .filter(|access| access.has_access(PermissionLevel::Read))
            .ok_or_else(not_found)?;
        access.require_access(required)?;
        Ok(access)
    }

    /// Loads the schedule whose id is produced by `schedule_id_sql` (which may
    /// reference `$2`) along with the caller's override, in one query.
    #[instrument(skip(db))]
    pub(crate) async fn load_by(
        db: &PgPool,
        caller: Caller,
        schedule_id_sql: &str,
        object_id: Uuid,
    ) -> Result<Option<ScheduleAccess>, AppError> {
        let query = format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules s {CALLER_OVERRIDE_JOIN} \
             WHERE s.id = {schedule_id_sql}"
        );

        let row = sqlx::query_as::<_, ScheduleAccessRow>(&query)
            .bind(caller.user_id())
            .bind(object_id)
            .fetch_optional(db)
            .await?;

        row.map(ScheduleAccess::try_from).transpose()
    }

    #[instrument(skip(db))]
    pub async fn load(
        db: &PgPool,
        caller: Caller,
        schedule_id: Uuid,
    ) -> Result<Option<ScheduleAccess>, AppError> {
        Self::load_by(db, caller, "$2", schedule_id).await
    }

    /// The caller's effective level on a schedule. A missing schedule
    /// resolves to RESTRICTED, the same answer a hidden one gives.
    #[instrument(skip(db))]
    pub async fn effective_level(
        db: &PgPool,
        caller: Caller,
        schedule_id: Uuid,
    ) -> Result<PermissionLevel, AppError> {
        Ok(Self::load(db, caller, schedule_id)
            .await?
            .map_or(PermissionLevel::Restricted, |access| access.effective_level()))
    }

    #[instrument(skip(db))]
    pub async fn has_access(
        db: &PgPool,
        caller: Caller,
        required: PermissionLevel,
        schedule_id: Uuid,
    ) -> Result<bool, AppError> {
        Ok(Self::load(db, caller, schedule_id)
            .await?
            .is_some_and(|access| access.has_access(required)))
    }

    /// Succeeds only if the caller holds at least `required`. Missing and
    /// unreadable schedules are both not found.
    #[instrument(skip(db))]
    pub async fn require_access(
        db: &PgPool,
        caller: Caller,
        required: PermissionLevel,
        schedule_id: Uuid,
    ) -> Result<ScheduleAccess, AppError> {
        let access = Self::load(db, caller, schedule_id).await?;
        Self::decide(access, required, schedule_not_found)
    }

    /// Every schedule on which the caller's effective level is at least
    /// `minimum`, newest first.
    #[instrument(skip(db))]
    pub async fn list_visible(
        db: &PgPool,
        caller: Caller,
        minimum: PermissionLevel,
    ) -> Result<Vec<ScheduleAccess>, AppError> {
        let query = format!(
            "SELECT {SCHEDULE_COLUMNS} FROM schedules s {CALLER_OVERRIDE_JOIN} \
             WHERE {EFFECTIVE_LEVEL} >= $2 \
             ORDER BY s.created_at DESC, s.id"
        );

        let rows = sqlx::query_as::<_, ScheduleAccessRow>(&query)
            .bind(caller.user_id())
            .bind(i32::from(minimum))
            .fetch_all(db)
            .await?;

        rows.into_iter().map(ScheduleAccess::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::access::{AccessTarget, ScheduleAction, ScheduleGuard};
    use crate::test_support::{create_schedule, create_user, grant};
    use axum::http::StatusCode;
    use chrono::Utc;

    fn access(default: PermissionLevel, over: Option<PermissionLevel>) -> ScheduleAccess {
        let now = Utc::now();
        ScheduleAccess {
            schedule: Schedule {
                id: Uuid::new_v4(),
                name: "test_schedule".to_string(),
                owner_id: Uuid::new_v4(),
                default_permission_level: default,
                created_at: now,
                updated_at: now,
            },
            override_level: over,
        }
    }

    #[test]
    fn test_require_access_denies_with_schedule_id() {
        let access = access(PermissionLevel::Read, None);
        let err = access.require_access(PermissionLevel::ReadWrite).unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.object_id, Some(access.schedule_id()));
        assert!(access.require_access(PermissionLevel::Read).is_ok());
    }

    #[test]
    fn test_override_raises_but_never_lowers() {
        let raised = access(PermissionLevel::Read, Some(PermissionLevel::Manage));
        assert_eq!(raised.effective_level(), PermissionLevel::Manage);

        let lowered = access(PermissionLevel::ReadWrite, Some(PermissionLevel::Restricted));
        assert_eq!(lowered.effective_level(), PermissionLevel::ReadWrite);
    }

    #[test]
    fn test_decide_hides_before_refusing() {
        let missing = AccessResolver::decide(None, PermissionLevel::Read, schedule_not_found)
            .unwrap_err();
        assert!(missing.is_not_found());

        let hidden = AccessResolver::decide(
            Some(access(PermissionLevel::Restricted, None)),
            PermissionLevel::Manage,
            schedule_not_found,
        )
        .unwrap_err();
        assert!(hidden.is_not_found());
        assert_eq!(hidden.object_id, None);

        let visible = access(PermissionLevel::Read, None);
        let id = visible.schedule_id();
        let refused = AccessResolver::decide(Some(visible), PermissionLevel::ReadWrite, schedule_not_found)
            .unwrap_err();
        assert_eq!(refused.status, StatusCode::FORBIDDEN);
        assert_eq!(refused.object_id, Some(id));
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_effective_level_for_missing_and_restricted(pool: PgPool) {
        let owner = create_user(&pool, "owner").await;
        let amy = create_user(&pool, "amy").await;
        let schedule = create_schedule(&pool, owner, PermissionLevel::Restricted).await;

        let level = AccessResolver::effective_level(&pool, Caller::User(amy), Uuid::new_v4())
            .await
            .unwrap();
        assert_eq!(level, PermissionLevel::Restricted);

        let level = AccessResolver::effective_level(&pool, Caller::Anonymous, schedule)
            .await
            .unwrap();
        assert_eq!(level, PermissionLevel::Restricted);

        let level = AccessResolver::effective_level(&pool, Caller::User(owner), schedule)
            .await
            .unwrap();
        assert_eq!(level, PermissionLevel::Manage);

        grant(&pool, schedule, amy, PermissionLevel::ReadWrite).await;
        let level = AccessResolver::effective_level(&pool, Caller::User(amy), schedule)
            .await
            .unwrap();
        assert_eq!(level, PermissionLevel::ReadWrite);
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_has_access_for_missing_and_restricted(pool: PgPool) {
        let owner = create_user(&pool, "owner").await;
        let schedule = create_schedule(&pool, owner, PermissionLevel::Restricted).await;

        for required in PermissionLevel::ALL.into_iter().skip(1) {
            assert!(
                !AccessResolver::has_access(&pool, Caller::Anonymous, required, Uuid::new_v4())
                    .await
                    .unwrap()
            );
            assert!(
                !AccessResolver::has_access(&pool, Caller::Anonymous, required, schedule)
                    .await
                    .unwrap()
            );
            assert!(
                AccessResolver::has_access(&pool, Caller::User(owner), required, schedule)
                    .await
                    .unwrap()
            );
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    async fn test_require_access_matches_guard(pool: PgPool) {
        let owner = create_user(&pool, "owner").await;
        let restricted = create_schedule(&pool, owner, PermissionLevel::Restricted).await;
        let readable = create_schedule(&pool, owner, PermissionLevel::Read).await;

        let missing_id = Uuid::new_v4();
        let err = AccessResolver::require_access(
            &pool,
            Caller::Anonymous,
            PermissionLevel::Read,
            missing_id,
        )
        .await
        .unwrap_err();
        assert!(err.is_not_found());
        let guarded = ScheduleGuard::authorize(
            &pool,
            Caller::Anonymous,
            ScheduleAction::ReadSchedule,
            AccessTarget::Schedule(missing_id),
        )
        .await
        .unwrap_err();
        assert_eq!(guarded.status, err.status);

        let err = AccessResolver::require_access(
            &pool,
            Caller::Anonymous,
            PermissionLevel::Manage,
            restricted,
        )
        .await
        .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.error.to_string(), "Schedule not found");

        let err = AccessResolver::require_access(
            &pool,
            Caller::Anonymous,
            PermissionLevel::ReadWrite,
            readable,
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.object_id, Some(readable));

        let access = AccessResolver::require_access(
            &pool,
            Caller::User(owner),
            PermissionLevel::Manage,
            restricted,
        )
        .await
        .unwrap();
        assert_eq!(access.schedule_id(), restricted);
    }

    #[test]
    fn test_view_reports_effective_level() {
        let view = access(PermissionLevel::Read, Some(PermissionLevel::ReadWrite)).into_view();
        assert_eq!(view.my_permission_level, PermissionLevel::ReadWrite);
        assert_eq!(view.default_permission_level, PermissionLevel::Read);
    }
}
