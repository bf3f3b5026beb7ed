//! Schedule access control.
//!
//! Every schedule-scoped operation passes through this module before it
//! touches data:
//!
//! 1. [`guard::ScheduleGuard`] maps the operation to a required
//!    [`PermissionLevel`](mimcal_core::PermissionLevel) and names the object
//!    it targets (a schedule, event, comment or reply).
//! 2. [`resolver::AccessResolver`] loads the owning schedule together with
//!    the caller's override in a single query and computes the effective
//!    level.
//! 3. The guard hides schedules the caller cannot read (404) and refuses
//!    visible ones where the level is too low (403).
//!
//! Overrides are written through [`store::PermissionStore`]; the
//! precedence rule itself lives in `PermissionLevel::resolve` and in the
//! one SQL expression owned by [`resolver`].

pub mod guard;
pub mod resolver;
pub mod store;

pub use guard::{AccessTarget, ScheduleAction, ScheduleGuard};
pub use resolver::{AccessResolver, ScheduleAccess};
pub use store::PermissionStore;
