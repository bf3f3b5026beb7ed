//! Seed records and the knobs that size a seeding run.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Every seeded username starts with this prefix, which is how
/// [`super::clear_seed`] finds them again.
pub const SEED_USERNAME_PREFIX: &str = "seed.";

pub struct UserSeed {
    pub username: String,
    pub password_hash: String,
}

pub struct ScheduleSeed {
    pub name: String,
    pub owner_id: Uuid,
    pub default_permission_level: i32,
}

pub struct OverrideSeed {
    pub schedule_id: Uuid,
    pub user_id: Uuid,
    pub level: i32,
}

pub struct EventSeed {
    pub schedule_id: Uuid,
    pub title: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SeedConfig {
    pub num_users: usize,
    pub schedules_per_user: usize,
    /// Other seeded users granted an explicit override on each schedule.
    pub overrides_per_schedule: usize,
    pub events_per_schedule: usize,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            num_users: 10,
            schedules_per_user: 2,
            overrides_per_schedule: 3,
            events_per_schedule: 8,
        }
    }
}

impl SeedConfig {
    pub fn new(num_users: usize) -> Self {
        Self {
            num_users,
            ..Default::default()
        }
    }

    pub fn total_schedules(&self) -> usize {
        self.num_users * self.schedules_per_user
    }

    pub fn total_events(&self) -> usize {
        self.total_schedules() * self.events_per_schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let config = SeedConfig {
            num_users: 4,
            schedules_per_user: 3,
            overrides_per_schedule: 1,
            events_per_schedule: 5,
        };
        assert_eq!(config.total_schedules(), 12);
        assert_eq!(config.total_events(), 60);
    }
}
