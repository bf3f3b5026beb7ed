//! # Mimcal CLI
//!
//! Administrative and development tooling for Mimcal.
//!
//! - [`admin`]: create accounts, mint development tokens and print the
//!   resolved access table of a schedule.
//! - [`seeder`]: fill a development database with fake users, schedules,
//!   overrides and events.
//!
//! ## Usage
//!
//! ```ignore
//! use mimcal_cli::seeder::{SeedConfig, seed_all};
//!
//! let config = SeedConfig::new(20); // 20 users with defaults
//! seed_all(&pool, config).await?;
//! ```

pub mod admin;
pub mod seeder;
