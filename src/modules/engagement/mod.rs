//! Attendance marks and likes.
//!
//! Both are idempotent set operations. For likes the set mutation and the
//! cached `likes_count` adjustment run as one statement, so the counter
//! moves by exactly the number of rows the set actually gained or lost.

pub mod service;

pub use service::{EngagementService, LikeOutcome, LikeTarget};
