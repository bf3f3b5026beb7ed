pub mod auth;
pub mod comments;
pub mod engagement;
pub mod events;
pub mod permissions;
pub mod replies;
pub mod schedules;
pub mod users;
