pub mod activity_log;
pub mod alerts;
pub mod auth;
pub mod bootstrap;
pub mod contact;
pub mod dashboard;
pub mod login_throttle;
pub mod password_reset;
pub mod user_lifecycle;
