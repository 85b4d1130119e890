//! Data access layer: free async functions over a `PgPool` or an open transaction.

pub mod activity_log;
pub mod alert;
pub mod contact_message;
pub mod dashboard;
pub mod department;
pub mod employee;
pub mod login_attempt;
pub mod password_reset;
pub mod role;
pub mod session;
pub mod transaction;
pub mod user;
