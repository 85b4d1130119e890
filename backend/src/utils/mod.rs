pub mod cookies;
pub mod email;
pub mod jwt;
pub mod password;
pub mod request_meta;
pub mod time;

pub use jwt::*;
pub use password::*;
pub use time::*;
