pub mod catalog;
pub mod users;

pub use catalog::*;
pub use users::*;
