pub mod budget;
pub mod transaction;
pub mod user;
