pub mod auth;
pub mod categories;
pub mod products;
pub mod tokens;
pub mod users;
pub mod waitlist;
