pub mod auth;
pub mod categories;
pub mod health;
pub mod products;
pub mod users;
pub mod waitlist;
