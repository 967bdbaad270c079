pub mod admin;
pub mod followings;
pub mod health;
pub mod users;
