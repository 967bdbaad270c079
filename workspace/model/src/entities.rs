//! Root of the SeaORM entity modules.
//!
//! `user` and `user_following` belong to the accounts app, `genre` and
//! `movie` to the movies app.

pub mod genre;
pub mod movie;
pub mod user;
pub mod user_following;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::genre::Entity as Genre;
    pub use super::movie::Entity as Movie;
    pub use super::user::Entity as User;
    pub use super::user_following::Entity as UserFollowing;
}
