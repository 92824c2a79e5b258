pub mod auth;
pub mod comments;
pub mod conn;
pub mod posts;
pub mod reactions;
pub mod users;
