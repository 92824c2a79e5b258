use crate::utils::snowflake::SnowflakeGenerator;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug)]
pub struct AuthUser {
    pub username: String,
    pub user_id: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
}

impl AuthUser {
    pub fn created_at(&self) -> f64 {
        SnowflakeGenerator::parse(self.user_id.parse().expect("Wrong ID type")).0
    }
}

/// Struct for giving to frontend.
/// Friend/block lists and notification preferences are only
/// filled for the owner's own view ("me").
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug)]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub friends: Option<Vec<String>>,
    pub blocked: Option<Vec<String>>,
    pub notify_comments: Option<bool>,
    pub notify_reactions: Option<bool>,
    pub notify_friends: Option<bool>,
}

impl User {
    pub fn created_at(&self) -> f64 {
        SnowflakeGenerator::parse(self.user_id.parse().expect("Wrong ID type")).0
    }
}
