use crate::utils::snowflake::SnowflakeGenerator;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Comment {
    pub comment_id: String,
    pub post_id: String,
    pub user_id: String,
    pub content: String,
    pub image_url: Option<String>,
    pub is_reply: bool,
    /// Parent comment id, present iff `is_reply`
    pub reply_to: Option<String>,
    pub created_at: i64,
}

impl Comment {
    pub fn created_at(&self) -> f64 {
        SnowflakeGenerator::parse(self.comment_id.parse().expect("Wrong ID type")).0
    }
}
