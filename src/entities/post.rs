use crate::utils::snowflake::SnowflakeGenerator;
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug)]
pub struct Post {
    pub post_id: String,
    pub user_id: String,
    pub title: String,
    pub content: String,
    pub image_url: Option<String>,
    pub topic: Option<String>,
    pub is_public: bool,
    pub created_at: i64,
    pub updated_at: i64,
    pub likes_count: i64,
    pub dislikes_count: i64,
    pub comments_count: i64,
    /// Viewer's reaction membership, filled when the request is authenticated
    pub has_liked: Option<bool>,
    pub has_disliked: Option<bool>,
    #[serde(skip_serializing)]
    pub is_deleted: Option<bool>,
}

impl Post {
    pub fn created_at(&self) -> f64 {
        SnowflakeGenerator::parse(self.post_id.parse().expect("Wrong ID type")).0
    }

    /// Private posts exist only for their author; every read or
    /// mutation path must gate on this.
    pub fn visible_to(&self, viewer_id: &str) -> bool {
        self.is_public || self.user_id == viewer_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(user_id: &str, is_public: bool) -> Post {
        Post {
            post_id: "1".to_string(),
            user_id: user_id.to_string(),
            title: "t".to_string(),
            content: "c".to_string(),
            image_url: None,
            topic: None,
            is_public,
            created_at: 0,
            updated_at: 0,
            likes_count: 0,
            dislikes_count: 0,
            comments_count: 0,
            has_liked: None,
            has_disliked: None,
            is_deleted: Some(false),
        }
    }

    #[test]
    fn public_posts_visible_to_anyone() {
        assert!(post("10", true).visible_to("10"));
        assert!(post("10", true).visible_to("11"));
    }

    #[test]
    fn private_posts_visible_to_author_only() {
        assert!(post("10", false).visible_to("10"));
        assert!(!post("10", false).visible_to("11"));
    }
}
