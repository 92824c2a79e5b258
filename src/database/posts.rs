use tokio_postgres::Row;

use crate::{
    database::conn::{LazyConn, ResultError},
    entities::post::Post,
    utils::{state::ArcAppState, storage::normalize_url},
};

static POST_SQL: &str = "
    SELECT p.post_id, p.user_id, p.title, p.content,
           p.image_url, p.topic, p.is_public, p.is_deleted,
           EXTRACT(EPOCH FROM p.created_at)::BIGINT AS created_at,
           EXTRACT(EPOCH FROM p.updated_at)::BIGINT AS updated_at,
           COALESCE(cardinality(p.likes), 0)::BIGINT AS likes_count,
           COALESCE(cardinality(p.dislikes), 0)::BIGINT AS dislikes_count,
           p.comments_count,
           COALESCE($1 = ANY(p.likes), false) AS has_liked,
           COALESCE($1 = ANY(p.dislikes), false) AS has_disliked
    FROM posts p
";

/// Row needs every non-option field of Post
fn row_to_post(row: Row, state: &ArcAppState) -> Post {
    Post {
        post_id: row.get("post_id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        content: row.get("content"),
        image_url: normalize_url(row.get("image_url"), &state.config),
        topic: row.get("topic"),
        is_public: row.get("is_public"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        likes_count: row.get("likes_count"),
        dislikes_count: row.get("dislikes_count"),
        comments_count: row.get("comments_count"),
        has_liked: Some(row.get("has_liked")),
        has_disliked: Some(row.get("has_disliked")),
        is_deleted: row.get("is_deleted"),
    }
}

/// Get single post by id, with the viewer's reaction membership filled in.
pub async fn get_post(
    post_id: &str,
    viewer_id: &str,
    conn: &mut LazyConn,
    state: &ArcAppState,
) -> Result<Option<Post>, ResultError> {
    let db = conn.get_client().await?;
    let sql = format!("{} WHERE p.post_id = $2 AND p.is_deleted = false", POST_SQL);
    let row = db.query_opt(&sql, &[&viewer_id, &post_id]).await?;
    Ok(row.map(|r| row_to_post(r, state)))
}

pub struct FeedQuery<'a> {
    /// Snowflake cursor, already validated as numeric by the endpoint
    pub before: Option<i64>,
    pub topic: Option<&'a str>,
    pub limit: i64,
}

/// Public posts newest-first, snowflake-cursor paginated.
/// Authors on the viewer's block list are filtered out.
pub async fn get_feed(
    viewer_id: &str,
    query: FeedQuery<'_>,
    conn: &mut LazyConn,
    state: &ArcAppState,
) -> Result<Vec<Post>, ResultError> {
    let db = conn.get_client().await?;
    let sql = format!(
        "{}
        WHERE p.is_public = true AND p.is_deleted = false
          AND ($2::BIGINT IS NULL OR p.post_id::BIGINT < $2)
          AND ($3::TEXT IS NULL OR p.topic = $3)
          AND p.user_id <> ALL(COALESCE(
              (SELECT u.blocked FROM users u WHERE u.user_id = $1), '{{}}'
          ))
        ORDER BY p.post_id::BIGINT DESC
        LIMIT $4",
        POST_SQL
    );

    let rows = db
        .query(&sql, &[&viewer_id, &query.before, &query.topic, &query.limit])
        .await?;
    Ok(rows.into_iter().map(|r| row_to_post(r, state)).collect())
}

pub struct NewPost<'a> {
    pub post_id: &'a str,
    pub user_id: &'a str,
    pub title: &'a str,
    pub content: &'a str,
    pub image_url: Option<&'a str>,
    pub topic: Option<&'a str>,
    pub is_public: bool,
}

pub async fn create_post(post: NewPost<'_>, conn: &mut LazyConn) -> Result<(), ResultError> {
    let db = conn.get_client().await?;
    db.execute(
        "
        INSERT INTO posts
            (post_id, user_id, title, content, image_url, topic, is_public,
             likes, dislikes, comments_count, is_deleted)
        VALUES ($1, $2, $3, $4, $5, $6, $7, '{}', '{}', 0, false)
        ",
        &[
            &post.post_id,
            &post.user_id,
            &post.title,
            &post.content,
            &post.image_url,
            &post.topic,
            &post.is_public,
        ],
    )
    .await?;
    Ok(())
}

/// Author-only soft delete. Returns whether a row changed.
pub async fn soft_delete_post(
    post_id: &str,
    user_id: &str,
    conn: &mut LazyConn,
) -> Result<bool, ResultError> {
    let db = conn.get_client().await?;
    let affected = db
        .execute(
            "
            UPDATE posts SET is_deleted = true, updated_at = NOW()
            WHERE post_id = $1 AND user_id = $2 AND is_deleted = false
            ",
            &[&post_id, &user_id],
        )
        .await?;
    Ok(affected == 1)
}
