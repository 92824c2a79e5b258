use deadpool_postgres::Transaction;
use tokio_postgres::Row;

use crate::{
    database::conn::{LazyConn, ResultError},
    entities::comment::Comment,
    utils::{state::ArcAppState, storage::normalize_url},
};

static COMMENT_SQL: &str = "
    SELECT c.comment_id, c.post_id, c.user_id, c.content,
           c.image_url, c.is_reply, c.reply_to,
           EXTRACT(EPOCH FROM c.created_at)::BIGINT AS created_at
    FROM comments c
";

fn row_to_comment(row: Row, state: &ArcAppState) -> Comment {
    Comment {
        comment_id: row.get("comment_id"),
        post_id: row.get("post_id"),
        user_id: row.get("user_id"),
        content: row.get("content"),
        image_url: normalize_url(row.get("image_url"), &state.config),
        is_reply: row.get("is_reply"),
        reply_to: row.get("reply_to"),
        created_at: row.get("created_at"),
    }
}

pub async fn get_comment(
    comment_id: &str,
    conn: &mut LazyConn,
    state: &ArcAppState,
) -> Result<Option<Comment>, ResultError> {
    let db = conn.get_client().await?;
    let sql = format!("{} WHERE c.comment_id = $1", COMMENT_SQL);
    let row = db.query_opt(&sql, &[&comment_id]).await?;
    Ok(row.map(|r| row_to_comment(r, state)))
}

/// Flat unordered comment list for one post; ordering and
/// reply grouping happen in services::threads.
pub async fn list_comments(
    post_id: &str,
    conn: &mut LazyConn,
    state: &ArcAppState,
) -> Result<Vec<Comment>, ResultError> {
    let db = conn.get_client().await?;
    let sql = format!("{} WHERE c.post_id = $1", COMMENT_SQL);
    let rows = db.query(&sql, &[&post_id]).await?;
    Ok(rows.into_iter().map(|r| row_to_comment(r, state)).collect())
}

pub struct NewComment<'a> {
    pub comment_id: &'a str,
    pub post_id: &'a str,
    pub user_id: &'a str,
    pub content: &'a str,
    pub image_url: Option<&'a str>,
    pub reply_to: Option<&'a str>,
}

/// Insert a comment and bump the post's counter in the same transaction,
/// so the count can never drift from the row change.
pub async fn insert_comment(
    comment: NewComment<'_>,
    tx: &mut Transaction<'_>,
) -> Result<(), ResultError> {
    tx.execute(
        "
        INSERT INTO comments
            (comment_id, post_id, user_id, content, image_url, is_reply, reply_to)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ",
        &[
            &comment.comment_id,
            &comment.post_id,
            &comment.user_id,
            &comment.content,
            &comment.image_url,
            &comment.reply_to.is_some(),
            &comment.reply_to,
        ],
    )
    .await?;

    tx.execute(
        "UPDATE posts SET comments_count = comments_count + 1 WHERE post_id = $1",
        &[&comment.post_id],
    )
    .await?;

    Ok(())
}

/// Author-only delete; decrements the post's counter by exactly 1.
/// Returns the post id the comment belonged to, or None when nothing
/// was deleted (missing comment or non-author caller).
pub async fn delete_comment(
    comment_id: &str,
    user_id: &str,
    tx: &mut Transaction<'_>,
) -> Result<Option<String>, ResultError> {
    let row = tx
        .query_opt(
            "
            DELETE FROM comments
            WHERE comment_id = $1 AND user_id = $2
            RETURNING post_id
            ",
            &[&comment_id, &user_id],
        )
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    let post_id: String = row.get("post_id");

    tx.execute(
        "UPDATE posts SET comments_count = comments_count - 1 WHERE post_id = $1",
        &[&post_id],
    )
    .await?;

    Ok(Some(post_id))
}

// Needs a running Postgres with the schema applied; run with
// `cargo test -- --ignored` and the usual POSTGRES_* env vars set.
#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        database::posts::{NewPost, create_post},
        utils::state::{AppState, ArcAppState},
    };

    async fn test_state() -> ArcAppState {
        dotenvy::dotenv().ok();
        std::sync::Arc::new(AppState::create_from_env().await.unwrap())
    }

    async fn comments_count(conn: &mut LazyConn, post_id: &str) -> i64 {
        let db = conn.get_client().await.unwrap();
        let row = db
            .query_one(
                "SELECT comments_count FROM posts WHERE post_id = $1",
                &[&post_id],
            )
            .await
            .unwrap();
        row.get("comments_count")
    }

    async fn seed_user(conn: &mut LazyConn, user_id: &str) {
        let db = conn.get_client().await.unwrap();
        db.execute(
            "
            INSERT INTO users (user_id, username, email, password_hash, friends, blocked)
            VALUES ($1, $1, $1 || '@test.local', 'x', '{}', '{}')
            ",
            &[&user_id],
        )
        .await
        .unwrap();
    }

    async fn cleanup(conn: &mut LazyConn, post_id: &str, user_ids: &[&str]) {
        let db = conn.get_client().await.unwrap();
        db.execute("DELETE FROM comments WHERE post_id = $1", &[&post_id])
            .await
            .unwrap();
        db.execute("DELETE FROM posts WHERE post_id = $1", &[&post_id])
            .await
            .unwrap();
        for user_id in user_ids {
            db.execute("DELETE FROM users WHERE user_id = $1", &[user_id])
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    #[ignore]
    async fn delete_decrements_counter_by_one() {
        let state = test_state().await;
        let mut conn = LazyConn::new(state.db_pool.clone());

        let author = state.snowflake.generate().to_string();
        let stranger = state.snowflake.generate().to_string();
        let post_id = state.snowflake.generate().to_string();
        let comment_id = state.snowflake.generate().to_string();

        seed_user(&mut conn, &author).await;
        seed_user(&mut conn, &stranger).await;
        create_post(
            NewPost {
                post_id: &post_id,
                user_id: &author,
                title: "t",
                content: "c",
                image_url: None,
                topic: None,
                is_public: true,
            },
            &mut conn,
        )
        .await
        .unwrap();

        let mut tx = conn.transaction().await.unwrap();
        insert_comment(
            NewComment {
                comment_id: &comment_id,
                post_id: &post_id,
                user_id: &author,
                content: "hello",
                image_url: None,
                reply_to: None,
            },
            &mut tx,
        )
        .await
        .unwrap();
        tx.commit().await.unwrap();
        assert_eq!(comments_count(&mut conn, &post_id).await, 1);

        // someone else's delete is a no-op and leaves the counter alone
        let mut tx = conn.transaction().await.unwrap();
        let denied = delete_comment(&comment_id, &stranger, &mut tx).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(denied, None);
        assert_eq!(comments_count(&mut conn, &post_id).await, 1);

        let mut tx = conn.transaction().await.unwrap();
        let deleted = delete_comment(&comment_id, &author, &mut tx).await.unwrap();
        tx.commit().await.unwrap();
        assert_eq!(deleted.as_deref(), Some(post_id.as_str()));
        assert_eq!(comments_count(&mut conn, &post_id).await, 0);

        cleanup(&mut conn, &post_id, &[&author, &stranger]).await;
    }
}
