use crate::{
    database::conn::{LazyConn, ResultError},
    services::optimistic::ReactionView,
    services::reactions::{Membership, ReactionStep},
};

/// Current reaction membership of a user on a post.
/// `None` if the post does not exist, is deleted, or is a private
/// post of someone else; callers treat all three as not found.
pub async fn get_membership(
    post_id: &str,
    user_id: &str,
    conn: &mut LazyConn,
) -> Result<Option<Membership>, ResultError> {
    let db = conn.get_client().await?;
    let row = db
        .query_opt(
            "
            SELECT COALESCE($2 = ANY(likes), false) AS liked,
                   COALESCE($2 = ANY(dislikes), false) AS disliked
            FROM posts
            WHERE post_id = $1 AND is_deleted = false
              AND (is_public = true OR user_id = $2)
            ",
            &[&post_id, &user_id],
        )
        .await?;

    Ok(row.map(|r| Membership {
        liked: r.get("liked"),
        disliked: r.get("disliked"),
    }))
}

/// Execute one planned reaction step as a single statement.
/// The membership predicates make re-running a step harmless, and the
/// switch variants mutate both arrays in the same statement so no reader
/// ever observes a user in both sets.
pub async fn execute_step(
    post_id: &str,
    user_id: &str,
    step: ReactionStep,
    conn: &mut LazyConn,
) -> Result<(), ResultError> {
    let sql = match step {
        ReactionStep::AddLike => {
            "UPDATE posts SET likes = array_append(likes, $2)
             WHERE post_id = $1 AND NOT COALESCE($2 = ANY(likes), false)"
        }
        ReactionStep::RemoveLike => {
            "UPDATE posts SET likes = array_remove(likes, $2)
             WHERE post_id = $1"
        }
        ReactionStep::AddDislike => {
            "UPDATE posts SET dislikes = array_append(dislikes, $2)
             WHERE post_id = $1 AND NOT COALESCE($2 = ANY(dislikes), false)"
        }
        ReactionStep::RemoveDislike => {
            "UPDATE posts SET dislikes = array_remove(dislikes, $2)
             WHERE post_id = $1"
        }
        ReactionStep::SwitchToLike => {
            "UPDATE posts SET likes = array_append(likes, $2),
                              dislikes = array_remove(dislikes, $2)
             WHERE post_id = $1 AND NOT COALESCE($2 = ANY(likes), false)"
        }
        ReactionStep::SwitchToDislike => {
            "UPDATE posts SET dislikes = array_append(dislikes, $2),
                              likes = array_remove(likes, $2)
             WHERE post_id = $1 AND NOT COALESCE($2 = ANY(dislikes), false)"
        }
    };

    let db = conn.get_client().await?;
    db.execute(sql, &[&post_id, &user_id]).await?;
    Ok(())
}

/// Counters plus membership after a mutation, for the response body
/// so polling clients can reconcile against server truth.
pub async fn get_reaction_view(
    post_id: &str,
    user_id: &str,
    conn: &mut LazyConn,
) -> Result<Option<ReactionView>, ResultError> {
    let db = conn.get_client().await?;
    let row = db
        .query_opt(
            "
            SELECT COALESCE(cardinality(likes), 0)::BIGINT AS likes_count,
                   COALESCE(cardinality(dislikes), 0)::BIGINT AS dislikes_count,
                   COALESCE($2 = ANY(likes), false) AS liked,
                   COALESCE($2 = ANY(dislikes), false) AS disliked
            FROM posts
            WHERE post_id = $1 AND is_deleted = false
              AND (is_public = true OR user_id = $2)
            ",
            &[&post_id, &user_id],
        )
        .await?;

    Ok(row.map(|r| {
        ReactionView::new(
            r.get("likes_count"),
            r.get("dislikes_count"),
            Membership {
                liked: r.get("liked"),
                disliked: r.get("disliked"),
            },
        )
    }))
}
