use deadpool_postgres::Transaction;
use tokio_postgres::Row;

use crate::{
    database::conn::{LazyConn, ResultError},
    entities::user::User,
    utils::{state::ArcAppState, storage::normalize_url},
};

fn row_to_user(row: Row, state: &ArcAppState) -> User {
    User {
        user_id: row.get("user_id"),
        username: row.get("username"),
        display_name: row.get("display_name"),
        avatar_url: normalize_url(row.get("avatar_url"), &state.config),
        friends: row.try_get("friends").ok(),
        blocked: row.try_get("blocked").ok(),
        notify_comments: row.try_get("notify_comments").ok(),
        notify_reactions: row.try_get("notify_reactions").ok(),
        notify_friends: row.try_get("notify_friends").ok(),
    }
}

/// Public profile view
pub async fn get_user(
    user_id: &String,
    conn: &mut LazyConn,
    state: &ArcAppState,
) -> Result<Option<User>, ResultError> {
    let db = conn.get_client().await?;
    let sql = "
        SELECT u.user_id, u.username, u.display_name, u.avatar_url
        FROM users u
        WHERE u.user_id = $1
    ";
    let row = db.query_opt(sql, &[user_id]).await?;
    Ok(row.map(|r| row_to_user(r, state)))
}

/// Owner's own view: friend/block lists and notification preferences included
pub async fn get_me(
    user_id: &String,
    conn: &mut LazyConn,
    state: &ArcAppState,
) -> Result<Option<User>, ResultError> {
    let db = conn.get_client().await?;
    let sql = "
        SELECT u.user_id, u.username, u.display_name, u.avatar_url,
               COALESCE(u.friends, '{}') AS friends,
               COALESCE(u.blocked, '{}') AS blocked,
               u.notify_comments, u.notify_reactions, u.notify_friends
        FROM users u
        WHERE u.user_id = $1
    ";
    let row = db.query_opt(sql, &[user_id]).await?;
    Ok(row.map(|r| row_to_user(r, state)))
}

#[derive(Default, Debug)]
pub struct UserProfileUpdate {
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub notify_comments: Option<bool>,
    pub notify_reactions: Option<bool>,
    pub notify_friends: Option<bool>,
}

/// Updates profile fields and notification preferences
pub async fn update_user_profile(
    user_id: &str,
    update: UserProfileUpdate,
    tx: &mut Transaction<'_>,
) -> Result<bool, ResultError> {
    let mut set_clauses = Vec::new();
    let mut values: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> = Vec::new();

    if let Some(ref name) = update.display_name {
        values.push(name);
        set_clauses.push(format!("display_name = ${}", values.len() + 1));
    }
    if let Some(ref avatar) = update.avatar_url {
        values.push(avatar);
        set_clauses.push(format!("avatar_url = ${}", values.len() + 1));
    }
    if let Some(ref notify) = update.notify_comments {
        values.push(notify);
        set_clauses.push(format!("notify_comments = ${}", values.len() + 1));
    }
    if let Some(ref notify) = update.notify_reactions {
        values.push(notify);
        set_clauses.push(format!("notify_reactions = ${}", values.len() + 1));
    }
    if let Some(ref notify) = update.notify_friends {
        values.push(notify);
        set_clauses.push(format!("notify_friends = ${}", values.len() + 1));
    }

    if set_clauses.is_empty() {
        return Ok(false);
    }

    let query = format!(
        "UPDATE users SET {} WHERE user_id = $1",
        set_clauses.join(", ")
    );

    let mut params: Vec<&(dyn tokio_postgres::types::ToSql + Sync)> = vec![&user_id];
    params.extend(values);

    tx.execute(query.as_str(), &params).await?;
    Ok(true)
}

/// Add or remove `other_id` on the user's friend list.
/// Single guarded statement, same idiom as post reactions.
pub async fn set_friend(
    user_id: &str,
    other_id: &str,
    add: bool,
    conn: &mut LazyConn,
) -> Result<(), ResultError> {
    let sql = if add {
        "UPDATE users SET friends = array_append(friends, $2)
         WHERE user_id = $1 AND NOT COALESCE($2 = ANY(friends), false)"
    } else {
        "UPDATE users SET friends = array_remove(friends, $2)
         WHERE user_id = $1"
    };
    let db = conn.get_client().await?;
    db.execute(sql, &[&user_id, &other_id]).await?;
    Ok(())
}

/// Add or remove `other_id` on the user's block list.
pub async fn set_block(
    user_id: &str,
    other_id: &str,
    add: bool,
    conn: &mut LazyConn,
) -> Result<(), ResultError> {
    let sql = if add {
        "UPDATE users SET blocked = array_append(blocked, $2)
         WHERE user_id = $1 AND NOT COALESCE($2 = ANY(blocked), false)"
    } else {
        "UPDATE users SET blocked = array_remove(blocked, $2)
         WHERE user_id = $1"
    };
    let db = conn.get_client().await?;
    db.execute(sql, &[&user_id, &other_id]).await?;
    Ok(())
}
