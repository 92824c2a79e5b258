use crate::{
    database::conn::{LazyConn, ResultError},
    entities::user::AuthUser,
    utils::{
        security::{generate_key, generate_token},
        state::ArcAppState,
    },
};
use deadpool_postgres::Transaction;
use serde::Serialize;
use tokio_postgres::Row;

#[derive(Debug, Serialize)]
pub struct Tokens {
    refresh: String,
    access: String,
}

async fn get_user_by(
    conn: &mut LazyConn,
    query_param: &(dyn tokio_postgres::types::ToSql + Sync),
    where_clause: &str,
) -> Result<Option<AuthUser>, ResultError> {
    let db = conn.get_client().await?;
    let sql = format!(
        "
        SELECT username, user_id, email, password_hash
        FROM users
        WHERE {}
        ",
        where_clause
    );

    let row = db.query_opt(&sql, &[query_param]).await?;
    Ok(row.map(|row| row_to_auth_user(&row)))
}

fn row_to_auth_user(row: &Row) -> AuthUser {
    AuthUser {
        username: row.get("username"),
        user_id: row.get("user_id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
    }
}

pub async fn get_auth_user(
    user_id: &String,
    conn: &mut LazyConn,
) -> Result<Option<AuthUser>, ResultError> {
    get_user_by(conn, user_id, "user_id = $1").await
}

pub async fn get_user_by_email(
    email: &String,
    conn: &mut LazyConn,
) -> Result<Option<AuthUser>, ResultError> {
    get_user_by(conn, email, "email = $1").await
}

pub async fn get_user_by_username(
    username: &String,
    conn: &mut LazyConn,
) -> Result<Option<AuthUser>, ResultError> {
    get_user_by(conn, username, "username = $1").await
}

pub async fn create_user(
    user_id: &str,
    username: &str,
    email: &str,
    password_hash: &str,
    tx: &mut Transaction<'_>,
) -> Result<(), ResultError> {
    tx.execute(
        "
        INSERT INTO users (user_id, username, email, password_hash, friends, blocked)
        VALUES ($1, $2, $3, $4, '{}', '{}')
        ",
        &[&user_id, &username, &email, &password_hash],
    )
    .await?;
    Ok(())
}

/// Open a new session: store its secret and hand back both tokens.
pub async fn create_tokens(
    user_id: String,
    tx: &mut Transaction<'_>,
    state: ArcAppState,
) -> Result<Tokens, ResultError> {
    let new_secret = generate_key(16);
    let new_session_id = state.snowflake.generate().to_string();

    let refresh = generate_token(
        &user_id,
        "refresh",
        true,
        &new_secret,
        &new_session_id,
        &state.config.signature_key,
    )
    .map_err(ResultError::AnyhowError)?;
    let access = generate_token(
        &user_id,
        "access",
        false,
        &new_secret,
        &new_session_id,
        &state.config.signature_key,
    )
    .map_err(ResultError::AnyhowError)?;

    tx.execute(
        "
        INSERT INTO auth_keys (user_id, token_secret, session_id)
        VALUES ($1, $2, $3)
        ",
        &[&user_id, &new_secret, &new_session_id],
    )
    .await?;

    Ok(Tokens { refresh, access })
}

/// Compare a decoded token's secret against the stored session secret.
pub async fn check_session_secret(
    user_id: &str,
    session_id: &str,
    secret: &str,
    conn: &mut LazyConn,
) -> bool {
    let Ok(db) = conn.get_client().await else {
        return false;
    };
    let row = db
        .query_opt(
            "
            SELECT token_secret FROM auth_keys
            WHERE user_id = $1 AND session_id = $2
            ",
            &[&user_id, &session_id],
        )
        .await;

    match row {
        Ok(Some(row)) => {
            let stored: String = row.get("token_secret");
            stored == secret
        }
        _ => false,
    }
}

/// Drop a session so its tokens stop validating.
pub async fn delete_session(
    user_id: &str,
    session_id: &str,
    conn: &mut LazyConn,
) -> Result<(), ResultError> {
    let db = conn.get_client().await?;
    db.execute(
        "DELETE FROM auth_keys WHERE user_id = $1 AND session_id = $2",
        &[&user_id, &session_id],
    )
    .await?;
    Ok(())
}
