use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, put},
};
use serde::Serialize;

use crate::{
    create_tx,
    entities::user::User,
    extractors::auth::AuthSession,
    get_conn,
    utils::{
        response::{ApiResponse, AppError, FuncError, response},
        state::ArcAppState,
    },
};

mod me {
    use crate::database::users::get_me;

    use super::*;

    // Get current user, with friend/block lists and notification prefs
    #[derive(Debug, Serialize)]
    pub struct Returns {
        #[serde(flatten)]
        pub user: User,
        pub created_at: f64,
    }

    pub async fn handler(
        session: AuthSession,
        State(state): State<ArcAppState>,
    ) -> Result<ApiResponse<Returns>, AppError> {
        let mut conn = get_conn!(state);
        let user = get_me(&session.user_id, &mut conn, &state)
            .await?
            .ok_or(FuncError::UserNotFound)?;

        Ok(response(
            Returns {
                created_at: user.created_at(),
                user,
            },
            StatusCode::OK,
        ))
    }
}

mod patch_me {
    use serde::Deserialize;
    use validator::Validate;

    use super::*;
    use crate::{
        database::users::{UserProfileUpdate, update_user_profile},
        map_struct,
        utils::validate::ValidatedJson,
    };

    // Patch current user's profile and notification preferences
    #[derive(Debug, Deserialize, Validate)]
    pub struct Payload {
        #[validate(length(min = 0, max = 16))]
        pub display_name: Option<String>,
        #[validate(length(min = 0, max = 256))]
        pub avatar_url: Option<String>,
        pub notify_comments: Option<bool>,
        pub notify_reactions: Option<bool>,
        pub notify_friends: Option<bool>,
    }

    pub async fn handler(
        session: AuthSession,
        State(state): State<ArcAppState>,
        ValidatedJson(payload): ValidatedJson<Payload>,
    ) -> Result<StatusCode, AppError> {
        let mut conn = get_conn!(state);
        let mut tx = create_tx!(conn);

        let update = map_struct!(payload => UserProfileUpdate {
            display_name,
            avatar_url,
            notify_comments,
            notify_reactions,
            notify_friends,
        });

        let dirty = update_user_profile(&session.user_id, update, &mut tx).await?;
        if dirty {
            tx.commit().await?;
        }

        Ok(StatusCode::NO_CONTENT)
    }
}

mod get_user {
    use crate::database::users::get_user;

    use super::*;

    #[derive(Debug, Serialize)]
    pub struct Returns {
        #[serde(flatten)]
        pub user: User,
        pub created_at: f64,
    }

    pub async fn handler(
        _session: AuthSession,
        State(state): State<ArcAppState>,
        Path(user_id): Path<String>,
    ) -> Result<ApiResponse<Returns>, AppError> {
        let mut conn = get_conn!(state);
        let user = get_user(&user_id, &mut conn, &state)
            .await?
            .ok_or(FuncError::UserNotFound)?;

        Ok(response(
            Returns {
                created_at: user.created_at(),
                user,
            },
            StatusCode::OK,
        ))
    }
}

mod friend {
    use crate::database::users::{get_user, set_friend};

    use super::*;

    async fn mutate(
        session: AuthSession,
        state: ArcAppState,
        other_id: String,
        add: bool,
    ) -> Result<StatusCode, AppError> {
        if other_id == session.user_id {
            return Err(FuncError::SelfTarget.into());
        }

        let mut conn = get_conn!(state);
        get_user(&other_id, &mut conn, &state)
            .await?
            .ok_or(FuncError::UserNotFound)?;

        set_friend(&session.user_id, &other_id, add, &mut conn).await?;
        Ok(StatusCode::NO_CONTENT)
    }

    pub async fn add(
        session: AuthSession,
        State(state): State<ArcAppState>,
        Path(user_id): Path<String>,
    ) -> Result<StatusCode, AppError> {
        mutate(session, state, user_id, true).await
    }

    pub async fn remove(
        session: AuthSession,
        State(state): State<ArcAppState>,
        Path(user_id): Path<String>,
    ) -> Result<StatusCode, AppError> {
        mutate(session, state, user_id, false).await
    }
}

mod block {
    use crate::database::users::{get_user, set_block, set_friend};

    use super::*;

    async fn mutate(
        session: AuthSession,
        state: ArcAppState,
        other_id: String,
        add: bool,
    ) -> Result<StatusCode, AppError> {
        if other_id == session.user_id {
            return Err(FuncError::SelfTarget.into());
        }

        let mut conn = get_conn!(state);
        get_user(&other_id, &mut conn, &state)
            .await?
            .ok_or(FuncError::UserNotFound)?;

        set_block(&session.user_id, &other_id, add, &mut conn).await?;
        if add {
            // blocking someone also drops the friendship
            set_friend(&session.user_id, &other_id, false, &mut conn).await?;
        }
        Ok(StatusCode::NO_CONTENT)
    }

    pub async fn add(
        session: AuthSession,
        State(state): State<ArcAppState>,
        Path(user_id): Path<String>,
    ) -> Result<StatusCode, AppError> {
        mutate(session, state, user_id, true).await
    }

    pub async fn remove(
        session: AuthSession,
        State(state): State<ArcAppState>,
        Path(user_id): Path<String>,
    ) -> Result<StatusCode, AppError> {
        mutate(session, state, user_id, false).await
    }
}

pub fn router() -> Router<ArcAppState> {
    Router::new()
        .route("/me", get(me::handler).patch(patch_me::handler))
        .route("/{user_id}", get(get_user::handler))
        .route("/{user_id}/friend", put(friend::add).delete(friend::remove))
        .route("/{user_id}/block", put(block::add).delete(block::remove))
}
