use axum::{
    Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::AUTHORIZATION},
    routing::post,
};
use serde::Serialize;

use crate::{
    create_tx,
    extractors::auth::AuthSession,
    get_conn,
    utils::{
        response::{ApiResponse, AppError, FuncError, response},
        state::ArcAppState,
    },
};

mod register {
    use serde::Deserialize;
    use validator::Validate;

    use super::*;
    use crate::{
        database::auth::{Tokens, create_tokens, create_user, get_user_by_email, get_user_by_username},
        utils::{security::store_password_async, validate::ValidatedJson},
    };

    #[derive(Debug, Deserialize, Validate)]
    pub struct Payload {
        #[validate(length(min = 3, max = 24))]
        pub username: String,
        #[validate(email)]
        pub email: String,
        #[validate(length(min = 8, max = 128))]
        pub password: String,
    }

    #[derive(Debug, Serialize)]
    pub struct Returns {
        pub user_id: String,
        #[serde(flatten)]
        pub tokens: Tokens,
    }

    pub async fn handler(
        State(state): State<ArcAppState>,
        ValidatedJson(payload): ValidatedJson<Payload>,
    ) -> Result<ApiResponse<Returns>, AppError> {
        let mut conn = get_conn!(state);

        if get_user_by_username(&payload.username, &mut conn)
            .await?
            .is_some()
        {
            return Err(FuncError::UsernameTaken.into());
        }
        if get_user_by_email(&payload.email, &mut conn).await?.is_some() {
            return Err(FuncError::EmailTaken.into());
        }

        let user_id = state.snowflake.generate().to_string();
        let password_hash = store_password_async(payload.password).await;

        let mut tx = create_tx!(conn);
        create_user(
            &user_id,
            &payload.username,
            &payload.email,
            &password_hash,
            &mut tx,
        )
        .await?;
        let tokens = create_tokens(user_id.clone(), &mut tx, state.clone()).await?;
        tx.commit().await?;

        Ok(response(Returns { user_id, tokens }, StatusCode::CREATED))
    }
}

mod login {
    use serde::Deserialize;
    use validator::Validate;

    use super::*;
    use crate::{
        database::auth::{Tokens, create_tokens, get_user_by_email},
        utils::{security::check_password_async, validate::ValidatedJson},
    };

    #[derive(Debug, Deserialize, Validate)]
    pub struct Payload {
        #[validate(email)]
        pub email: String,
        #[validate(length(min = 1, max = 128))]
        pub password: String,
    }

    #[derive(Debug, Serialize)]
    pub struct Returns {
        pub user_id: String,
        #[serde(flatten)]
        pub tokens: Tokens,
    }

    pub async fn handler(
        State(state): State<ArcAppState>,
        ValidatedJson(payload): ValidatedJson<Payload>,
    ) -> Result<ApiResponse<Returns>, AppError> {
        let mut conn = get_conn!(state);

        let user = get_user_by_email(&payload.email, &mut conn)
            .await?
            .ok_or(FuncError::InvalidCredentials)?;

        let stored = user
            .password_hash
            .clone()
            .ok_or(FuncError::InvalidCredentials)?;
        if !check_password_async(stored, payload.password).await {
            return Err(FuncError::InvalidCredentials.into());
        }

        let mut tx = create_tx!(conn);
        let tokens = create_tokens(user.user_id.clone(), &mut tx, state.clone()).await?;
        tx.commit().await?;

        Ok(response(
            Returns {
                user_id: user.user_id,
                tokens,
            },
            StatusCode::OK,
        ))
    }
}

mod refresh {
    use super::*;
    use crate::{
        database::auth::check_session_secret,
        utils::security::{decode_token, generate_token},
    };

    // Exchanges a valid refresh token for a fresh access token
    #[derive(Debug, Serialize)]
    pub struct Returns {
        pub access: String,
    }

    pub async fn handler(
        State(state): State<ArcAppState>,
        headers: HeaderMap,
    ) -> Result<ApiResponse<Returns>, AppError> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(FuncError::Unauthorized)?;

        let decoded = decode_token(token, Some("refresh"), &state.config.signature_key)
            .map_err(AppError::Unauthorized)?;
        if decoded.is_expired {
            return Err(FuncError::ExpiredToken.into());
        }

        let mut conn = get_conn!(state);
        let is_valid = check_session_secret(
            &decoded.user_id,
            &decoded.session_id,
            &decoded.secret,
            &mut conn,
        )
        .await;
        if !is_valid {
            return Err(FuncError::InvalidToken.into());
        }

        let access = generate_token(
            &decoded.user_id,
            "access",
            false,
            &decoded.secret,
            &decoded.session_id,
            &state.config.signature_key,
        )?;

        Ok(response(Returns { access }, StatusCode::OK))
    }
}

mod logout {
    use super::*;
    use crate::database::auth::delete_session;

    pub async fn handler(
        session: AuthSession,
        State(state): State<ArcAppState>,
    ) -> Result<StatusCode, AppError> {
        let mut conn = get_conn!(state);
        delete_session(&session.user_id, &session.session_id, &mut conn).await?;
        Ok(StatusCode::NO_CONTENT)
    }
}

pub fn router() -> Router<ArcAppState> {
    Router::new()
        .route("/register", post(register::handler))
        .route("/login", post(login::handler))
        .route("/refresh", post(refresh::handler))
        .route("/logout", post(logout::handler))
}
