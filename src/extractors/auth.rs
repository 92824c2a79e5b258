use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::{
    database::auth::check_session_secret,
    get_conn,
    utils::{
        response::{AppError, FuncError},
        security::{DecodedToken, decode_token},
        state::ArcAppState,
    },
};

/// Explicit per-request session context. Handlers take this as an
/// argument instead of reading any ambient user state.
#[derive(Debug)]
pub struct AuthSession {
    pub user_id: String,
    pub session_id: String,
}

fn decode_access_token(parts: &Parts, signature_key: &str) -> Result<DecodedToken, AppError> {
    let token = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(FuncError::Unauthorized)?;

    let decoded =
        decode_token(token, Some("access"), signature_key).map_err(AppError::Unauthorized)?;
    if decoded.is_expired {
        return Err(FuncError::ExpiredToken.into());
    }
    Ok(decoded)
}

impl FromRequestParts<ArcAppState> for AuthSession {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ArcAppState,
    ) -> Result<Self, Self::Rejection> {
        let decoded = decode_access_token(parts, &state.config.signature_key)?;

        // signature alone is not enough; the session must still exist
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

        Ok(AuthSession {
            user_id: decoded.user_id,
            session_id: decoded.session_id,
        })
    }
}
