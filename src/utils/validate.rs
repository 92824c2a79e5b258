use axum::http::StatusCode;
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::utils::response::ApiResponse;

/// Json extractor that also runs `validator` rules, rejecting
/// through the standard response envelope.
pub struct ValidatedJson<T>(pub T);

impl<B, T> FromRequest<B> for ValidatedJson<T>
where
    B: Send + Sync + 'static,
    T: DeserializeOwned + Validate,
{
    type Rejection = ApiResponse<()>;

    async fn from_request(req: Request, state: &B) -> Result<Self, Self::Rejection> {
        let Json(payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e| ApiResponse::err(&e.to_string(), StatusCode::BAD_REQUEST))?;

        payload.validate().map_err(|e| {
            ApiResponse::err(&e.to_string(), StatusCode::UNPROCESSABLE_ENTITY)
        })?;

        Ok(ValidatedJson(payload))
    }
}
