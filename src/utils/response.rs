use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

#[derive(Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            status: StatusCode::OK,
        }
    }

    pub fn err(msg: &str, status: StatusCode) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.to_string()),
            status,
        }
    }
}

/// Success response with explicit status code
pub fn response<T>(data: T, status: StatusCode) -> ApiResponse<T> {
    let mut resp = ApiResponse::ok(data);
    resp.status = status;
    resp
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> axum::response::Response {
        let status = self.status;
        let json = axum::Json(self);
        (status, json).into_response()
    }
}

/// Errors coming out of endpoint logic, by origin.
/// Everything infrastructure-related collapses into `Internal`
/// at the `From` conversions in database/conn.rs.
#[derive(Debug)]
pub enum AppError {
    BadRequest(&'static str),
    Unauthorized(&'static str),
    Forbidden(&'static str),
    NotFound(&'static str),
    Conflict(&'static str),
    Internal(String),
}

impl AppError {
    fn parts(&self) -> (StatusCode, &str) {
        match self {
            AppError::BadRequest(code) => (StatusCode::BAD_REQUEST, code),
            AppError::Unauthorized(code) => (StatusCode::UNAUTHORIZED, code),
            AppError::Forbidden(code) => (StatusCode::FORBIDDEN, code),
            AppError::NotFound(code) => (StatusCode::NOT_FOUND, code),
            AppError::Conflict(code) => (StatusCode::CONFLICT, code),
            AppError::Internal(code) => (StatusCode::INTERNAL_SERVER_ERROR, code),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, code) = self.parts();
        ApiResponse::<()>::err(code, status).into_response()
    }
}

/// Domain-level failures, mapped to AppError codes in one place
/// so endpoints can `?` them without repeating status choices.
#[derive(Debug, Clone, Copy)]
pub enum FuncError {
    Unauthorized,
    InvalidToken,
    ExpiredToken,
    InvalidCredentials,
    UserNotFound,
    UsernameTaken,
    EmailTaken,
    PostNotFound,
    CommentNotFound,
    NotAuthor,
    ReplyToReply,
    ReplyWrongPost,
    SelfTarget,
}

impl From<FuncError> for AppError {
    fn from(err: FuncError) -> Self {
        match err {
            FuncError::Unauthorized => AppError::Unauthorized("UNAUTHORIZED"),
            FuncError::InvalidToken => AppError::Unauthorized("INVALID_TOKEN"),
            FuncError::ExpiredToken => AppError::Unauthorized("EXPIRED_TOKEN"),
            FuncError::InvalidCredentials => AppError::Unauthorized("INVALID_CREDENTIALS"),
            FuncError::UserNotFound => AppError::NotFound("USER_NOT_FOUND"),
            FuncError::UsernameTaken => AppError::Conflict("USERNAME_TAKEN"),
            FuncError::EmailTaken => AppError::Conflict("EMAIL_TAKEN"),
            FuncError::PostNotFound => AppError::NotFound("POST_NOT_FOUND"),
            FuncError::CommentNotFound => AppError::NotFound("COMMENT_NOT_FOUND"),
            FuncError::NotAuthor => AppError::Forbidden("NOT_AUTHOR"),
            FuncError::ReplyToReply => AppError::BadRequest("REPLY_TO_REPLY"),
            FuncError::ReplyWrongPost => AppError::BadRequest("REPLY_WRONG_POST"),
            FuncError::SelfTarget => AppError::BadRequest("SELF_TARGET"),
        }
    }
}
