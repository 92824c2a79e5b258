use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;

use crate::{
    entities::post::Post,
    extractors::auth::AuthSession,
    get_conn,
    utils::{
        response::{ApiResponse, AppError, FuncError, response},
        state::ArcAppState,
    },
};

mod create {
    use serde::Deserialize;
    use validator::Validate;

    use super::*;
    use crate::{
        database::posts::{NewPost, create_post, get_post},
        utils::validate::ValidatedJson,
    };

    #[derive(Debug, Deserialize, Validate)]
    pub struct Payload {
        #[validate(length(min = 1, max = 128))]
        pub title: String,
        #[validate(length(min = 1, max = 4096))]
        pub content: String,
        #[validate(length(min = 0, max = 256))]
        pub image_url: Option<String>,
        #[validate(length(min = 1, max = 32))]
        pub topic: Option<String>,
        pub is_public: Option<bool>,
    }

    pub async fn handler(
        session: AuthSession,
        State(state): State<ArcAppState>,
        ValidatedJson(payload): ValidatedJson<Payload>,
    ) -> Result<ApiResponse<Post>, AppError> {
        let mut conn = get_conn!(state);
        let post_id = state.snowflake.generate().to_string();

        create_post(
            NewPost {
                post_id: &post_id,
                user_id: &session.user_id,
                title: &payload.title,
                content: &payload.content,
                image_url: payload.image_url.as_deref(),
                topic: payload.topic.as_deref(),
                is_public: payload.is_public.unwrap_or(true),
            },
            &mut conn,
        )
        .await?;

        let post = get_post(&post_id, &session.user_id, &mut conn, &state)
            .await?
            .ok_or(FuncError::PostNotFound)?;

        Ok(response(post, StatusCode::CREATED))
    }
}

mod feed {
    use serde::Deserialize;

    use super::*;
    use crate::database::posts::{FeedQuery, get_feed};

    const DEFAULT_LIMIT: i64 = 20;
    const MAX_LIMIT: i64 = 50;

    #[derive(Debug, Deserialize)]
    pub struct Params {
        pub before: Option<String>,
        pub topic: Option<String>,
        pub limit: Option<i64>,
    }

    #[derive(Debug, Serialize)]
    pub struct Returns {
        pub posts: Vec<Post>,
    }

    /// Client-supplied cursors are rejected up front instead of
    /// letting a cast blow up inside the query.
    pub(super) fn parse_cursor(raw: Option<&str>) -> Result<Option<i64>, AppError> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        raw.parse::<u64>()
            .ok()
            .and_then(|v| i64::try_from(v).ok())
            .map(Some)
            .ok_or(AppError::BadRequest("INVALID_CURSOR"))
    }

    pub async fn handler(
        session: AuthSession,
        State(state): State<ArcAppState>,
        Query(params): Query<Params>,
    ) -> Result<ApiResponse<Returns>, AppError> {
        let mut conn = get_conn!(state);

        let before = parse_cursor(params.before.as_deref())?;
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let posts = get_feed(
            &session.user_id,
            FeedQuery {
                before,
                topic: params.topic.as_deref(),
                limit,
            },
            &mut conn,
            &state,
        )
        .await?;

        Ok(response(Returns { posts }, StatusCode::OK))
    }
}

mod get_one {
    use super::*;
    use crate::database::posts::get_post;

    pub async fn handler(
        session: AuthSession,
        State(state): State<ArcAppState>,
        Path(post_id): Path<String>,
    ) -> Result<ApiResponse<Post>, AppError> {
        let mut conn = get_conn!(state);
        let post = get_post(&post_id, &session.user_id, &mut conn, &state)
            .await?
            .ok_or(FuncError::PostNotFound)?;

        if !post.visible_to(&session.user_id) {
            return Err(FuncError::PostNotFound.into());
        }

        Ok(response(post, StatusCode::OK))
    }
}

mod delete {
    use super::*;
    use crate::database::posts::{get_post, soft_delete_post};

    pub async fn handler(
        session: AuthSession,
        State(state): State<ArcAppState>,
        Path(post_id): Path<String>,
    ) -> Result<StatusCode, AppError> {
        let mut conn = get_conn!(state);
        let post = get_post(&post_id, &session.user_id, &mut conn, &state)
            .await?
            .ok_or(FuncError::PostNotFound)?;

        if post.user_id != session.user_id {
            return Err(FuncError::NotAuthor.into());
        }

        soft_delete_post(&post_id, &session.user_id, &mut conn).await?;
        Ok(StatusCode::NO_CONTENT)
    }
}

pub fn router() -> Router<ArcAppState> {
    Router::new()
        .route("/", post(create::handler))
        .route("/feed", get(feed::handler))
        .route("/{post_id}", get(get_one::handler).delete(delete::handler))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_absent_is_none() {
        assert!(matches!(feed::parse_cursor(None), Ok(None)));
    }

    #[test]
    fn numeric_cursor_parses() {
        assert!(matches!(feed::parse_cursor(Some("123456789")), Ok(Some(123456789))));
    }

    #[test]
    fn garbage_cursor_is_bad_request() {
        for raw in ["abc", "-5", "12x", "", "99999999999999999999999"] {
            assert!(matches!(
                feed::parse_cursor(Some(raw)),
                Err(AppError::BadRequest("INVALID_CURSOR"))
            ));
        }
    }
}
