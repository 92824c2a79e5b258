use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete as delete_route, get},
};
use serde::Serialize;

use crate::{
    create_tx,
    entities::comment::Comment,
    extractors::auth::AuthSession,
    get_conn,
    utils::{
        response::{ApiResponse, AppError, FuncError, response},
        state::ArcAppState,
    },
};

mod add {
    use serde::Deserialize;
    use validator::Validate;

    use super::*;
    use crate::{
        database::{
            comments::{NewComment, get_comment, insert_comment},
            posts::get_post,
        },
        utils::validate::ValidatedJson,
    };

    #[derive(Debug, Deserialize, Validate)]
    pub struct Payload {
        #[validate(length(min = 1, max = 2048))]
        pub content: String,
        #[validate(length(min = 0, max = 256))]
        pub image_url: Option<String>,
        pub reply_to: Option<String>,
    }

    pub async fn handler(
        session: AuthSession,
        State(state): State<ArcAppState>,
        Path(post_id): Path<String>,
        ValidatedJson(payload): ValidatedJson<Payload>,
    ) -> Result<ApiResponse<Comment>, AppError> {
        let mut conn = get_conn!(state);

        let post = get_post(&post_id, &session.user_id, &mut conn, &state)
            .await?
            .ok_or(FuncError::PostNotFound)?;
        if !post.visible_to(&session.user_id) {
            return Err(FuncError::PostNotFound.into());
        }

        // replies only attach to top-level comments of the same post
        if let Some(ref parent_id) = payload.reply_to {
            let parent = get_comment(parent_id, &mut conn, &state)
                .await?
                .ok_or(FuncError::CommentNotFound)?;
            if parent.post_id != post_id {
                return Err(FuncError::ReplyWrongPost.into());
            }
            if parent.is_reply {
                return Err(FuncError::ReplyToReply.into());
            }
        }

        let comment_id = state.snowflake.generate().to_string();

        let mut tx = create_tx!(conn);
        insert_comment(
            NewComment {
                comment_id: &comment_id,
                post_id: &post_id,
                user_id: &session.user_id,
                content: &payload.content,
                image_url: payload.image_url.as_deref(),
                reply_to: payload.reply_to.as_deref(),
            },
            &mut tx,
        )
        .await?;
        tx.commit().await?;

        let comment = get_comment(&comment_id, &mut conn, &state)
            .await?
            .ok_or(FuncError::CommentNotFound)?;

        Ok(response(comment, StatusCode::CREATED))
    }
}

mod list {
    use super::*;
    use crate::{
        database::{comments::list_comments, posts::get_post},
        services::threads::{CommentThread, assemble},
    };

    // Assembled threads, newest-first; this is what the 1s polling
    // client re-fetches.
    #[derive(Debug, Serialize)]
    pub struct Returns {
        pub comments: Vec<CommentThread>,
    }

    pub async fn handler(
        session: AuthSession,
        State(state): State<ArcAppState>,
        Path(post_id): Path<String>,
    ) -> Result<ApiResponse<Returns>, AppError> {
        let mut conn = get_conn!(state);

        let post = get_post(&post_id, &session.user_id, &mut conn, &state)
            .await?
            .ok_or(FuncError::PostNotFound)?;
        if !post.visible_to(&session.user_id) {
            return Err(FuncError::PostNotFound.into());
        }

        let flat = list_comments(&post_id, &mut conn, &state).await?;
        let comments = assemble(flat);

        Ok(response(Returns { comments }, StatusCode::OK))
    }
}

mod delete {
    use super::*;
    use crate::database::comments::{delete_comment, get_comment};

    pub async fn handler(
        session: AuthSession,
        State(state): State<ArcAppState>,
        Path(comment_id): Path<String>,
    ) -> Result<StatusCode, AppError> {
        let mut conn = get_conn!(state);

        let comment = get_comment(&comment_id, &mut conn, &state)
            .await?
            .ok_or(FuncError::CommentNotFound)?;
        if comment.user_id != session.user_id {
            return Err(FuncError::NotAuthor.into());
        }

        let mut tx = create_tx!(conn);
        delete_comment(&comment_id, &session.user_id, &mut tx)
            .await?
            .ok_or(FuncError::CommentNotFound)?;
        tx.commit().await?;

        Ok(StatusCode::NO_CONTENT)
    }
}

/// Routes that hang off /posts
pub fn post_router() -> Router<ArcAppState> {
    Router::new().route(
        "/{post_id}/comments",
        get(list::handler).post(add::handler),
    )
}

/// Routes that hang off /comments
pub fn router() -> Router<ArcAppState> {
    Router::new().route("/{comment_id}", delete_route(delete::handler))
}
