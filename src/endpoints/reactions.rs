use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    routing::put,
};

use crate::{
    database::reactions::{execute_step, get_membership, get_reaction_view},
    extractors::auth::AuthSession,
    get_conn,
    services::optimistic::ReactionView,
    services::reactions::{ReactionAction, plan},
    utils::{
        response::{ApiResponse, AppError, FuncError, response},
        state::ArcAppState,
    },
};

/// Shared flow for all four toggle routes: read the caller's current
/// membership, plan the transition, run it as one statement, and
/// return the resulting counters so the client can reconcile its
/// optimistic state against server truth. A planned no-op (double
/// like, unlike while neutral) writes nothing and still succeeds.
async fn toggle(
    session: AuthSession,
    state: ArcAppState,
    post_id: String,
    action: ReactionAction,
) -> Result<ApiResponse<ReactionView>, AppError> {
    let mut conn = get_conn!(state);

    let membership = get_membership(&post_id, &session.user_id, &mut conn)
        .await?
        .ok_or(FuncError::PostNotFound)?;

    if let Some(step) = plan(action, membership) {
        execute_step(&post_id, &session.user_id, step, &mut conn).await?;
    }

    let view = get_reaction_view(&post_id, &session.user_id, &mut conn)
        .await?
        .ok_or(FuncError::PostNotFound)?;

    Ok(response(view, StatusCode::OK))
}

mod like {
    use super::*;

    pub async fn add(
        session: AuthSession,
        State(state): State<ArcAppState>,
        Path(post_id): Path<String>,
    ) -> Result<ApiResponse<ReactionView>, AppError> {
        toggle(session, state, post_id, ReactionAction::Like).await
    }

    pub async fn remove(
        session: AuthSession,
        State(state): State<ArcAppState>,
        Path(post_id): Path<String>,
    ) -> Result<ApiResponse<ReactionView>, AppError> {
        toggle(session, state, post_id, ReactionAction::Unlike).await
    }
}

mod dislike {
    use super::*;

    pub async fn add(
        session: AuthSession,
        State(state): State<ArcAppState>,
        Path(post_id): Path<String>,
    ) -> Result<ApiResponse<ReactionView>, AppError> {
        toggle(session, state, post_id, ReactionAction::Dislike).await
    }

    pub async fn remove(
        session: AuthSession,
        State(state): State<ArcAppState>,
        Path(post_id): Path<String>,
    ) -> Result<ApiResponse<ReactionView>, AppError> {
        toggle(session, state, post_id, ReactionAction::Undislike).await
    }
}

pub fn router() -> Router<ArcAppState> {
    Router::new()
        .route("/{post_id}/like", put(like::add).delete(like::remove))
        .route("/{post_id}/dislike", put(dislike::add).delete(dislike::remove))
}
