use axum::Router;

use crate::utils::state::ArcAppState;

pub mod auth;
pub mod comments;
pub mod posts;
pub mod reactions;
pub mod users;

pub fn create_router() -> Router<ArcAppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest(
            "/posts",
            posts::router()
                .merge(reactions::router())
                .merge(comments::post_router()),
        )
        .nest("/comments", comments::router())
}
