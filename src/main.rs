use std::{any, sync::Arc, time::Duration};

use axum::Router;
use axum::http::Response;
use bytes::Bytes;
use dotenvy::dotenv;
use http_body_util::Full;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::utils::state::{AppState, ArcAppState};

mod database;
mod endpoints;
mod entities;
mod extractors;
mod services;
mod utils;

fn panic_handler(err: Box<dyn any::Any + Send + 'static>) -> Response<Full<Bytes>> {
    let msg = err
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| err.downcast_ref::<String>().cloned())
        .unwrap_or("Unknown panic".to_string());
    error!("PANIC: {}", msg);

    let body = serde_json::json!({
        "success": false,
        "error": "INTERNAL_SERVER_ERROR",
    })
    .to_string();

    Response::builder()
        .status(500)
        .header("content-type", "application/json")
        .body(Full::from(body))
        .unwrap()
}

fn build_router(state: ArcAppState) -> Router {
    let v1_router: Router<()> = endpoints::create_router().with_state(state);

    Router::new().nest("/v1", v1_router).layer(
        tower::ServiceBuilder::new()
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any)
                    .max_age(Duration::from_secs(3600)),
            )
            .layer(CatchPanicLayer::custom(panic_handler)),
    )
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let state = match AppState::create_from_env().await {
        Ok(state) => state,
        Err(err) => {
            error!("Failed to create AppState: {:?}", err);
            return;
        }
    };
    let shared_state = Arc::new(state);

    let router = build_router(shared_state.clone());

    let listener = tokio::net::TcpListener::bind(shared_state.config.url.clone())
        .await
        .unwrap();
    info!("Listening on {:?}", shared_state.config.url);
    axum::serve(listener, router).await.unwrap();
}
