use std::sync::Arc;

use deadpool_postgres::{Object, Pool, PoolError, Transaction};
use tracing::error;

use crate::utils::response::AppError;

/// Failures below the endpoint layer, by origin.
#[derive(Debug)]
pub enum ResultError {
    PoolError(PoolError),
    QueryError(tokio_postgres::Error),
    AnyhowError(anyhow::Error),
}

impl From<PoolError> for ResultError {
    fn from(err: PoolError) -> Self {
        Self::PoolError(err)
    }
}

impl From<tokio_postgres::Error> for ResultError {
    fn from(err: tokio_postgres::Error) -> Self {
        Self::QueryError(err)
    }
}

impl From<anyhow::Error> for ResultError {
    fn from(err: anyhow::Error) -> Self {
        Self::AnyhowError(err)
    }
}

// Infrastructure errors are logged here and collapse into one opaque
// API error; clients never see driver details.
fn internal(context: &str, err: impl std::fmt::Debug) -> AppError {
    error!("{}: {:?}", context, err);
    AppError::Internal("INTERNAL_SERVER_ERROR".to_string())
}

impl From<ResultError> for AppError {
    fn from(err: ResultError) -> Self {
        internal("Database error", err)
    }
}

impl From<PoolError> for AppError {
    fn from(err: PoolError) -> Self {
        internal("Pool error", err)
    }
}

impl From<tokio_postgres::Error> for AppError {
    fn from(err: tokio_postgres::Error) -> Self {
        internal("Postgres error", err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        internal("Internal error", err)
    }
}

/// Pool handle that only checks out a client on first use, so every
/// handler can declare one up front without paying for it on paths
/// that never touch the database.
pub struct LazyConn {
    pool: Arc<Pool>,
    client: Option<Object>,
}

impl LazyConn {
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool, client: None }
    }

    pub async fn get_client(&mut self) -> Result<&mut Object, PoolError> {
        if self.client.is_none() {
            self.client = Some(self.pool.get().await?);
        }
        Ok(self.client.as_mut().unwrap())
    }

    pub async fn transaction(&mut self) -> Result<Transaction<'_>, PoolError> {
        Ok(self.get_client().await?.transaction().await?)
    }
}
