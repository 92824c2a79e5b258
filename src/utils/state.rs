use deadpool_postgres::{Manager, ManagerConfig, Pool, RecyclingMethod};
use std::env;
use std::sync::Arc;
use thiserror::Error;
use tokio_postgres::{Config as PgConfig, NoTls};

use crate::utils::snowflake::SnowflakeGenerator;

#[derive(Debug, Clone)]
pub struct PostgresConfig {
    host: String,
    user: String,
    database: String,
    connections: u32,
    password: String,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub signature_key: String,
    pub url: String,
    pub server_id: u8,
    pub media_public_url: String,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            signature_key: env::var("SIGNATURE_KEY").expect("$SIGNATURE_KEY missing"),
            url: env::var("URL").unwrap_or("localhost:8080".to_string()),
            server_id: env::var("SERVER_ID")
                .unwrap_or("0".to_string())
                .parse()
                .expect("SERVER_ID wrong type"),
            media_public_url: env::var("MEDIA_PUBLIC_URL")
                .unwrap_or("https://media.opencircle.app".to_string()),
        }
    }
}

impl PostgresConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("POSTGRES_HOST").expect("POSTGRES_HOST missing"),
            user: env::var("POSTGRES_USER").expect("POSTGRES_USER missing"),
            database: env::var("POSTGRES_DATABASE").expect("POSTGRES_DATABASE missing"),
            password: env::var("POSTGRES_PASSWORD").expect("POSTGRES_PASSWORD missing"),
            connections: env::var("POSTGRES_CONNECTIONS")
                .unwrap_or("100".to_string())
                .parse()
                .expect("POSTGRES_CONNECTIONS wrong type"),
        }
    }
}

#[derive(Debug)]
pub struct AppState {
    pub db_pool: Arc<Pool>,
    pub config: Arc<Config>,
    pub snowflake: SnowflakeGenerator,
}

#[derive(Error, Debug)]
pub enum AppStateError {
    #[error("SQL error: {0}")]
    Sql(#[from] tokio_postgres::Error),
}

impl AppState {
    pub async fn create_from_env() -> Result<AppState, AppStateError> {
        let config = Config::from_env();
        let postgres_config = PostgresConfig::from_env();

        let mut pg_config = PgConfig::new();
        pg_config.host(&postgres_config.host);
        pg_config.user(&postgres_config.user);
        pg_config.password(&postgres_config.password);
        pg_config.dbname(&postgres_config.database);

        let mgr = Manager::from_config(
            pg_config,
            NoTls,
            ManagerConfig {
                recycling_method: RecyclingMethod::Fast,
            },
        );
        let db_pool = Pool::builder(mgr)
            .max_size(postgres_config.connections as usize)
            .build()
            .unwrap();

        let snowflake = SnowflakeGenerator::new(config.server_id, 0);

        Ok(AppState {
            db_pool: Arc::new(db_pool),
            config: Arc::new(config),
            snowflake,
        })
    }
}

pub type ArcAppState = Arc<AppState>;
