//! PostgreSQL feedback store
//!
//! A connection is opened for each submission and closed right after.

use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection};

use super::{FeedbackEntry, FeedbackError, FeedbackStore};
use crate::constants;

const INSERT_FEEDBACK: &str =
    "INSERT INTO feedback_table (name, email, feedback) VALUES ($1, $2, $3)";

/// Database connection settings
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl DatabaseConfig {
    /// Read `DB_HOST`, `DB_NAME`, `DB_USER`, `DB_PASS` and `DB_PORT`
    pub fn from_env() -> Result<Self, FeedbackError> {
        Ok(Self {
            host: required("DB_HOST", constants::get_db_host())?,
            port: constants::get_db_port(),
            database: required("DB_NAME", constants::get_db_name())?,
            user: required("DB_USER", constants::get_db_user())?,
            password: required("DB_PASS", constants::get_db_pass())?,
        })
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.database)
            .username(&self.user)
            .password(&self.password)
    }
}

fn required(var: &str, value: Option<String>) -> Result<String, FeedbackError> {
    value.ok_or_else(|| FeedbackError::Connection(format!("{} is not set", var)))
}

pub struct PgFeedbackStore {
    config: DatabaseConfig,
}

impl PgFeedbackStore {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl FeedbackStore for PgFeedbackStore {
    async fn insert(&self, entry: &FeedbackEntry) -> Result<(), FeedbackError> {
        let mut conn = PgConnection::connect_with(&self.config.connect_options())
            .await
            .map_err(|e| FeedbackError::Connection(e.to_string()))?;

        let result = sqlx::query(INSERT_FEEDBACK)
            .bind(&entry.name)
            .bind(&entry.email)
            .bind(&entry.feedback)
            .execute(&mut conn)
            .await;

        if let Err(e) = conn.close().await {
            log::warn!("Failed to close feedback connection: {}", e);
        }

        result
            .map(|_| ())
            .map_err(|e| FeedbackError::Insert(e.to_string()))
    }
}
