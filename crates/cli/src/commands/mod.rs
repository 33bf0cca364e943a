//! CLI command implementations.
//!
//! Every command talks to the `PostgreSQL` document store named by
//! `WARDROBE_DATABASE_URL` (falling back to `DATABASE_URL`).

pub mod migrate;
pub mod recommend;
pub mod replay;
pub mod seed;

use secrecy::SecretString;
use thiserror::Error;

use wardrobe_core::PathError;
use wardrobe_functions::error::FunctionError;
use wardrobe_functions::store::{PostgresStore, StoreError};

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Required environment variable is missing.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Function failed: {0}")]
    Function(#[from] FunctionError),

    #[error("Invalid path: {0}")]
    Path(#[from] PathError),

    #[error("Could not read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid seed file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Could not encode output: {0}")]
    Json(#[from] serde_json::Error),

    /// The requested document does not exist.
    #[error("Document not found: {0}")]
    NotFound(String),
}

/// Connect to the document store configured in the environment.
///
/// # Errors
///
/// Returns an error if no database URL is set or the connection fails.
pub async fn connect() -> Result<PostgresStore, CliError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("WARDROBE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("WARDROBE_DATABASE_URL"))?;

    tracing::info!("Connecting to document store...");
    Ok(PostgresStore::connect(&database_url).await?)
}
