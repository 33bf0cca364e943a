//! Database migration command.
//!
//! ```bash
//! wardrobe-cli migrate
//! ```
//!
//! Migrations live in `crates/functions/migrations/`.

use super::{CliError, connect};

/// Run the document store migrations.
///
/// # Errors
///
/// Returns an error if the store is unreachable or a migration fails.
pub async fn run() -> Result<(), CliError> {
    let store = connect().await?;

    tracing::info!("Running document store migrations...");
    store.migrate().await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
