//! Database migration runner.

use tracing::info;

use dms_core::error::{AppError, ErrorKind};

use crate::connection::DatabasePool;

/// Run all pending database migrations.
pub async fn run_migrations(db: &DatabasePool) -> Result<(), AppError> {
    info!("Running database migrations...");

    sqlx::migrate!("../../migrations")
        .run(db.pool())
        .await
        .map_err(|e| {
            AppError::with_source(
                ErrorKind::Database,
                format!("Failed to run migrations: {e}"),
                e,
            )
        })?;

    info!("Database migrations completed successfully");
    Ok(())
}
