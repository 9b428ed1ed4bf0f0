//! Database migration command.

use dms_core::config::AppConfig;
use dms_core::error::AppError;
use dms_database::run_migrations;

use crate::output;

/// Apply all pending migrations.
pub async fn execute(config: &AppConfig) -> Result<(), AppError> {
    let runtime = super::Runtime::connect(config).await?;

    println!("Running database migrations...");
    run_migrations(&runtime.db).await?;
    output::print_success("All migrations applied successfully.");

    runtime.db.close().await;
    Ok(())
}
