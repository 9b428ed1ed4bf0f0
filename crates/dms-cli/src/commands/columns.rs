//! Document list column layout command.

use serde::Serialize;
use tabled::Tabled;

use dms_core::config::AppConfig;
use dms_core::error::AppError;
use dms_service::ColumnLayout;

use crate::output::{self, OutputFormat};

/// Column display row
#[derive(Debug, Serialize, Tabled)]
struct ColumnRow {
    /// Column position
    position: usize,
    /// Column name
    column: String,
}

/// Print the configured columns with their positions.
pub async fn execute(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let runtime = super::Runtime::connect(config).await?;
    let layout = {
        let mut conn = runtime.db.acquire().await?;
        ColumnLayout::load(&mut conn, &config.dms).await?
    };

    let rows: Vec<ColumnRow> = layout
        .positions()
        .into_iter()
        .map(|(column, position)| ColumnRow { position, column })
        .collect();
    output::print_list(&rows, format);
    Ok(())
}
