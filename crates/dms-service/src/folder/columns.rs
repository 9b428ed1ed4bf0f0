//! List view column registry.
//!
//! Columns are laid out in a fixed order: a checkbox at position 0, then
//! the enabled columns among `id`, `title`, `size`, `modified`, `version`,
//! `workflow`, `author`, then enabled custom fields, then the always
//! present `commands` column and four hidden sort columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::SqliteConnection;

use dms_core::config::DmsConfig;
use dms_core::config::dms::DEFAULT_COLUMNS;
use dms_core::error::AppError;
use dms_core::result::AppResult;
use dms_database::repositories::CustomFieldRepository;

/// Columns a user can switch on.
pub const AVAILABLE_COLUMNS: [&str; 7] =
    ["id", "title", "size", "modified", "version", "workflow", "author"];

/// Every built-in column, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Id,
    Title,
    Size,
    Modified,
    Version,
    Workflow,
    Author,
    Commands,
    Position,
    SizeCalculated,
    ModifiedCalculated,
    VersionCalculated,
}

impl Column {
    /// Switchable columns, in display order.
    pub const SWITCHABLE: [Column; 7] = [
        Self::Id,
        Self::Title,
        Self::Size,
        Self::Modified,
        Self::Version,
        Self::Workflow,
        Self::Author,
    ];

    /// Columns always rendered after the custom fields.
    pub const TRAILING: [Column; 5] = [
        Self::Commands,
        Self::Position,
        Self::SizeCalculated,
        Self::ModifiedCalculated,
        Self::VersionCalculated,
    ];

    /// Column name as used in settings.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Size => "size",
            Self::Modified => "modified",
            Self::Version => "version",
            Self::Workflow => "workflow",
            Self::Author => "author",
            Self::Commands => "commands",
            Self::Position => "position",
            Self::SizeCalculated => "size_calculated",
            Self::ModifiedCalculated => "modified_calculated",
            Self::VersionCalculated => "version_calculated",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Column {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::SWITCHABLE
            .iter()
            .chain(Self::TRAILING.iter())
            .copied()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("Unknown column: '{s}'")))
    }
}

/// The enabled columns of the document list and their positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    /// Enabled switchable columns and custom field names.
    enabled: Vec<String>,
    /// Custom field names in display order.
    custom_fields: Vec<String>,
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self {
            enabled: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            custom_fields: Vec::new(),
        }
    }
}

impl ColumnLayout {
    /// Build a layout, rejecting names that are neither built-in columns
    /// nor known custom fields.
    pub fn new(enabled: &[String], custom_fields: &[String]) -> AppResult<Self> {
        for name in enabled {
            let known = AVAILABLE_COLUMNS.contains(&name.as_str()) || custom_fields.contains(name);
            if !known {
                return Err(AppError::configuration(format!(
                    "Unknown document list column '{name}'"
                )));
            }
        }
        Ok(Self {
            enabled: enabled.to_vec(),
            custom_fields: custom_fields.to_vec(),
        })
    }

    /// Build the layout from settings and the defined custom fields.
    pub async fn load(conn: &mut SqliteConnection, config: &DmsConfig) -> AppResult<Self> {
        let fields: Vec<String> = CustomFieldRepository::list(conn)
            .await?
            .into_iter()
            .map(|f| f.name)
            .collect();
        Self::new(&config.columns, &fields)
    }

    /// Whether the column is switched on.
    pub fn is_column_on(&self, name: &str) -> bool {
        self.enabled.iter().any(|c| c == name)
    }

    /// Position of a column in the rendered table, or `None` when the
    /// column is off or unknown. Position 0 is the checkbox column.
    pub fn get_column_position(&self, name: &str) -> Option<usize> {
        self.positions()
            .into_iter()
            .find(|(column, _)| column == name)
            .map(|(_, pos)| pos)
    }

    /// Every rendered column with its position, in order.
    pub fn positions(&self) -> Vec<(String, usize)> {
        let switchable = Column::SWITCHABLE
            .iter()
            .map(|c| c.as_str().to_string())
            .filter(|c| self.is_column_on(c));
        let custom = self
            .custom_fields
            .iter()
            .filter(|c| self.is_column_on(c))
            .cloned();
        let trailing = Column::TRAILING.iter().map(|c| c.as_str().to_string());

        switchable
            .chain(custom)
            .chain(trailing)
            .enumerate()
            .map(|(i, name)| (name, i + 1))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_columns_are_on() {
        let layout = ColumnLayout::default();
        for column in DEFAULT_COLUMNS {
            assert!(layout.is_column_on(column), "{column} should be on");
        }
        for column in AVAILABLE_COLUMNS.iter().filter(|c| !DEFAULT_COLUMNS.contains(c)) {
            assert!(!layout.is_column_on(column), "{column} should be off");
        }
    }

    #[test]
    fn test_default_positions() {
        let layout = ColumnLayout::new(
            &DEFAULT_COLUMNS.map(String::from),
            &["Tag".to_string()],
        )
        .unwrap();

        assert_eq!(layout.get_column_position("checkbox"), None);
        assert_eq!(layout.get_column_position("id"), None);
        assert_eq!(layout.get_column_position("title"), Some(1));
        assert_eq!(layout.get_column_position("size"), Some(2));
        assert_eq!(layout.get_column_position("modified"), Some(3));
        assert_eq!(layout.get_column_position("version"), Some(4));
        assert_eq!(layout.get_column_position("workflow"), Some(5));
        assert_eq!(layout.get_column_position("author"), Some(6));
        assert_eq!(layout.get_column_position("Tag"), None);
        assert_eq!(layout.get_column_position("commands"), Some(7));
        assert_eq!(layout.get_column_position("position"), Some(8));
        assert_eq!(layout.get_column_position("size_calculated"), Some(9));
        assert_eq!(layout.get_column_position("modified_calculated"), Some(10));
        assert_eq!(layout.get_column_position("version_calculated"), Some(11));
        assert_eq!(layout.get_column_position("nonsense"), None);
    }

    #[test]
    fn test_positions_strictly_increasing() {
        let layout = ColumnLayout::default();
        let positions: Vec<usize> = DEFAULT_COLUMNS
            .iter()
            .filter_map(|c| layout.get_column_position(c))
            .collect();
        assert_eq!(positions.len(), DEFAULT_COLUMNS.len());
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_id_and_custom_field_shift_positions() {
        let enabled: Vec<String> = ["id", "title", "Tag"].map(String::from).to_vec();
        let layout = ColumnLayout::new(&enabled, &["Tag".to_string()]).unwrap();
        assert_eq!(layout.get_column_position("id"), Some(1));
        assert_eq!(layout.get_column_position("title"), Some(2));
        assert_eq!(layout.get_column_position("size"), None);
        assert_eq!(layout.get_column_position("Tag"), Some(3));
        assert_eq!(layout.get_column_position("commands"), Some(4));
    }

    #[test]
    fn test_unknown_column_rejected() {
        let err = ColumnLayout::new(&["colour".to_string()], &[]).unwrap_err();
        assert!(err.is(dms_core::error::ErrorKind::Configuration));
    }

    #[test]
    fn test_parse_column() {
        assert_eq!("size_calculated".parse::<Column>().unwrap(), Column::SizeCalculated);
        assert!("checkbox".parse::<Column>().is_err());
    }
}
