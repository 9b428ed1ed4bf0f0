//! Custom field definitions and the values attached to folders.

use dms_core::types::{CustomFieldId, CustomValueId, FolderId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A custom field definition. Its name can be enabled as a list column.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CustomField {
    /// Unique field identifier.
    pub id: CustomFieldId,
    /// Field name.
    pub name: String,
    /// Display position.
    pub position: i64,
}

/// A value of a custom field on a folder, carried along unmodified on copy.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CustomValue {
    /// Unique value identifier.
    pub id: CustomValueId,
    /// The folder this value belongs to.
    pub folder_id: FolderId,
    /// The field definition.
    pub custom_field_id: CustomFieldId,
    /// Raw value.
    pub value: String,
}
