//! Custom field repository implementation.

use sqlx::SqliteConnection;

use dms_core::result::AppResult;
use dms_core::types::{CustomFieldId, CustomValueId, FolderId};
use dms_entity::custom_field::{CustomField, CustomValue};

use super::db_err;

/// Repository for custom field definitions and folder values.
#[derive(Debug, Clone, Copy, Default)]
pub struct CustomFieldRepository;

impl CustomFieldRepository {
    /// All custom fields in display order.
    pub async fn list(conn: &mut SqliteConnection) -> AppResult<Vec<CustomField>> {
        sqlx::query_as::<_, CustomField>("SELECT * FROM custom_fields ORDER BY position, name")
            .fetch_all(&mut *conn)
            .await
            .map_err(db_err("Failed to list custom fields"))
    }

    /// Define a custom field.
    pub async fn create(
        conn: &mut SqliteConnection,
        name: &str,
        position: i64,
    ) -> AppResult<CustomField> {
        sqlx::query_as::<_, CustomField>(
            "INSERT INTO custom_fields (id, name, position) VALUES (?, ?, ?) RETURNING *",
        )
        .bind(CustomFieldId::new())
        .bind(name)
        .bind(position)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to create custom field"))
    }

    /// Values attached to a folder.
    pub async fn values_for_folder(
        conn: &mut SqliteConnection,
        folder_id: FolderId,
    ) -> AppResult<Vec<CustomValue>> {
        sqlx::query_as::<_, CustomValue>("SELECT * FROM custom_values WHERE folder_id = ?")
            .bind(folder_id)
            .fetch_all(&mut *conn)
            .await
            .map_err(db_err("Failed to list custom values"))
    }

    /// Attach a value to a folder.
    pub async fn set_value(
        conn: &mut SqliteConnection,
        folder_id: FolderId,
        custom_field_id: CustomFieldId,
        value: &str,
    ) -> AppResult<CustomValue> {
        sqlx::query_as::<_, CustomValue>(
            "INSERT INTO custom_values (id, folder_id, custom_field_id, value) \
             VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(CustomValueId::new())
        .bind(folder_id)
        .bind(custom_field_id)
        .bind(value)
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to set custom value"))
    }

    /// Copy every value of one folder onto another.
    pub async fn copy_values(conn: &mut SqliteConnection, from: FolderId, to: FolderId) -> AppResult<()> {
        for value in Self::values_for_folder(conn, from).await? {
            Self::set_value(conn, to, value.custom_field_id, &value.value).await?;
        }
        Ok(())
    }

    /// Remove every value attached to a folder.
    pub async fn delete_for_folder(conn: &mut SqliteConnection, folder_id: FolderId) -> AppResult<()> {
        sqlx::query("DELETE FROM custom_values WHERE folder_id = ?")
            .bind(folder_id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to delete custom values"))?;
        Ok(())
    }
}
