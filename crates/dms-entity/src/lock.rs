//! Lock record model.

use chrono::{DateTime, Utc};
use dms_core::types::{LockId, UserId};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Kind of entity a lock is held on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LockEntityType {
    /// A folder lock; also locks everything below it.
    Folder,
    /// A file lock.
    File,
}

/// A lock held by a user on a folder or a file.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Lock {
    /// Unique lock identifier.
    pub id: LockId,
    /// Kind of the locked entity.
    pub entity_type: LockEntityType,
    /// The locked folder or file id.
    pub entity_id: Uuid,
    /// Lock holder.
    pub user_id: Option<UserId>,
    /// When the lock lapses; None for locks without expiry.
    pub expires_at: Option<DateTime<Utc>>,
    /// When the lock was taken.
    pub created_at: DateTime<Utc>,
}

impl Lock {
    /// Whether the lock is in force at the given instant.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp > now).unwrap_or(true)
    }
}
