//! Lock repository and the pool-backed lock registry.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqliteConnection;
use sqlx::sqlite::SqlitePool;
use uuid::Uuid;

use dms_core::result::AppResult;
use dms_core::traits::{LockRegistry, LockedResource};
use dms_core::types::{LockId, UserId};
use dms_entity::lock::{Lock, LockEntityType};

use super::db_err;

/// Repository for lock records.
///
/// Locks are written by the document editing workflow; the engine only
/// reads them. The write helpers exist for administration and tests.
#[derive(Debug, Clone)]
pub struct LockRepository {
    pool: SqlitePool,
}

impl LockRepository {
    /// Create a new lock repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Lock records attached to a resource, expired ones included.
    pub async fn list_for(
        conn: &mut SqliteConnection,
        resource: LockedResource,
    ) -> AppResult<Vec<Lock>> {
        let (entity_type, entity_id) = split(resource);
        sqlx::query_as::<_, Lock>(
            "SELECT * FROM locks WHERE entity_type = ? AND entity_id = ? ORDER BY created_at",
        )
        .bind(entity_type)
        .bind(entity_id)
        .fetch_all(&mut *conn)
        .await
        .map_err(db_err("Failed to list locks"))
    }

    /// Whether the resource carries a lock that has not expired.
    pub async fn is_active(conn: &mut SqliteConnection, resource: LockedResource) -> AppResult<bool> {
        let now = Utc::now();
        let locks = Self::list_for(conn, resource).await?;
        Ok(locks.iter().any(|lock| lock.is_active_at(now)))
    }

    /// Record a lock.
    pub async fn create(
        conn: &mut SqliteConnection,
        resource: LockedResource,
        user_id: Option<UserId>,
        expires_at: Option<DateTime<Utc>>,
    ) -> AppResult<Lock> {
        let (entity_type, entity_id) = split(resource);
        sqlx::query_as::<_, Lock>(
            "INSERT INTO locks (id, entity_type, entity_id, user_id, expires_at, created_at) \
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(LockId::new())
        .bind(entity_type)
        .bind(entity_id)
        .bind(user_id)
        .bind(expires_at)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await
        .map_err(db_err("Failed to create lock"))
    }

    /// Remove every lock record of a resource.
    pub async fn release(conn: &mut SqliteConnection, resource: LockedResource) -> AppResult<()> {
        let (entity_type, entity_id) = split(resource);
        sqlx::query("DELETE FROM locks WHERE entity_type = ? AND entity_id = ?")
            .bind(entity_type)
            .bind(entity_id)
            .execute(&mut *conn)
            .await
            .map_err(db_err("Failed to release locks"))?;
        Ok(())
    }
}

#[async_trait]
impl LockRegistry for LockRepository {
    async fn is_locked(&self, resource: LockedResource) -> AppResult<bool> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(db_err("Failed to acquire a connection"))?;
        Self::is_active(&mut conn, resource).await
    }
}

fn split(resource: LockedResource) -> (LockEntityType, Uuid) {
    match resource {
        LockedResource::Folder(id) => (LockEntityType::Folder, id.into_uuid()),
        LockedResource::File(id) => (LockEntityType::File, id.into_uuid()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DatabasePool;
    use chrono::Duration;
    use dms_core::types::FolderId;

    #[tokio::test]
    async fn test_expired_locks_are_ignored() {
        let db = DatabasePool::in_memory().await.unwrap();
        let registry = LockRepository::new(db.pool().clone());
        let folder = LockedResource::Folder(FolderId::new());

        {
            let mut conn = db.acquire().await.unwrap();
            LockRepository::create(&mut conn, folder, None, Some(Utc::now() - Duration::hours(1)))
                .await
                .unwrap();
        }
        assert!(!registry.is_locked(folder).await.unwrap());

        {
            let mut conn = db.acquire().await.unwrap();
            LockRepository::create(&mut conn, folder, None, None).await.unwrap();
        }
        assert!(registry.is_locked(folder).await.unwrap());

        {
            let mut conn = db.acquire().await.unwrap();
            LockRepository::release(&mut conn, folder).await.unwrap();
        }
        assert!(!registry.is_locked(folder).await.unwrap());
    }
}
