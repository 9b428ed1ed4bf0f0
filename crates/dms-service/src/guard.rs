//! Lock checks run before deleting documents.

use sqlx::SqliteConnection;

use dms_core::error::AppError;
use dms_core::result::AppResult;
use dms_core::traits::{LockRegistry, LockedResource};
use dms_database::repositories::LockRepository;
use dms_entity::file::File;
use dms_entity::folder::Folder;

/// Whether any folder of the chain carries an active lock.
///
/// A lock on a folder covers everything below it.
pub(crate) async fn chain_locked(locks: &dyn LockRegistry, chain: &[Folder]) -> AppResult<bool> {
    for folder in chain {
        if locks.is_locked(LockedResource::Folder(folder.id)).await? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Fail if the folder (first in `chain`) or an ancestor is locked.
pub(crate) async fn ensure_folder_unlocked(
    locks: &dyn LockRegistry,
    chain: &[Folder],
) -> AppResult<()> {
    if chain_locked(locks, chain).await? {
        return Err(AppError::validation("Folder is locked"));
    }
    Ok(())
}

/// Same check as [`ensure_folder_unlocked`], read through an open
/// transaction so it sees the state the delete commits against.
pub(crate) async fn ensure_folder_unlocked_in(
    conn: &mut SqliteConnection,
    chain: &[Folder],
) -> AppResult<()> {
    for folder in chain {
        if LockRepository::is_active(conn, LockedResource::Folder(folder.id)).await? {
            return Err(AppError::validation("Folder is locked"));
        }
    }
    Ok(())
}

/// Fail if the file or a folder above it is locked.
pub(crate) async fn ensure_file_unlocked(
    locks: &dyn LockRegistry,
    file: &File,
    chain: &[Folder],
) -> AppResult<()> {
    if locks.is_locked(LockedResource::File(file.id)).await? || chain_locked(locks, chain).await? {
        return Err(AppError::validation("File is locked"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use dms_core::types::{FolderId, ProjectId};
    use dms_database::DatabasePool;
    use dms_entity::status::EntryStatus;

    fn folder(id: FolderId, parent_id: Option<FolderId>) -> Folder {
        let now = Utc::now();
        Folder {
            id,
            project_id: ProjectId::new(),
            parent_id,
            title: "folder".to_string(),
            description: String::new(),
            position: 0,
            status: EntryStatus::Active,
            deleted_by: None,
            created_by: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_lock_taken_before_commit_is_seen_in_transaction() {
        let db = DatabasePool::in_memory().await.unwrap();
        let (root, child) = (FolderId::new(), FolderId::new());
        let chain = vec![folder(child, Some(root)), folder(root, None)];

        let mut tx = db.begin().await.unwrap();
        ensure_folder_unlocked_in(&mut tx, &chain).await.unwrap();

        LockRepository::create(&mut tx, LockedResource::Folder(root), None, None)
            .await
            .unwrap();
        let err = ensure_folder_unlocked_in(&mut tx, &chain).await.unwrap_err();
        assert_eq!(err.message, "Folder is locked");
    }

    #[tokio::test]
    async fn test_expired_lock_does_not_block() {
        let db = DatabasePool::in_memory().await.unwrap();
        let id = FolderId::new();
        let chain = vec![folder(id, None)];

        let mut tx = db.begin().await.unwrap();
        let expired = Utc::now() - Duration::hours(1);
        LockRepository::create(&mut tx, LockedResource::Folder(id), None, Some(expired))
            .await
            .unwrap();
        ensure_folder_unlocked_in(&mut tx, &chain).await.unwrap();
    }
}
