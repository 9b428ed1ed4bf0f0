//! Concrete repository implementations.

pub mod custom_field;
pub mod file;
pub mod folder;
pub mod link;
pub mod lock;
pub mod permission;
pub mod project;
pub mod user;

pub use custom_field::CustomFieldRepository;
pub use file::FileRepository;
pub use folder::FolderRepository;
pub use link::LinkRepository;
pub use lock::LockRepository;
pub use permission::FolderPermissionRepository;
pub use project::ProjectRepository;
pub use user::UserRepository;

use dms_core::error::{AppError, ErrorKind};

/// Wrap a sqlx error with a context message.
pub(crate) fn db_err(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, context, e)
}
