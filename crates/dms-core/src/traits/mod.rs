//! Traits for collaborators the engine consults but does not own.

pub mod lock;
pub mod storage;

pub use lock::{LockRegistry, LockedResource};
pub use storage::StorageProvider;
