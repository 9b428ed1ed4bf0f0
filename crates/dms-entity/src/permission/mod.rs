//! Per-folder permission entries.

pub mod model;

pub use model::{FolderPermission, PrincipalRef, PrincipalType};
