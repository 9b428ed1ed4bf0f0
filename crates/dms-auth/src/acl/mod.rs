//! Folder permission entries with ancestor inheritance.

pub mod inheritance;

pub use inheritance::PermissionEvaluator;
