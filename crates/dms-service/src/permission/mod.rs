//! Per-folder permission management.

pub mod service;

pub use service::PermissionService;
