//! # dms-auth
//!
//! Authorization for the document management engine.
//!
//! ## Modules
//!
//! - `principal`: who is asking (user, anonymous visitor, or the system)
//! - `rbac`: project-level capability checks over member roles
//! - `acl`: per-folder permission entries with ancestor inheritance

pub mod acl;
pub mod principal;
pub mod rbac;

pub use acl::PermissionEvaluator;
pub use principal::Principal;
pub use rbac::{ProjectAccess, RbacEnforcer};
