//! Role-based capability checks within a project.

pub mod enforcer;

pub use enforcer::{ProjectAccess, RbacEnforcer};
