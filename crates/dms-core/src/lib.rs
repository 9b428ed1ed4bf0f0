//! # dms-core
//!
//! Core crate for the document management engine. Contains the unified
//! error system, typed identifiers, configuration schemas, and the traits
//! that describe collaborators owned outside the engine (blob storage and
//! the lock registry).
//!
//! This crate has **no** internal dependencies on other workspace crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
