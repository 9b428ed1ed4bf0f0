//! # dms-entity
//!
//! Domain entity models for the document management engine. Every struct
//! in this crate represents a table row or a domain value object. Row
//! types derive `sqlx::FromRow` in addition to `Serialize`/`Deserialize`.

pub mod custom_field;
pub mod file;
pub mod folder;
pub mod link;
pub mod lock;
pub mod permission;
pub mod project;
pub mod status;
pub mod user;

pub use status::EntryStatus;
