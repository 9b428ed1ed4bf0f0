//! # dms-database
//!
//! SQLite connection management, the embedded schema migration, and
//! concrete repositories for every table of the document engine.
//!
//! Repositories are stateless: each query takes a `&mut SqliteConnection`
//! so the same call runs on a pooled connection or inside a transaction.

pub mod connection;
pub mod migration;
pub mod repositories;

pub use connection::DatabasePool;
pub use migration::run_migrations;
