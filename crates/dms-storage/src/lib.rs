//! # dms-storage
//!
//! Storage providers for revision content. Only the local filesystem
//! provider ships with the engine; other backends implement
//! [`dms_core::traits::StorageProvider`].

pub mod providers;

pub use providers::LocalStorageProvider;
