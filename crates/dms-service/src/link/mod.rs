//! Links to folders and files.

pub mod service;

pub use service::{CreateLinkRequest, LinkService, LinkTarget};
