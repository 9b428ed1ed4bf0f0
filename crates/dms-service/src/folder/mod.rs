//! Folder lifecycle, tree projection and list column layout.

pub mod columns;
pub mod copy;
pub mod service;
pub mod tree;

pub use columns::{AVAILABLE_COLUMNS, Column, ColumnLayout};
pub use service::{CreateFolderRequest, FolderService, UpdateFolderRequest};
pub use tree::TreeService;
