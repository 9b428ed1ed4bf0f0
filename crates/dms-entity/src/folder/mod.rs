//! Folder domain entities.

pub mod model;
pub mod title;
pub mod tree;

pub use model::{CreateFolder, Folder};
pub use title::valid_title;
pub use tree::{FolderTree, TreeEntry};
