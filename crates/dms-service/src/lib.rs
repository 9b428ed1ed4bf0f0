//! # dms-service
//!
//! The folder hierarchy engine of the document management system. Each
//! service orchestrates repositories, the blob storage provider, the lock
//! registry and authorization to implement one group of use cases.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references. Every call receives an
//! explicit [`RequestContext`] naming the acting principal.

pub mod context;
pub mod email;
pub mod entries;
pub mod file;
pub mod folder;
pub mod link;
pub mod permission;
pub mod trash;

mod guard;
mod purge;
mod scope;

pub use context::RequestContext;
pub use email::{EmailDraft, EmailService};
pub use entries::{EntriesOutcome, EntriesService, EntryRef};
pub use file::FileService;
pub use folder::{ColumnLayout, FolderService, TreeService};
pub use link::LinkService;
pub use permission::PermissionService;
pub use trash::{TrashListing, TrashService};
