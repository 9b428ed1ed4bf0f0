//! Bulk operations over mixed folder, file and link references.

pub mod reference;
pub mod service;

pub use reference::EntryRef;
pub use service::{EntriesOutcome, EntriesService, EntryFailure};
