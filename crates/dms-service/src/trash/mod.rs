//! Trash bin listing.

pub mod service;

pub use service::{TrashListing, TrashService};
