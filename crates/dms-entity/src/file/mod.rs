//! File and revision domain entities.

pub mod model;
pub mod revision;

pub use model::{CreateFile, File};
pub use revision::Revision;
