//! Document e-mail drafts.

mod draft;

pub use draft::{Attachment, EmailDraft, EmailService};
