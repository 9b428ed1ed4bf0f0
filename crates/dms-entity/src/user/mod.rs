//! Users, roles, capabilities and project memberships.

pub mod capability;
pub mod member;
pub mod model;
pub mod role;

pub use capability::Capability;
pub use member::Member;
pub use model::User;
pub use role::Role;
