//! User entity model.

use chrono::{DateTime, Utc};
use dms_core::types::UserId;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: UserId,
    /// Login name.
    pub login: String,
    /// First name.
    pub firstname: String,
    /// Last name.
    pub lastname: String,
    /// E-mail address.
    pub mail: Option<String>,
    /// Administrators bypass every capability and folder permission check.
    pub admin: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Full display name.
    pub fn name(&self) -> String {
        format!("{} {}", self.firstname, self.lastname)
    }
}
