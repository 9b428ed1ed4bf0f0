//! Request context carrying the acting principal.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dms_auth::Principal;
use dms_core::types::UserId;

/// Context for the current request.
///
/// Built by the caller and passed into every service method so that each
/// operation knows *who* is acting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The acting principal.
    pub principal: Principal,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(principal: Principal) -> Self {
        Self {
            principal,
            request_time: Utc::now(),
        }
    }

    /// Context of a logged-in user.
    pub fn user(id: UserId, admin: bool) -> Self {
        Self::new(Principal::User { id, admin })
    }

    /// Context of an anonymous visitor.
    pub fn anonymous() -> Self {
        Self::new(Principal::Anonymous)
    }

    /// Context of maintenance tasks.
    pub fn system() -> Self {
        Self::new(Principal::System)
    }

    /// The acting user, if any.
    pub fn user_id(&self) -> Option<UserId> {
        self.principal.user_id()
    }

    /// Label for log fields.
    pub fn actor(&self) -> String {
        self.principal.label()
    }
}
