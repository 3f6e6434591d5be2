//! User model.

use chrono::{DateTime, Utc};

use orchard_core::{Email, UserId};

/// A registered storefront user.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub email: Email,
    pub created_at: DateTime<Utc>,
}
