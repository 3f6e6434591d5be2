//! Session data and keys.

use serde::{Deserialize, Serialize};

use orchard_core::UserId;

use crate::models::user::User;

/// Keys under which values are stored in the session.
pub mod session_keys {
    /// The logged-in user, if any.
    pub const CURRENT_USER: &str = "current_user";
}

/// The authenticated user as carried in the session.
///
/// This is the identity every cart/wishlist operation is scoped by; its
/// absence is a valid state (guest), not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: UserId,
    pub email: String,
}

impl From<&User> for CurrentUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.as_str().to_owned(),
        }
    }
}
