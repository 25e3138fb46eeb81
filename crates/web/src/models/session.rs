//! Session-related types.
//!
//! The remote API owns all user data; the session only remembers who logged
//! in and the bearer token the remote issued for them.

use serde::{Deserialize, Serialize};

/// Session-stored identity of the logged-in user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    /// Username as typed at login, shown in the navigation bar.
    pub username: String,
}

/// Session keys.
pub mod keys {
    /// Bearer token issued by the remote API.
    pub const ACCESS_TOKEN: &str = "access_token";

    /// The current logged-in user.
    pub const CURRENT_USER: &str = "current_user";

    /// Pending flash messages.
    pub const FLASH: &str = "flash";
}
