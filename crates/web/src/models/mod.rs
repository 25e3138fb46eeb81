//! Types kept in the user session.

pub mod session;

pub use session::{CurrentUser, keys as session_keys};
