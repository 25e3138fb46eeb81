//! One-time status messages carried across a redirect.
//!
//! Messages are queued in the session and drained the next time a page
//! renders, so each one is shown exactly once.

use serde::{Deserialize, Serialize};
use tower_sessions::Session;

use crate::models::session_keys;

/// Severity of a flash message; doubles as the CSS modifier class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Info,
    Warning,
    Error,
}

impl FlashLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for FlashLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queued message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    pub level: FlashLevel,
    pub text: String,
}

/// Queue a message for the next rendered page.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn push(
    session: &Session,
    level: FlashLevel,
    text: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    let mut pending: Vec<FlashMessage> = session
        .get(session_keys::FLASH)
        .await?
        .unwrap_or_default();

    pending.push(FlashMessage {
        level,
        text: text.into(),
    });

    session.insert(session_keys::FLASH, pending).await
}

/// Queue a success message.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn success(
    session: &Session,
    text: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    push(session, FlashLevel::Success, text).await
}

/// Queue a warning message.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn warning(
    session: &Session,
    text: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    push(session, FlashLevel::Warning, text).await
}

/// Queue an error message.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn error(
    session: &Session,
    text: impl Into<String>,
) -> Result<(), tower_sessions::session::Error> {
    push(session, FlashLevel::Error, text).await
}

/// Remove and return every pending message, oldest first.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn take(session: &Session) -> Result<Vec<FlashMessage>, tower_sessions::session::Error> {
    Ok(session
        .remove::<Vec<FlashMessage>>(session_keys::FLASH)
        .await?
        .unwrap_or_default())
}
