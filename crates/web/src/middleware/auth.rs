//! Authentication extractors and session helpers.
//!
//! Logging in stores the bearer token issued by the remote API in the session.
//! [`RequireAuth`] reads it back on every gated request and hands the handler
//! an [`ApiClient`] that sends it.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::{ExposeSecret, SecretString};
use tower_sessions::Session;

use crate::api::ApiClient;
use crate::error::AppError;
use crate::flash;
use crate::models::{CurrentUser, session_keys};
use crate::state::AppState;

/// Warning queued when an anonymous visitor hits a gated page.
pub const LOGIN_REQUIRED_MESSAGE: &str = "Acceso denegado. Por favor, inicia sesión con tu usuario";

/// Extractor that requires a logged-in user.
///
/// If nobody is logged in, queues a warning and redirects to the login page.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth { user, api }: RequireAuth) -> impl IntoResponse {
///     let customers = api.list_customers().await?;
///     format!("{} sees {} customers", user.username, customers.len())
/// }
/// ```
pub struct RequireAuth {
    pub user: CurrentUser,
    /// Client carrying this session's bearer token.
    pub api: ApiClient,
}

/// Error returned when authentication is required but the user is not logged in.
pub enum AuthRejection {
    /// Redirect to login page.
    RedirectToLogin,
    /// The session itself is unavailable.
    Internal(AppError),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Internal(err) => err.into_response(),
        }
    }
}

impl From<tower_sessions::session::Error> for AuthRejection {
    fn from(err: tower_sessions::session::Error) -> Self {
        Self::Internal(err.into())
    }
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts.extensions.get::<Session>().ok_or_else(|| {
            AuthRejection::Internal(AppError::Internal("session layer missing".to_string()))
        })?;

        let token: Option<String> = session.get(session_keys::ACCESS_TOKEN).await?;
        let user: Option<CurrentUser> = session.get(session_keys::CURRENT_USER).await?;

        let (Some(token), Some(user)) = (token, user) else {
            tracing::debug!(path = %parts.uri.path(), "Anonymous request to gated page");
            flash::warning(session, LOGIN_REQUIRED_MESSAGE).await?;
            return Err(AuthRejection::RedirectToLogin);
        };

        let api = state.api().with_token(SecretString::from(token));

        Ok(Self { user, api })
    }
}

/// Read the logged-in user, if any.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn current_user(
    session: &Session,
) -> Result<Option<CurrentUser>, tower_sessions::session::Error> {
    session.get(session_keys::CURRENT_USER).await
}

/// Store a successful login in the session.
///
/// The session ID is rotated first so a pre-login cookie cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_user(
    session: &Session,
    user: &CurrentUser,
    token: &SecretString,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::ACCESS_TOKEN, token.expose_secret())
        .await?;
    session.insert(session_keys::CURRENT_USER, user).await
}

/// Remove the login from the session, keeping anything else (pending flashes).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_user(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.remove::<String>(session_keys::ACCESS_TOKEN).await?;
    session
        .remove::<CurrentUser>(session_keys::CURRENT_USER)
        .await?;
    Ok(())
}
