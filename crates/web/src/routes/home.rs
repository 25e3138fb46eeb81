//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::routes::PageContext;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub ctx: PageContext,
}

/// Display the home page.
#[instrument(skip(session))]
pub async fn home(session: Session) -> Result<impl IntoResponse> {
    Ok(HomeTemplate {
        ctx: PageContext::load(&session).await?,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;

    use crate::routes::test_support::{app, body_text, get, login, send};

    #[tokio::test]
    async fn test_home_anonymous() {
        let (app, _) = app().await;
        let (response, _) = send(&app, get("/", None)).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_text(response).await;
        assert!(body.contains("/login"));
        assert!(!body.contains("/logout"));
    }

    #[tokio::test]
    async fn test_home_shows_username_and_login_flash() {
        let (app, _) = app().await;
        let cookie = login(&app).await;

        let (response, _) = send(&app, get("/", Some(&cookie))).await;
        let body = body_text(response).await;
        assert!(body.contains("mike"));
        assert!(body.contains("Sesión iniciada correctamente"));

        // Flash messages are shown once.
        let (response, _) = send(&app, get("/", Some(&cookie))).await;
        assert!(!body_text(response).await.contains("Sesión iniciada correctamente"));
    }
}
