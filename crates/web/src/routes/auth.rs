//! Authentication route handlers.
//!
//! Accounts live in the remote API. Logging in exchanges the credentials for
//! a bearer token, which is kept in the session until logout or until the
//! remote stops accepting it.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{Result, add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::flash;
use crate::forms::{FormErrors, LoginForm, RegisterForm};
use crate::middleware::set_current_user;
use crate::models::CurrentUser;
use crate::routes::{PageContext, error_message};
use crate::state::AppState;

pub const LOGIN_SUCCESS_MESSAGE: &str = "Sesión iniciada correctamente";
pub const REGISTER_SUCCESS_MESSAGE: &str =
    "Usuario registrado correctamente. Ya puedes iniciar sesión";
pub const LOGOUT_MESSAGE: &str = "Sesión cerrada correctamente. ¡Hasta pronto!";

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub ctx: PageContext,
    pub form: LoginForm,
    pub errors: FormErrors,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub ctx: PageContext,
    pub form: RegisterForm,
    pub errors: FormErrors,
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
#[instrument(skip(session))]
pub async fn login_page(session: Session) -> Result<impl IntoResponse> {
    Ok(LoginTemplate {
        ctx: PageContext::load(&session).await?,
        form: LoginForm::default(),
        errors: FormErrors::default(),
    })
}

/// Handle login form submission.
///
/// On success the token and username go into the session. On failure the
/// session is left as it was and the form is shown again.
#[instrument(skip(state, session, form), fields(username = %form.username.trim()))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response> {
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => return render_login(&session, form, errors).await,
    };

    match state
        .api()
        .authenticate(&credentials.username, &credentials.password)
        .await
    {
        Ok(token) => {
            let user = CurrentUser {
                username: credentials.username,
            };
            set_current_user(&session, &user, &token.access_token).await?;
            set_sentry_user(&user.username);
            add_breadcrumb("auth", "Logged in", None);
            tracing::info!("Login succeeded");

            flash::success(&session, LOGIN_SUCCESS_MESSAGE).await?;
            Ok(Redirect::to("/").into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            flash::error(&session, error_message(&e)).await?;
            render_login(&session, form, FormErrors::default()).await
        }
    }
}

async fn render_login(session: &Session, form: LoginForm, errors: FormErrors) -> Result<Response> {
    Ok(LoginTemplate {
        ctx: PageContext::load(session).await?,
        form: LoginForm {
            password: String::new(),
            ..form
        },
        errors,
    }
    .into_response())
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
#[instrument(skip(session))]
pub async fn register_page(session: Session) -> Result<impl IntoResponse> {
    Ok(RegisterTemplate {
        ctx: PageContext::load(&session).await?,
        form: RegisterForm::default(),
        errors: FormErrors::default(),
    })
}

/// Handle registration form submission.
#[instrument(skip(state, session, form), fields(username = %form.username.trim()))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Result<Response> {
    let registration = match form.validate() {
        Ok(registration) => registration,
        Err(errors) => return render_register(&session, form, errors).await,
    };

    match state
        .api()
        .register(
            &registration.username,
            registration.email.as_str(),
            &registration.password,
        )
        .await
    {
        Ok(_) => {
            tracing::info!("Registration succeeded");
            flash::success(&session, REGISTER_SUCCESS_MESSAGE).await?;
            Ok(Redirect::to("/login").into_response())
        }
        Err(e) => {
            tracing::warn!(error = %e, "Registration failed");
            flash::error(&session, error_message(&e)).await?;
            render_register(&session, form, FormErrors::default()).await
        }
    }
}

async fn render_register(
    session: &Session,
    form: RegisterForm,
    errors: FormErrors,
) -> Result<Response> {
    Ok(RegisterTemplate {
        ctx: PageContext::load(session).await?,
        form: RegisterForm {
            password: String::new(),
            password_confirm: String::new(),
            ..form
        },
        errors,
    }
    .into_response())
}

// =============================================================================
// Logout
// =============================================================================

/// Drop the whole session and start a fresh one holding only the goodbye message.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect> {
    session.flush().await?;
    clear_sentry_user();
    add_breadcrumb("auth", "Logged out", None);

    flash::success(&session, LOGOUT_MESSAGE).await?;
    Ok(Redirect::to("/"))
}
