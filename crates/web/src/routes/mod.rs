//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET       /                        - Home page
//! GET       /health                  - Health check (see main.rs)
//!
//! # Auth
//! GET/POST  /login                   - Login form / action
//! GET/POST  /register                - Registration form / action
//! GET/POST  /logout                  - Logout
//!
//! # Customers (requires auth)
//! GET       /customers               - Customer list (?page=, 100 per page)
//! GET/POST  /customers/new           - Create form / action
//! GET       /customers/{id}          - Customer detail and rental history
//! GET/POST  /customers/{id}/edit     - Edit form / action
//! GET/POST  /customers/{id}/delete   - Delete confirmation / action
//!
//! # Rentals (requires auth)
//! GET       /rentals                 - Rental list (?page=, 50 per page)
//! GET/POST  /rentals/new             - Create form / action
//! GET       /rentals/{id}            - Rental detail
//! POST      /rentals/{id}/return     - Mark returned
//! ```

pub mod auth;
pub mod customers;
pub mod home;
pub mod rentals;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use tower_sessions::Session;

use crate::api::ApiError;
use crate::error::Result;
use crate::flash::{self, FlashMessage};
use crate::middleware::{clear_current_user, current_user};
use crate::models::CurrentUser;
use crate::state::AppState;

/// Warning queued when the remote rejects the session's token.
pub const SESSION_EXPIRED_MESSAGE: &str = "Tu sesión ha expirado. Inicia sesión de nuevo";

/// Data every page layout needs: who is logged in and the pending messages.
#[derive(Debug, Default)]
pub struct PageContext {
    pub user: Option<CurrentUser>,
    pub messages: Vec<FlashMessage>,
}

impl PageContext {
    /// Read the current user and drain pending flash messages.
    ///
    /// # Errors
    ///
    /// Returns an error if the session store fails.
    pub async fn load(session: &Session) -> Result<Self> {
        Ok(Self {
            user: current_user(session).await?,
            messages: flash::take(session).await?,
        })
    }

    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.username.as_str())
    }
}

/// Turn a failed remote call into a flash message and a redirect.
///
/// A rejected token means the remote session is gone: the local login is
/// dropped and the user is sent to the login page. Anything else is shown as
/// `Error: …` on `fallback`.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn remote_failure(session: &Session, err: &ApiError, fallback: &str) -> Result<Redirect> {
    if err.is_unauthorized() {
        tracing::info!(error = %err, "Remote API rejected session token");
        clear_current_user(session).await?;
        flash::warning(session, SESSION_EXPIRED_MESSAGE).await?;
        return Ok(Redirect::to("/login"));
    }

    tracing::warn!(error = %err, fallback, "Remote API call failed");
    flash::error(session, error_message(err)).await?;
    Ok(Redirect::to(fallback))
}

/// Like [`remote_failure`], for a form that should be shown again.
///
/// Returns the redirect to follow when the token was rejected; otherwise the
/// error is queued and `None` tells the caller to re-render its form.
///
/// # Errors
///
/// Returns an error if the session store fails.
pub async fn remote_failure_on_form(session: &Session, err: &ApiError) -> Result<Option<Redirect>> {
    if err.is_unauthorized() {
        return remote_failure(session, err, "/login").await.map(Some);
    }

    tracing::warn!(error = %err, "Remote API rejected form submission");
    flash::error(session, error_message(err)).await?;
    Ok(None)
}

/// The text shown to users for a remote failure.
#[must_use]
pub fn error_message(err: &ApiError) -> String {
    format!("Error: {err}")
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout).post(auth::logout))
}

/// Create the customer routes router.
pub fn customer_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(customers::index))
        .route("/new", get(customers::new_page).post(customers::create))
        .route("/{id}", get(customers::show))
        .route("/{id}/edit", get(customers::edit_page).post(customers::update))
        .route(
            "/{id}/delete",
            get(customers::delete_page).post(customers::delete),
        )
}

/// Create the rental routes router.
pub fn rental_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(rentals::index))
        .route("/new", get(rentals::new_page).post(rentals::create))
        .route("/{id}", get(rentals::show))
        .route("/{id}/return", post(rentals::mark_returned))
}

/// Create all page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .merge(auth_routes())
        .nest("/customers", customer_routes())
        .nest("/rentals", rental_routes())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::significant_drop_tightening)]
pub(crate) mod test_support {
    //! Fake remote API and request helpers shared by the handler tests.

    use std::sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    };

    use axum::{
        Form, Json, Router,
        body::Body,
        extract::{Path, State},
        http::{HeaderMap, Request, StatusCode, header},
        response::{IntoResponse, Response},
        routing::{get as route_get, post, put},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use url::Url;

    use crate::config::{ApiConfig, WebConfig};
    use crate::middleware::create_session_layer;
    use crate::state::AppState;

    pub const GOOD_TOKEN: &str = "tok-123";

    /// Requests the fake remote saw.
    #[derive(Clone, Default)]
    pub struct Remote {
        pub bodies: Arc<Mutex<Vec<(String, Value)>>>,
        /// When set, the remote stops accepting the issued token.
        pub revoked: Arc<AtomicBool>,
    }

    impl Remote {
        pub fn revoke_tokens(&self) {
            self.revoked.store(true, Ordering::SeqCst);
        }

        fn accepts(&self, headers: &HeaderMap) -> bool {
            !self.revoked.load(Ordering::SeqCst) && authorized(headers)
        }

        fn record(&self, what: &str, body: Value) {
            self.bodies.lock().unwrap().push((what.to_string(), body));
        }

        pub fn body(&self, what: &str) -> Option<Value> {
            self.bodies
                .lock()
                .unwrap()
                .iter()
                .find(|(w, _)| w == what)
                .map(|(_, b)| b.clone())
        }
    }

    fn authorized(headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            == Some(GOOD_TOKEN)
    }

    fn unauthorized() -> Response {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({"detail": "Could not validate credentials"})),
        )
            .into_response()
    }

    pub fn customer_json(id: i32) -> Value {
        json!({
            "customer_id": id,
            "store_id": 1,
            "first_name": format!("FIRST{id}"),
            "last_name": "SMITH",
            "email": format!("c{id}@sakilacustomer.org"),
            "address_id": 5,
            "active": 1,
            "create_date": "2006-02-14T22:04:36"
        })
    }

    pub fn rental_json(id: i32) -> Value {
        json!({
            "rental_id": id,
            "rental_date": "2024-01-15T10:30:00Z",
            "inventory_id": 367,
            "customer_id": 1,
            "return_date": null,
            "staff_id": 1
        })
    }

    /// Customer 1 has rentals (delete answers 409); customer 2 can be
    /// deleted; anything else is missing. `count` customers are listed.
    async fn fake_remote(remote: Remote, count: i32) -> Url {
        let app = Router::new()
            .route(
                "/api/v1/auth/token",
                post(|Form(form): Form<std::collections::HashMap<String, String>>| async move {
                    if form.get("password").map(String::as_str) == Some("hunter2-hunter2") {
                        Json(json!({"access_token": GOOD_TOKEN, "token_type": "bearer"}))
                            .into_response()
                    } else {
                        (
                            StatusCode::UNAUTHORIZED,
                            Json(json!({"detail": "Incorrect username or password"})),
                        )
                            .into_response()
                    }
                }),
            )
            .route(
                "/api/v1/auth/register",
                post(|State(remote): State<Remote>, Json(body): Json<Value>| async move {
                    if body["username"] == "taken" {
                        return (
                            StatusCode::BAD_REQUEST,
                            Json(json!({"detail": "Username already registered"})),
                        )
                            .into_response();
                    }
                    remote.record("register", body);
                    (StatusCode::CREATED, Json(json!({"id": 7}))).into_response()
                }),
            )
            .route(
                "/api/v1/customers",
                route_get(move |State(remote): State<Remote>, headers: HeaderMap| async move {
                    if !remote.accepts(&headers) {
                        return unauthorized();
                    }
                    Json(Value::Array((1..=count).map(customer_json).collect())).into_response()
                })
                .post(
                    |State(remote): State<Remote>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        if !remote.accepts(&headers) {
                            return unauthorized();
                        }
                        remote.record("create_customer", body);
                        (StatusCode::CREATED, Json(customer_json(600))).into_response()
                    },
                ),
            )
            .route(
                "/api/v1/customers/{id}",
                route_get(|Path(id): Path<i32>| async move {
                    if id <= 2 {
                        Json(customer_json(id)).into_response()
                    } else {
                        (StatusCode::NOT_FOUND, Json(json!({"detail": "Customer not found"})))
                            .into_response()
                    }
                })
                .put(
                    |State(remote): State<Remote>, Path(id): Path<i32>, Json(body): Json<Value>| async move {
                        remote.record("update_customer", body);
                        Json(customer_json(id))
                    },
                )
                .delete(|Path(id): Path<i32>| async move {
                    if id == 1 {
                        (
                            StatusCode::CONFLICT,
                            Json(json!({"detail": "Customer has existing rentals"})),
                        )
                            .into_response()
                    } else {
                        StatusCode::NO_CONTENT.into_response()
                    }
                }),
            )
            .route(
                "/api/v1/rentals/customer/{id}",
                route_get(|| async { Json(json!([rental_json(10), rental_json(11)])) }),
            )
            .route(
                "/api/v1/rentals",
                route_get(|| async { Json(Value::Array((1..=120).map(rental_json).collect())) })
                    .post(
                        |State(remote): State<Remote>, Json(body): Json<Value>| async move {
                            remote.record("create_rental", body);
                            (StatusCode::CREATED, Json(rental_json(16050)))
                        },
                    ),
            )
            .route(
                "/api/v1/rentals/{id}",
                route_get(|Path(id): Path<i32>| async move { Json(rental_json(id)) }),
            )
            .route(
                "/api/v1/rentals/{id}/return",
                put(|Path(id): Path<i32>| async move {
                    let mut rental = rental_json(id);
                    rental["return_date"] = json!("2024-01-20T09:00:00Z");
                    Json(rental)
                }),
            )
            .with_state(remote);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Url::parse(&format!("http://{addr}")).unwrap()
    }

    fn config(api_base_url: Url) -> WebConfig {
        WebConfig {
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            base_url: "http://localhost:8000".to_string(),
            api: ApiConfig {
                base_url: api_base_url,
                timeout: None,
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
        }
    }

    /// The full page router in front of a fresh fake remote.
    pub async fn app_with_customers(count: i32) -> (Router, Remote) {
        let remote = Remote::default();
        let url = fake_remote(remote.clone(), count).await;
        let config = config(url);
        let state = AppState::new(config.clone()).unwrap();

        let app = super::routes()
            .layer(create_session_layer(&config))
            .with_state(state);

        (app, remote)
    }

    pub async fn app() -> (Router, Remote) {
        app_with_customers(3).await
    }

    /// A remote that is not listening.
    pub fn app_with_dead_remote() -> Router {
        let config = config(Url::parse("http://127.0.0.1:9").unwrap());
        let state = AppState::new(config.clone()).unwrap();
        super::routes()
            .layer(create_session_layer(&config))
            .with_state(state)
    }

    pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    pub fn post_form(uri: &str, body: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    /// Send a request; returns the response and the session cookie it set.
    pub async fn send(app: &Router, request: Request<Body>) -> (Response, Option<String>) {
        let response = app.clone().oneshot(request).await.unwrap();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(String::from);
        (response, cookie)
    }

    pub fn location(response: &Response) -> Option<&str> {
        response
            .headers()
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }

    pub async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    /// Log in as `mike` and return the session cookie.
    pub async fn login(app: &Router) -> String {
        let (response, cookie) = send(
            app,
            post_form("/login", "username=mike&password=hunter2-hunter2", None),
        )
        .await;
        assert_eq!(location(&response), Some("/"));
        cookie.unwrap()
    }

    /// Follow up with a page render so pending flashes appear in the body.
    pub async fn render(app: &Router, uri: &str, cookie: &str) -> String {
        let (response, _) = send(app, get(uri, Some(cookie))).await;
        assert_eq!(response.status(), StatusCode::OK);
        body_text(response).await
    }
}
