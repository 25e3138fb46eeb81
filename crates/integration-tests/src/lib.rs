//! End-to-end tests for the Sakila rental desk.
//!
//! These drive a running `sakila-web` server (which in turn talks to a real
//! Sakila API) over HTTP, the way a browser would.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the API and the frontend, then:
//! SAKILA_TEST_USERNAME=staff SAKILA_TEST_PASSWORD=... \
//!     cargo test -p sakila-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `SAKILA_WEB_BASE_URL` - frontend under test (default: <http://localhost:8000>)
//! - `SAKILA_TEST_USERNAME` / `SAKILA_TEST_PASSWORD` - an existing API user

use std::str::FromStr;

use reqwest::{Client, Response, header::LOCATION, redirect::Policy};

/// Base URL of the frontend under test.
#[must_use]
pub fn web_base_url() -> String {
    std::env::var("SAKILA_WEB_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:8000".to_string())
        .trim_end_matches('/')
        .to_string()
}

/// Credentials of an API user that already exists.
#[derive(Debug, Clone)]
pub struct TestUser {
    pub username: String,
    pub password: String,
}

impl TestUser {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            username: std::env::var("SAKILA_TEST_USERNAME").unwrap_or_else(|_| "staff".to_string()),
            password: std::env::var("SAKILA_TEST_PASSWORD")
                .unwrap_or_else(|_| "staff-password".to_string()),
        }
    }
}

/// A browser-like client: keeps cookies, does not follow redirects so tests
/// can assert on them.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built.
pub fn browser() -> reqwest::Result<Client> {
    Client::builder()
        .cookie_store(true)
        .redirect(Policy::none())
        .build()
}

/// Log `user` in on `client`.
///
/// # Errors
///
/// Returns an error if the request fails.
pub async fn login(client: &Client, user: &TestUser) -> reqwest::Result<Response> {
    client
        .post(format!("{}/login", web_base_url()))
        .form(&[
            ("username", user.username.as_str()),
            ("password", user.password.as_str()),
        ])
        .send()
        .await
}

/// The `Location` header of a redirect.
#[must_use]
pub fn location(response: &Response) -> Option<&str> {
    response.headers().get(LOCATION).and_then(|v| v.to_str().ok())
}

/// Find the ID in the first `href="{prefix}/{id}">{label}` link of a page.
#[must_use]
pub fn find_link_id<T: FromStr>(body: &str, prefix: &str, label: &str) -> Option<T> {
    let tail = format!("\">{label}");
    body.match_indices(&tail).find_map(|(end, _)| {
        let before = body.get(..end)?;
        let start = before.rfind(&format!("href=\"{prefix}/"))? + prefix.len() + 7;
        before.get(start..)?.parse().ok()
    })
}
