//! HTTP client for the remote Sakila REST API.

use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use sakila_core::{Customer, CustomerId, NewCustomer, NewRental, Rental, RentalId};

use super::error::ApiError;

/// Bearer token issued by `POST /api/v1/auth/token`.
pub struct AccessToken {
    pub access_token: SecretString,
    pub token_type: Option<String>,
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .finish()
    }
}

#[derive(serde::Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
}

/// Client for the remote Sakila API.
///
/// Cheap to clone: the underlying `reqwest::Client` is a pooled handle. The
/// application keeps one anonymous client in its state and derives a
/// token-carrying copy per request with [`ApiClient::with_token`].
#[derive(Clone)]
pub struct ApiClient {
    /// HTTP client.
    client: Client,
    /// Base URL of the remote API, without trailing slash.
    base_url: String,
    /// Bearer token for authenticated calls.
    token: Option<SecretString>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create an anonymous client for the API rooted at `base_url`.
    ///
    /// `timeout` bounds each whole request; `None` keeps the transport
    /// default.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(base_url: &Url, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Copy of this client that authenticates as the given token.
    #[must_use]
    pub fn with_token(&self, token: SecretString) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    /// Whether calls carry a bearer token.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Base URL the client talks to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =========================================================================
    // Auth
    // =========================================================================

    /// Register a new API user.
    ///
    /// Returns the remote's JSON object as-is; its shape is not relied on.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the remote rejects the user.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<serde_json::Map<String, serde_json::Value>, ApiError> {
        #[derive(Serialize)]
        struct RegisterRequest<'a> {
            username: &'a str,
            email: &'a str,
            password: &'a str,
        }

        let body = RegisterRequest {
            username,
            email,
            password: password.expose_secret(),
        };

        Self::send(self.request(Method::POST, "/api/v1/auth/register").json(&body)).await
    }

    /// Exchange username and password for a bearer token.
    ///
    /// Credentials are sent form-encoded (OAuth2 password flow).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] for bad credentials, or another
    /// variant if the request fails.
    #[instrument(skip(self, password), fields(username = %username))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<AccessToken, ApiError> {
        let form = [
            ("username", username),
            ("password", password.expose_secret()),
        ];

        let token: TokenResponse =
            Self::send(self.client.post(self.url("/api/v1/auth/token")).form(&form)).await?;

        Ok(AccessToken {
            access_token: SecretString::from(token.access_token),
            token_type: token.token_type,
        })
    }

    // =========================================================================
    // Customers
    // =========================================================================

    /// List all customers.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<Customer>, ApiError> {
        Self::send(self.request(Method::GET, "/api/v1/customers")).await
    }

    /// Fetch one customer.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the customer does not exist.
    #[instrument(skip(self))]
    pub async fn get_customer(&self, id: CustomerId) -> Result<Customer, ApiError> {
        Self::send(self.request(Method::GET, &format!("/api/v1/customers/{id}"))).await
    }

    /// Create a customer.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the remote rejects the payload.
    #[instrument(skip(self, customer))]
    pub async fn create_customer(&self, customer: &NewCustomer) -> Result<Customer, ApiError> {
        Self::send(self.request(Method::POST, "/api/v1/customers").json(customer)).await
    }

    /// Replace a customer's fields.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the remote rejects the payload.
    #[instrument(skip(self, customer))]
    pub async fn update_customer(
        &self,
        id: CustomerId,
        customer: &NewCustomer,
    ) -> Result<Customer, ApiError> {
        Self::send(
            self.request(Method::PUT, &format!("/api/v1/customers/{id}"))
                .json(customer),
        )
        .await
    }

    /// Delete a customer.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Conflict`] when the customer still has rentals.
    #[instrument(skip(self))]
    pub async fn delete_customer(&self, id: CustomerId) -> Result<(), ApiError> {
        Self::send_discarding(self.request(Method::DELETE, &format!("/api/v1/customers/{id}")))
            .await
    }

    // =========================================================================
    // Rentals
    // =========================================================================

    /// List all rentals.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_rentals(&self) -> Result<Vec<Rental>, ApiError> {
        Self::send(self.request(Method::GET, "/api/v1/rentals")).await
    }

    /// Fetch one rental.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the rental does not exist.
    #[instrument(skip(self))]
    pub async fn get_rental(&self, id: RentalId) -> Result<Rental, ApiError> {
        Self::send(self.request(Method::GET, &format!("/api/v1/rentals/{id}"))).await
    }

    /// Open a rental.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the remote rejects the payload
    /// (e.g. the item is already rented out).
    #[instrument(skip(self, rental))]
    pub async fn create_rental(&self, rental: &NewRental) -> Result<Rental, ApiError> {
        Self::send(self.request(Method::POST, "/api/v1/rentals").json(rental)).await
    }

    /// Mark a rental as returned.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn return_rental(&self, id: RentalId) -> Result<Rental, ApiError> {
        Self::send(self.request(Method::PUT, &format!("/api/v1/rentals/{id}/return"))).await
    }

    /// List the rentals of one customer.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails.
    #[instrument(skip(self))]
    pub async fn list_customer_rentals(&self, id: CustomerId) -> Result<Vec<Rental>, ApiError> {
        Self::send(self.request(Method::GET, &format!("/api/v1/rentals/customer/{id}"))).await
    }

    // =========================================================================
    // Plumbing
    // =========================================================================

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Start a request, attaching the bearer token when present.
    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match &self.token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send and decode a JSON body. An empty body decodes as `{}`.
    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
        let bytes = Self::execute(builder).await?;

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return serde_json::from_value(serde_json::Value::Object(serde_json::Map::new()))
                .map_err(|e| ApiError::Decode(e.to_string()));
        }

        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Send and ignore whatever body comes back.
    async fn send_discarding(builder: RequestBuilder) -> Result<(), ApiError> {
        Self::execute(builder).await.map(|_| ())
    }

    async fn execute(builder: RequestBuilder) -> Result<Vec<u8>, ApiError> {
        let response = builder.send().await.map_err(|e| {
            warn!(error = %e, "Sakila API request failed");
            ApiError::Transport(e)
        })?;

        let status = response.status();
        let url = response.url().path().to_string();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = ApiError::from_status(status, &body);
            warn!(status = status.as_u16(), path = %url, error = %err, "Sakila API error response");
            return Err(err);
        }

        debug!(status = status.as_u16(), path = %url, "Sakila API response");

        Ok(response.bytes().await?.to_vec())
    }
}
