//! Client for the remote Sakila REST API.
//!
//! The remote service owns every customer and rental; this module is the only
//! place that talks to it.
//!
//! - [`ApiClient`] exposes one method per remote action and attaches the
//!   session's bearer token
//! - [`ApiError`] tags failures (unauthorized, not found, conflict, transport,
//!   decode, unexpected status) so handlers branch on variants
//!
//! # Example
//!
//! ```rust,ignore
//! let client = state.api().with_token(token);
//! match client.delete_customer(id).await {
//!     Ok(()) => { /* deleted */ }
//!     Err(ApiError::Conflict { .. }) => { /* customer still has rentals */ }
//!     Err(e) => return Err(e.into()),
//! }
//! ```

mod client;
mod error;

pub use client::{AccessToken, ApiClient};
pub use error::ApiError;
