//! Sakila Core - Shared types library.
//!
//! Types shared by the rental desk frontend and its tests:
//! - Newtype IDs for every remote resource the frontend touches
//! - Validated [`Email`] addresses
//! - The [`Customer`] and [`Rental`] resources owned by the remote Sakila API,
//!   together with the payloads used to create or update them
//!
//! The core crate contains only types - no I/O, no HTTP clients. Customers and
//! rentals are never persisted locally; these types describe the JSON the
//! remote API exchanges.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
