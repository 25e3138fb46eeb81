//! Sakila rental desk.
//!
//! Server-rendered pages for staff to manage customers and rentals stored in
//! the Sakila REST API. This crate holds no data of its own: every page is a
//! call to the remote API, with the bearer token kept in the user's session.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod display;
pub mod error;
pub mod filters;
pub mod flash;
pub mod forms;
pub mod middleware;
pub mod models;
pub mod pagination;
pub mod routes;
pub mod state;
