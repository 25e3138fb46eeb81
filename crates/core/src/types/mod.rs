//! Core types for the Sakila rental desk.

pub mod customer;
pub mod email;
pub mod id;
pub mod rental;

pub use customer::{Customer, NewCustomer};
pub use email::{Email, EmailError};
pub use id::*;
pub use rental::{NewRental, Rental};
