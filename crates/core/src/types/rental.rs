//! Rental resource as exchanged with the remote Sakila API.

use serde::{Deserialize, Serialize};

use super::{CustomerId, InventoryId, RentalId, StaffId};

/// A rental record owned by the remote API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rental {
    pub rental_id: RentalId,
    pub rental_date: String,
    pub inventory_id: InventoryId,
    pub customer_id: CustomerId,
    #[serde(default)]
    pub return_date: Option<String>,
    pub staff_id: StaffId,
    #[serde(default)]
    pub last_update: Option<String>,
}

impl Rental {
    /// Whether the item has been brought back.
    #[must_use]
    pub const fn is_returned(&self) -> bool {
        self.return_date.is_some()
    }
}

/// Payload for opening a rental.
///
/// `rental_date` is an ISO-8601 timestamp chosen by the frontend at the time
/// the form is submitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRental {
    pub rental_date: String,
    pub inventory_id: InventoryId,
    pub customer_id: CustomerId,
    pub staff_id: StaffId,
}
