//! Customer resource as exchanged with the remote Sakila API.

use serde::{Deserialize, Deserializer, Serialize};

use super::{AddressId, CustomerId, Email, StoreId};

/// A customer record owned by the remote API.
///
/// Timestamps are kept as the raw strings the API sends; the frontend only
/// reformats them for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: CustomerId,
    pub store_id: StoreId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub address_id: AddressId,
    #[serde(deserialize_with = "bool_or_int")]
    pub active: bool,
    #[serde(default)]
    pub create_date: Option<String>,
    #[serde(default)]
    pub last_update: Option<String>,
}

impl Customer {
    /// First and last name joined for display.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Payload for creating or replacing a customer.
///
/// A blank email is sent as `null`, never as an empty string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCustomer {
    pub store_id: StoreId,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<Email>,
    pub address_id: AddressId,
    pub active: bool,
}

/// The Sakila schema stores `active` as a tinyint; accept `true`/`false`
/// as well as `1`/`0`.
fn bool_or_int<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(n) => n != 0,
    })
}
