//! HTML form input and validation.
//!
//! Form structs hold the raw submitted strings so invalid input can be echoed
//! back into the page. `validate()` turns them into the typed values the API
//! client expects, or into [`FormErrors`] shown inline next to each field.

use secrecy::SecretString;
use serde::Deserialize;

use sakila_core::{
    AddressId, Customer, CustomerId, Email, InventoryId, NewCustomer, NewRental, StaffId,
    StoreId,
};

/// Longest username the remote accepts.
pub const USERNAME_MAX_LENGTH: usize = 50;

/// Shortest password accepted at registration.
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Longest password accepted at registration (bcrypt input limit).
pub const PASSWORD_MAX_LENGTH: usize = 72;

/// Longest first or last name (`VARCHAR(45)` in the Sakila schema).
pub const NAME_MAX_LENGTH: usize = 45;

pub const MSG_REQUIRED: &str = "Este campo es obligatorio.";
pub const MSG_INTEGER: &str = "Introduzca un número entero.";
pub const MSG_EMAIL: &str = "Introduzca una dirección de correo electrónico válida.";
pub const MSG_PASSWORD_MISMATCH: &str = "Las contraseñas no coinciden";

/// Validation errors for one form submission.
#[derive(Debug, Clone, Default)]
pub struct FormErrors {
    fields: Vec<(&'static str, String)>,
    non_field: Vec<String>,
}

impl FormErrors {
    /// Record an error against a field.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.push((field, message.into()));
    }

    /// Record an error about the form as a whole.
    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    /// Errors for one field, in the order they were found.
    #[must_use]
    pub fn field(&self, name: &str) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|(field, _)| *field == name)
            .map(|(_, message)| message.as_str())
            .collect()
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| *field == name)
    }

    #[must_use]
    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    fn finish<T>(self, value: impl FnOnce() -> Option<T>) -> Result<T, Self> {
        if !self.is_empty() {
            return Err(self);
        }
        value().ok_or(self)
    }
}

// =============================================================================
// Field validators
// =============================================================================

fn max_length_message(max: usize, got: usize) -> String {
    format!("Asegúrese de que este valor tenga como máximo {max} caracteres (tiene {got}).")
}

fn min_length_message(min: usize, got: usize) -> String {
    format!("Asegúrese de que este valor tenga al menos {min} caracteres (tiene {got}).")
}

/// Required text, trimmed, at most `max` characters.
fn required_text(
    errors: &mut FormErrors,
    field: &'static str,
    raw: &str,
    max: usize,
) -> Option<String> {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, MSG_REQUIRED);
        return None;
    }

    let len = value.chars().count();
    if len > max {
        errors.add(field, max_length_message(max, len));
        return None;
    }

    Some(value.to_string())
}

/// Required integer, at least 1.
fn positive_int(errors: &mut FormErrors, field: &'static str, raw: &str) -> Option<i32> {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, MSG_REQUIRED);
        return None;
    }

    let Ok(n) = value.parse::<i32>() else {
        errors.add(field, MSG_INTEGER);
        return None;
    };

    if n < 1 {
        errors.add(
            field,
            "Asegúrese de que este valor es mayor o igual a 1.",
        );
        return None;
    }

    Some(n)
}

/// Required email.
fn required_email(errors: &mut FormErrors, field: &'static str, raw: &str) -> Option<Email> {
    let value = raw.trim();
    if value.is_empty() {
        errors.add(field, MSG_REQUIRED);
        return None;
    }
    optional_email(errors, field, value).flatten()
}

/// Optional email; blank is `Some(None)`, invalid is `None`.
fn optional_email(
    errors: &mut FormErrors,
    field: &'static str,
    raw: &str,
) -> Option<Option<Email>> {
    let value = raw.trim();
    if value.is_empty() {
        return Some(None);
    }

    match Email::parse(value) {
        Ok(email) => Some(Some(email)),
        Err(_) => {
            errors.add(field, MSG_EMAIL);
            None
        }
    }
}

// =============================================================================
// Login
// =============================================================================

/// Login form input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Credentials ready to send to the token endpoint.
#[derive(Debug)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl LoginForm {
    /// Validate the login form.
    ///
    /// # Errors
    ///
    /// Returns the per-field errors when a field is missing or too long.
    pub fn validate(&self) -> Result<Credentials, FormErrors> {
        let mut errors = FormErrors::default();

        let username = required_text(&mut errors, "username", &self.username, USERNAME_MAX_LENGTH);
        if self.password.is_empty() {
            errors.add("password", MSG_REQUIRED);
        }

        errors.finish(|| {
            Some(Credentials {
                username: username?,
                password: SecretString::from(self.password.clone()),
            })
        })
    }
}

// =============================================================================
// Registration
// =============================================================================

/// Registration form input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// A validated registration.
#[derive(Debug)]
pub struct Registration {
    pub username: String,
    pub email: Email,
    pub password: SecretString,
}

impl RegisterForm {
    /// Validate the registration form.
    ///
    /// The password must be 8 to 72 characters and match its confirmation.
    /// The mismatch check only runs once both password fields passed their
    /// own checks.
    ///
    /// # Errors
    ///
    /// Returns per-field errors, plus a form-level error on mismatch.
    pub fn validate(&self) -> Result<Registration, FormErrors> {
        let mut errors = FormErrors::default();

        let username = required_text(&mut errors, "username", &self.username, USERNAME_MAX_LENGTH);
        let email = required_email(&mut errors, "email", &self.email);

        let password_len = self.password.chars().count();
        let password_ok = if self.password.is_empty() {
            errors.add("password", MSG_REQUIRED);
            false
        } else if password_len < PASSWORD_MIN_LENGTH {
            errors.add("password", min_length_message(PASSWORD_MIN_LENGTH, password_len));
            false
        } else if password_len > PASSWORD_MAX_LENGTH {
            errors.add("password", max_length_message(PASSWORD_MAX_LENGTH, password_len));
            false
        } else {
            true
        };

        if self.password_confirm.is_empty() {
            errors.add("password_confirm", MSG_REQUIRED);
        } else if password_ok && self.password != self.password_confirm {
            errors.add_non_field(MSG_PASSWORD_MISMATCH);
        }

        errors.finish(|| {
            Some(Registration {
                username: username?,
                email: email?,
                password: SecretString::from(self.password.clone()),
            })
        })
    }
}

// =============================================================================
// Customer
// =============================================================================

/// Customer create/edit form input.
///
/// `active` is a checkbox: browsers omit it entirely when unchecked.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CustomerForm {
    pub store_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub address_id: String,
    pub active: Option<String>,
}

impl CustomerForm {
    /// Blank form for a new customer; new customers start active.
    #[must_use]
    pub fn initial() -> Self {
        Self {
            active: Some("on".to_string()),
            ..Self::default()
        }
    }

    /// Form prefilled from an existing customer.
    #[must_use]
    pub fn from_customer(customer: &Customer) -> Self {
        Self {
            store_id: customer.store_id.to_string(),
            first_name: customer.first_name.clone(),
            last_name: customer.last_name.clone(),
            email: customer.email.clone().unwrap_or_default(),
            address_id: customer.address_id.to_string(),
            active: customer.active.then(|| "on".to_string()),
        }
    }

    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Validate into the payload sent to the remote.
    ///
    /// # Errors
    ///
    /// Returns per-field errors for missing, malformed or out-of-range values.
    pub fn validate(&self) -> Result<NewCustomer, FormErrors> {
        let mut errors = FormErrors::default();

        let store_id = positive_int(&mut errors, "store_id", &self.store_id);
        let first_name = required_text(&mut errors, "first_name", &self.first_name, NAME_MAX_LENGTH);
        let last_name = required_text(&mut errors, "last_name", &self.last_name, NAME_MAX_LENGTH);
        let email = optional_email(&mut errors, "email", &self.email);
        let address_id = positive_int(&mut errors, "address_id", &self.address_id);

        errors.finish(|| {
            Some(NewCustomer {
                store_id: StoreId::new(store_id?),
                first_name: first_name?,
                last_name: last_name?,
                email: email?,
                address_id: AddressId::new(address_id?),
                active: self.is_active(),
            })
        })
    }
}

// =============================================================================
// Rental
// =============================================================================

/// Rental create form input.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RentalForm {
    pub inventory_id: String,
    pub customer_id: String,
    pub staff_id: String,
}

impl RentalForm {
    /// Validate into a rental starting at `rental_date`.
    ///
    /// # Errors
    ///
    /// Returns per-field errors for missing, malformed or out-of-range IDs.
    pub fn validate(&self, rental_date: String) -> Result<NewRental, FormErrors> {
        let mut errors = FormErrors::default();

        let inventory_id = positive_int(&mut errors, "inventory_id", &self.inventory_id);
        let customer_id = positive_int(&mut errors, "customer_id", &self.customer_id);
        let staff_id = positive_int(&mut errors, "staff_id", &self.staff_id);

        errors.finish(|| {
            Some(NewRental {
                rental_date,
                inventory_id: InventoryId::new(inventory_id?),
                customer_id: CustomerId::new(customer_id?),
                staff_id: StaffId::new(staff_id?),
            })
        })
    }
}
