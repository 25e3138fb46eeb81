//! Integration tests for customer and rental management.
//!
//! These tests require:
//! - The Sakila API running with the sample data loaded
//! - The frontend running (cargo run -p sakila-web)
//! - An existing API user in `SAKILA_TEST_USERNAME` / `SAKILA_TEST_PASSWORD`
//!
//! Run with: cargo test -p sakila-integration-tests -- --ignored

use reqwest::{Client, StatusCode};
use uuid::Uuid;

use sakila_core::{CustomerId, RentalId};
use sakila_integration_tests::{TestUser, browser, find_link_id, location, login, web_base_url};

/// A client holding a logged-in session.
async fn authenticated_client() -> Client {
    let client = browser().expect("Failed to create HTTP client");
    let resp = login(&client, &TestUser::from_env())
        .await
        .expect("Failed to log in");
    assert!(resp.status().is_redirection(), "login was rejected");
    client
}

async fn page(client: &Client, path: &str) -> String {
    let resp = client
        .get(format!("{}{path}", web_base_url()))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(resp.status(), StatusCode::OK, "GET {path}");
    resp.text().await.expect("Failed to read body")
}

// ============================================================================
// Customers
// ============================================================================

#[tokio::test]
#[ignore = "Requires running sakila-web and Sakila API"]
async fn test_customer_list_paginates() {
    let client = authenticated_client().await;

    let body = page(&client, "/customers").await;
    assert!(body.contains("Página 1 de"));
    assert!(body.contains("?page=2"));
}

#[tokio::test]
#[ignore = "Requires running sakila-web and Sakila API"]
async fn test_customer_lifecycle() {
    let client = authenticated_client().await;
    let base_url = web_base_url();
    let last_name = format!("IT{}", Uuid::new_v4().simple());

    // Create
    let resp = client
        .post(format!("{base_url}/customers/new"))
        .form(&[
            ("store_id", "1"),
            ("first_name", "Test"),
            ("last_name", last_name.as_str()),
            ("email", "integration@example.com"),
            ("address_id", "5"),
            ("active", "on"),
        ])
        .send()
        .await
        .expect("Failed to create customer");
    assert_eq!(location(&resp), Some("/customers"));

    // New customers land on the last page.
    let body = page(&client, "/customers?page=9999").await;
    let label = format!("Test {last_name}");
    let id: CustomerId =
        find_link_id(&body, "/customers", &label).expect("Created customer not listed");

    // Update
    let resp = client
        .post(format!("{base_url}/customers/{id}/edit"))
        .form(&[
            ("store_id", "1"),
            ("first_name", "Renamed"),
            ("last_name", last_name.as_str()),
            ("email", "integration@example.com"),
            ("address_id", "5"),
        ])
        .send()
        .await
        .expect("Failed to update customer");
    assert_eq!(location(&resp), Some(format!("/customers/{id}").as_str()));

    let body = page(&client, &format!("/customers/{id}")).await;
    assert!(body.contains(&format!("Renamed {last_name}")));

    // Delete
    let resp = client
        .post(format!("{base_url}/customers/{id}/delete"))
        .send()
        .await
        .expect("Failed to delete customer");
    assert_eq!(location(&resp), Some("/customers"));

    let resp = client
        .get(format!("{base_url}/customers/{id}"))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(location(&resp), Some("/customers"));
}

#[tokio::test]
#[ignore = "Requires running sakila-web and Sakila API"]
async fn test_customer_form_rejects_bad_email() {
    let client = authenticated_client().await;

    let resp = client
        .post(format!("{}/customers/new", web_base_url()))
        .form(&[
            ("store_id", "1"),
            ("first_name", "Test"),
            ("last_name", "Customer"),
            ("email", "not-an-email"),
            ("address_id", "5"),
        ])
        .send()
        .await
        .expect("Failed to send request");

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.text().await.expect("Failed to read body");
    assert!(body.contains("Introduzca una dirección de correo electrónico válida."));
}

// ============================================================================
// Rentals
// ============================================================================

#[tokio::test]
#[ignore = "Requires running sakila-web and Sakila API"]
async fn test_rental_detail_from_list() {
    let client = authenticated_client().await;

    let body = page(&client, "/rentals").await;
    // Skip "/rentals/new"; the first numeric link is a rental.
    let id: RentalId = body
        .split("href=\"/rentals/")
        .skip(1)
        .find_map(|rest| rest.split('"').next()?.parse().ok())
        .expect("No rentals listed");

    let body = page(&client, &format!("/rentals/{id}")).await;
    assert!(body.contains(&format!("Reserva {id}")));
}
