//! Integration tests for Krishop.
//!
//! These drive a running server over HTTP, so they are `#[ignore]`d by
//! default.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the server (memory storage needs no database)
//! KRISHOP_STORAGE=memory cargo run -p krishop-web
//!
//! # Run integration tests
//! cargo test -p krishop-integration-tests -- --ignored
//! ```
//!
//! `KRISHOP_TEST_URL` overrides the server address
//! (default `http://localhost:5000`).

use reqwest::{Client, Response, redirect};

/// Password used for every test account.
pub const PASSWORD: &str = "integration-pass";

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("KRISHOP_TEST_URL").unwrap_or_else(|_| "http://localhost:5000".to_string())
}

/// A browser-like client: keeps cookies, does not follow redirects.
///
/// # Panics
///
/// Panics if the HTTP client cannot be built.
#[must_use]
#[allow(clippy::expect_used)]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// A username unique to this run (fits the 20 character limit).
#[must_use]
pub fn unique_username() -> String {
    let id: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(12)
        .collect();
    format!("it{id}")
}

/// The `Location` header of a redirect, or empty.
#[must_use]
pub fn location(response: &Response) -> &str {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Register `username` with `<username>@example.com`.
///
/// # Errors
///
/// Returns the transport error if the request fails.
pub async fn register(client: &Client, username: &str) -> reqwest::Result<Response> {
    let email = format!("{username}@example.com");
    client
        .post(format!("{}/register", base_url()))
        .form(&[
            ("username", username),
            ("email", email.as_str()),
            ("password", PASSWORD),
            ("confirm_password", PASSWORD),
        ])
        .send()
        .await
}

/// Log in as `username`.
///
/// # Errors
///
/// Returns the transport error if the request fails.
pub async fn login(client: &Client, username: &str) -> reqwest::Result<Response> {
    let email = format!("{username}@example.com");
    client
        .post(format!("{}/login", base_url()))
        .form(&[("email", email.as_str()), ("password", PASSWORD)])
        .send()
        .await
}
