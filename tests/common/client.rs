//! HTTP client for end-to-end tests
//!
//! Wraps reqwest with one method per book endpoint. When routes or request
//! formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn home(&self) -> Response {
        self.client
            .get(self.url("/"))
            .send()
            .await
            .expect("Home request failed")
    }

    pub async fn list_books(&self) -> Response {
        self.client
            .get(self.url("/books"))
            .send()
            .await
            .expect("List books request failed")
    }

    pub async fn get_book(&self, id: &str) -> Response {
        self.client
            .get(self.url(&format!("/books/{}", id)))
            .send()
            .await
            .expect("Get book request failed")
    }

    pub async fn add_book(&self, book: &Value) -> Response {
        self.client
            .post(self.url("/books"))
            .json(book)
            .send()
            .await
            .expect("Add book request failed")
    }

    pub async fn edit_book(&self, id: &str, book: &Value) -> Response {
        self.client
            .put(self.url(&format!("/books/{}", id)))
            .json(book)
            .send()
            .await
            .expect("Edit book request failed")
    }

    pub async fn delete_book(&self, id: &str) -> Response {
        self.client
            .delete(self.url(&format!("/books/{}", id)))
            .send()
            .await
            .expect("Delete book request failed")
    }

    /// Sends `body` verbatim as JSON, for malformed-payload tests
    pub async fn add_book_raw(&self, body: &'static str) -> Response {
        self.client
            .post(self.url("/books"))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .expect("Add book request failed")
    }

    /// Adds the Dune test book and returns the stored record
    pub async fn add_dune(&self) -> Value {
        let response = self
            .add_book(&json!({
                "title": DUNE_TITLE,
                "pages": DUNE_PAGES,
                "price": DUNE_PRICE,
            }))
            .await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Invalid book JSON")
    }
}
