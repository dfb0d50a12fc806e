//! Common test infrastructure
//!
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::{TestServer, TestClient};
//! use book_server::StorageBackend;
//! use reqwest::StatusCode;
//!
//! #[tokio::test]
//! async fn test_list_books() {
//!     let server = TestServer::spawn(StorageBackend::Json).await;
//!     let client = TestClient::new(server.base_url.clone());
//!
//!     let response = client.list_books().await;
//!     assert_eq!(response.status(), StatusCode::OK);
//! }
//! ```

mod client;
mod constants;
mod server;

pub use client::TestClient;
pub use constants::*;
pub use server::TestServer;
