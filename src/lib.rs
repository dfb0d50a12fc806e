//! Book Server Library
//!
//! HTTP CRUD service over a collection of books, persisted either to a
//! JSON file or to a SQLite table. The binary in `main.rs` wires these
//! modules together, the e2e tests drive them directly.

pub mod book;
pub mod book_store;
pub mod config;
pub mod server;
pub mod sqlite_persistence;

pub use book::{Book, BookDraft};
pub use book_store::{BookStore, BookStoreError, GuardedBookStore, StorageBackend};
pub use server::{run_server, RequestsLoggingLevel};
