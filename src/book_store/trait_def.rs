//! BookStore trait definition.
//!
//! Both persistence backends (a flat JSON file and a SQLite table) implement
//! this trait, the server only ever talks to a `dyn BookStore`.

use crate::book::{Book, BookDraft, InvalidBookDraft};

type BoxedError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum BookStoreError {
    #[error("Book {0} not found")]
    NotFound(String),

    #[error("Invalid book: {0}")]
    InvalidBook(#[from] InvalidBookDraft),

    #[error("Storage unavailable ({context}): {source}")]
    StorageUnavailable {
        context: &'static str,
        #[source]
        source: BoxedError,
    },
}

impl BookStoreError {
    pub fn storage<E: Into<BoxedError>>(context: &'static str, source: E) -> Self {
        BookStoreError::StorageUnavailable {
            context,
            source: source.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BookStoreError::NotFound(_))
    }
}

impl From<std::io::Error> for BookStoreError {
    fn from(err: std::io::Error) -> Self {
        BookStoreError::storage("i/o", err)
    }
}

impl From<serde_json::Error> for BookStoreError {
    fn from(err: serde_json::Error) -> Self {
        BookStoreError::storage("json", err)
    }
}

impl From<rusqlite::Error> for BookStoreError {
    fn from(err: rusqlite::Error) -> Self {
        BookStoreError::storage("sqlite", err)
    }
}

impl From<tempfile::PersistError> for BookStoreError {
    fn from(err: tempfile::PersistError) -> Self {
        BookStoreError::storage("persist", err)
    }
}

pub type BookStoreResult<T> = Result<T, BookStoreError>;

/// Trait for book storage backends.
pub trait BookStore: Send + Sync {
    /// Returns every stored book, in insertion order.
    fn list(&self) -> BookStoreResult<Vec<Book>>;

    /// Returns the book with the given id, or `NotFound`.
    fn get(&self, id: &str) -> BookStoreResult<Book>;

    /// Stores a new book under a freshly generated id and returns it.
    /// Drafts failing [`BookDraft::validate`] are refused with `InvalidBook`.
    fn add(&self, draft: BookDraft) -> BookStoreResult<Book>;

    /// Removes the book with the given id, or returns `NotFound`.
    fn delete(&self, id: &str) -> BookStoreResult<()>;

    /// Replaces every field of the book but its id, or returns `NotFound`.
    /// Invalid drafts are refused with `InvalidBook` before anything is read.
    fn edit(&self, id: &str, draft: BookDraft) -> BookStoreResult<Book>;

    /// Short name of the backend, used in logs and server stats.
    fn backend_name(&self) -> &'static str;
}
