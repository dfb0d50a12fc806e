mod backend;
mod guarded;
mod json_file_store;
mod schema;
mod sqlite_store;
mod trait_def;


pub use backend::StorageBackend;
pub use guarded::GuardedBookStore;
pub use json_file_store::JsonFileBookStore;
pub use schema::BOOKS_VERSIONED_SCHEMAS;
pub use sqlite_store::SqliteBookStore;
pub use trait_def::{BookStore, BookStoreError, BookStoreResult};
