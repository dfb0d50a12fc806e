use super::trait_def::{BookStore, BookStoreResult};
use crate::book::{Book, BookDraft};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Wraps a backend in a single shared/exclusive lock.
///
/// Reads (`list`, `get`) share the lock, mutations (`add`, `delete`,
/// `edit`) hold it exclusively for their whole read-mutate-persist
/// sequence. This is the only thing that makes the JSON file backend safe
/// against lost updates, and the only thing that orders writers on the
/// SQLite backend. It does nothing across processes.
pub struct GuardedBookStore {
    inner: RwLock<Box<dyn BookStore>>,
}

impl GuardedBookStore {
    pub fn new(store: Box<dyn BookStore>) -> Self {
        GuardedBookStore {
            inner: RwLock::new(store),
        }
    }

    // The backing medium is the source of truth, a panic while holding the
    // lock cannot leave the boxed store itself inconsistent.
    fn shared(&self) -> RwLockReadGuard<'_, Box<dyn BookStore>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn exclusive(&self) -> RwLockWriteGuard<'_, Box<dyn BookStore>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl BookStore for GuardedBookStore {
    fn list(&self) -> BookStoreResult<Vec<Book>> {
        self.shared().list()
    }

    fn get(&self, id: &str) -> BookStoreResult<Book> {
        self.shared().get(id)
    }

    fn add(&self, draft: BookDraft) -> BookStoreResult<Book> {
        self.exclusive().add(draft)
    }

    fn delete(&self, id: &str) -> BookStoreResult<()> {
        self.exclusive().delete(id)
    }

    fn edit(&self, id: &str, draft: BookDraft) -> BookStoreResult<Book> {
        self.exclusive().edit(id, draft)
    }

    fn backend_name(&self) -> &'static str {
        self.shared().backend_name()
    }
}
