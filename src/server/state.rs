use axum::extract::FromRef;

use crate::book_store::{BookStore, GuardedBookStore};
use std::sync::Arc;
use std::time::Instant;

use super::ServerConfig;

pub type GuardedStore = Arc<GuardedBookStore>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub start_time: Instant,
    pub book_store: GuardedStore,
    /// Read once at startup, the backend never changes afterwards.
    pub backend_name: &'static str,
    pub hash: String,
}

impl ServerState {
    pub fn new(config: ServerConfig, book_store: GuardedStore) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            backend_name: book_store.backend_name(),
            book_store,
            hash: env!("GIT_HASH").to_owned(),
        }
    }
}

impl FromRef<ServerState> for GuardedStore {
    fn from_ref(input: &ServerState) -> Self {
        input.book_store.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
