//! Shared constants for end-to-end tests

// ============================================================================
// Server lifecycle
// ============================================================================

/// How long to wait for a spawned server to answer `GET /`
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Delay between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 20;

/// Timeout applied to every request made by `TestClient`
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

// ============================================================================
// Test books
// ============================================================================

pub const DUNE_TITLE: &str = "Dune";
pub const DUNE_PAGES: u32 = 412;
pub const DUNE_PRICE: f64 = 9.99;

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// An id no test server will ever assign
pub const UNKNOWN_BOOK_ID: &str = "00000000-0000-0000-0000-000000000000";
