//! SQLite schema definitions for the books database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema, DEFAULT_TIMESTAMP};

pub const BOOKS_TABLE_NAME: &str = "books";

// =============================================================================
// Version 1 - Books table
// =============================================================================

/// Genres are stored as a JSON array of strings.
const BOOKS_TABLE_V1: Table = Table {
    name: BOOKS_TABLE_NAME,
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true, non_null = true),
        sqlite_column!("title", &SqlType::Text, non_null = true),
        sqlite_column!("genres", &SqlType::Text, non_null = true),
        sqlite_column!("pages", &SqlType::Integer, non_null = true),
        sqlite_column!("price", &SqlType::Real, non_null = true),
        sqlite_column!(
            "created",
            &SqlType::Integer,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
};

pub const BOOKS_VERSIONED_SCHEMAS: &[VersionedSchema] = &[VersionedSchema {
    version: 1,
    tables: &[BOOKS_TABLE_V1],
}];
