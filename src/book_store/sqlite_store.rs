use super::schema::{BOOKS_TABLE_NAME, BOOKS_VERSIONED_SCHEMAS};
use super::trait_def::{BookStore, BookStoreError, BookStoreResult};
use crate::book::{generate_book_id, Book, BookDraft};
use crate::sqlite_persistence::read_schema_version;
use anyhow::{bail, Context, Result};
use rusqlite::{ffi, params, types::Type, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};

/// Book store backed by a single SQLite table.
///
/// Every operation is one statement, there are no transactions spanning
/// several of them. Writers are serialized by the outer
/// [`super::GuardedBookStore`], not by this type.
pub struct SqliteBookStore {
    conn: Mutex<Connection>,
}

impl SqliteBookStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let is_new_db = !path.exists();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let conn = Connection::open(path).context("Failed to open books database")?;

        let latest_schema = BOOKS_VERSIONED_SCHEMAS
            .last()
            .context("No books schema defined")?;

        if is_new_db {
            info!("Creating new books database at {:?}", path);
            latest_schema.create(&conn)?;
        } else {
            let db_version = read_schema_version(&conn)?;
            let schema = BOOKS_VERSIONED_SCHEMAS
                .iter()
                .find(|s| s.version == db_version)
                .with_context(|| format!("Unknown books database version {}", db_version))?;
            schema.validate(&conn).with_context(|| {
                format!(
                    "Books database schema validation failed for version {}",
                    db_version
                )
            })?;
            if db_version != latest_schema.version {
                bail!(
                    "Books database version {} is not supported, expected {}",
                    db_version,
                    latest_schema.version
                );
            }
            info!("Opened books database at {:?}", path);
        }

        Ok(SqliteBookStore {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn row_to_book(row: &rusqlite::Row) -> rusqlite::Result<Book> {
        let genres_json: String = row.get(2)?;
        let genres = serde_json::from_str(&genres_json).map_err(|err| {
            rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(err))
        })?;
        Ok(Book {
            id: row.get(0)?,
            title: row.get(1)?,
            genres,
            pages: row.get(3)?,
            price: row.get(4)?,
        })
    }
}

// Only an id collision is worth retrying, other constraint failures would
// repeat forever.
fn is_primary_key_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
    )
}

impl BookStore for SqliteBookStore {
    fn list(&self) -> BookStoreResult<Vec<Book>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT id, title, genres, pages, price FROM {} ORDER BY rowid",
            BOOKS_TABLE_NAME
        ))?;
        let books = stmt
            .query_map([], Self::row_to_book)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(books)
    }

    fn get(&self, id: &str) -> BookStoreResult<Book> {
        self.conn()
            .query_row(
                &format!(
                    "SELECT id, title, genres, pages, price FROM {} WHERE id = ?1",
                    BOOKS_TABLE_NAME
                ),
                params![id],
                Self::row_to_book,
            )
            .optional()?
            .ok_or_else(|| BookStoreError::NotFound(id.to_owned()))
    }

    fn add(&self, draft: BookDraft) -> BookStoreResult<Book> {
        draft.validate()?;
        let genres_json = serde_json::to_string(&draft.genres)?;
        let conn = self.conn();
        loop {
            let id = generate_book_id();
            let inserted = conn.execute(
                &format!(
                    "INSERT INTO {} (id, title, genres, pages, price) VALUES (?1, ?2, ?3, ?4, ?5)",
                    BOOKS_TABLE_NAME
                ),
                params![id, draft.title, genres_json, draft.pages, draft.price],
            );
            match inserted {
                Ok(_) => {
                    debug!("Added book {}", id);
                    return Ok(Book::from_draft(id, draft));
                }
                Err(err) if is_primary_key_violation(&err) => {
                    debug!("Generated book id {} already taken, retrying", id);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    fn delete(&self, id: &str) -> BookStoreResult<()> {
        let deleted = self.conn().execute(
            &format!("DELETE FROM {} WHERE id = ?1", BOOKS_TABLE_NAME),
            params![id],
        )?;
        if deleted == 0 {
            return Err(BookStoreError::NotFound(id.to_owned()));
        }
        debug!("Deleted book {}", id);
        Ok(())
    }

    fn edit(&self, id: &str, draft: BookDraft) -> BookStoreResult<Book> {
        draft.validate()?;
        let genres_json = serde_json::to_string(&draft.genres)?;
        let updated = self.conn().execute(
            &format!(
                "UPDATE {} SET title = ?1, genres = ?2, pages = ?3, price = ?4 WHERE id = ?5",
                BOOKS_TABLE_NAME
            ),
            params![draft.title, genres_json, draft.pages, draft.price, id],
        )?;
        if updated == 0 {
            return Err(BookStoreError::NotFound(id.to_owned()));
        }
        debug!("Edited book {}", id);
        Ok(Book::from_draft(id.to_owned(), draft))
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
