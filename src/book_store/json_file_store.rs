//! Book store persisted as a single JSON array on disk.
//!
//! Every operation loads the whole file, works on the in-memory copy and,
//! for mutations, writes the whole collection back. Nothing is cached
//! between calls. The store does no locking of its own, concurrent writers
//! must go through a [`super::GuardedBookStore`].

use super::trait_def::{BookStore, BookStoreError, BookStoreResult};
use crate::book::{find_position, generate_book_id, Book, BookDraft};
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const INDENT: &[u8] = b"    ";

pub struct JsonFileBookStore {
    file_path: PathBuf,
}

impl JsonFileBookStore {
    /// Opens the store at `file_path`, creating an empty collection if the
    /// file does not exist yet.
    pub fn open<P: AsRef<Path>>(file_path: P) -> Result<Self> {
        let file_path = file_path.as_ref().to_path_buf();

        if file_path.exists() {
            let books = read_books(&file_path)
                .with_context(|| format!("Failed to read books file {:?}", file_path))?;
            info!(
                "Opened books file at {:?} with {} books",
                file_path,
                books.len()
            );
        } else {
            if let Some(parent) = non_empty_parent(&file_path) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory {:?}", parent))?;
            }
            info!("Creating new books file at {:?}", file_path);
            write_books(&file_path, &[])
                .with_context(|| format!("Failed to create books file {:?}", file_path))?;
        }

        Ok(JsonFileBookStore { file_path })
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn load(&self) -> BookStoreResult<Vec<Book>> {
        read_books(&self.file_path)
    }

    fn save(&self, books: &[Book]) -> BookStoreResult<()> {
        write_books(&self.file_path, books)
    }
}

fn non_empty_parent(path: &Path) -> Option<&Path> {
    path.parent().filter(|p| !p.as_os_str().is_empty())
}

fn read_books(path: &Path) -> BookStoreResult<Vec<Book>> {
    let content = std::fs::read(path)?;
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_slice(&content)?)
}

fn to_indented_json(books: &[Book]) -> serde_json::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(INDENT);
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    books.serialize(&mut serializer)?;
    Ok(bytes)
}

/// Writes the collection next to `path` and renames it over the target, so
/// a failed write never leaves a truncated file behind.
fn write_books(path: &Path, books: &[Book]) -> BookStoreResult<()> {
    let bytes = to_indented_json(books)?;

    let dir = non_empty_parent(path).unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".books-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    tmp.write_all(&bytes)?;
    if let Ok(metadata) = std::fs::metadata(path) {
        tmp.as_file().set_permissions(metadata.permissions())?;
    }
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

impl BookStore for JsonFileBookStore {
    fn list(&self) -> BookStoreResult<Vec<Book>> {
        self.load()
    }

    fn get(&self, id: &str) -> BookStoreResult<Book> {
        let mut books = self.load()?;
        match find_position(&books, id) {
            Some(position) => Ok(books.swap_remove(position)),
            None => Err(BookStoreError::NotFound(id.to_owned())),
        }
    }

    fn add(&self, draft: BookDraft) -> BookStoreResult<Book> {
        draft.validate()?;
        let mut books = self.load()?;

        let mut id = generate_book_id();
        while find_position(&books, &id).is_some() {
            id = generate_book_id();
        }

        let book = Book::from_draft(id, draft);
        books.push(book.clone());
        self.save(&books)?;
        debug!("Added book {} ({} books in file)", book.id, books.len());
        Ok(book)
    }

    fn delete(&self, id: &str) -> BookStoreResult<()> {
        let mut books = self.load()?;
        let position =
            find_position(&books, id).ok_or_else(|| BookStoreError::NotFound(id.to_owned()))?;
        books.remove(position);
        self.save(&books)?;
        debug!("Deleted book {} ({} books in file)", id, books.len());
        Ok(())
    }

    fn edit(&self, id: &str, draft: BookDraft) -> BookStoreResult<Book> {
        draft.validate()?;
        let mut books = self.load()?;
        let position =
            find_position(&books, id).ok_or_else(|| BookStoreError::NotFound(id.to_owned()))?;
        books[position].replace_with(draft);
        self.save(&books)?;
        debug!("Edited book {}", id);
        Ok(books[position].clone())
    }

    fn backend_name(&self) -> &'static str {
        "json"
    }
}
