use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Anything that can be located in a collection by its identifier.
pub trait HasId {
    fn id(&self) -> &str;
}

/// Returns the position of the item with the given id, if any.
pub fn find_position<T: HasId>(items: &[T], id: &str) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}

/// Generates a new random (v4) book identifier.
pub fn generate_book_id() -> String {
    Uuid::new_v4().to_string()
}

fn is_zero_pages(pages: &u32) -> bool {
    *pages == 0
}

fn is_zero_price(price: &f64) -> bool {
    *price == 0.0
}

/// A book as stored and served.
///
/// Field declaration order is the serialization order, empty fields are
/// left out of the JSON form.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct Book {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "is_zero_pages")]
    pub pages: u32,
    #[serde(skip_serializing_if = "is_zero_price")]
    pub price: f64,
}

/// The caller-supplied part of a book, everything but the identifier.
///
/// An `id` key in the incoming JSON is not part of this shape and is
/// silently dropped.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(default)]
pub struct BookDraft {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub title: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<String>,
    #[serde(skip_serializing_if = "is_zero_pages")]
    pub pages: u32,
    #[serde(skip_serializing_if = "is_zero_price")]
    pub price: f64,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum InvalidBookDraft {
    #[error("price must be a finite, non-negative number, got {0}")]
    Price(f64),
}

impl BookDraft {
    pub fn validate(&self) -> Result<(), InvalidBookDraft> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(InvalidBookDraft::Price(self.price));
        }
        Ok(())
    }
}

impl Book {
    pub fn from_draft(id: String, draft: BookDraft) -> Book {
        Book {
            id,
            title: draft.title,
            genres: draft.genres,
            pages: draft.pages,
            price: draft.price,
        }
    }

    /// Overwrites every field but the id.
    pub fn replace_with(&mut self, draft: BookDraft) {
        self.title = draft.title;
        self.genres = draft.genres;
        self.pages = draft.pages;
        self.price = draft.price;
    }

    pub fn to_draft(&self) -> BookDraft {
        BookDraft {
            title: self.title.clone(),
            genres: self.genres.clone(),
            pages: self.pages,
            price: self.price,
        }
    }
}

impl HasId for Book {
    fn id(&self) -> &str {
        &self.id
    }
}
