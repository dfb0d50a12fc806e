mod models;

pub use models::{find_position, generate_book_id, Book, BookDraft, HasId, InvalidBookDraft};
