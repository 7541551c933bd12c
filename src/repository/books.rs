//! In-memory book store

use std::{collections::HashSet, sync::Arc};

use rand::Rng;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::{
    config::StoreMode,
    error::{AppError, AppResult},
    models::Book,
};

/// Upper bound (exclusive) of generated ids
pub const ID_SPACE: u32 = 100_000;

fn random_id() -> u32 {
    rand::thread_rng().gen_range(0..ID_SPACE)
}

/// Reply of a replace: the stored record, or in legacy mode the untouched
/// collection when the id was unknown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Replaced {
    Book(Book),
    Unchanged(Vec<Book>),
}

/// Ordered collection of books shared by all request handlers
#[derive(Clone)]
pub struct BookStore {
    books: Arc<RwLock<Vec<Book>>>,
    mode: StoreMode,
    next_id: fn() -> u32,
}

impl BookStore {
    pub fn new(mode: StoreMode) -> Self {
        Self::with_books(mode, Vec::new())
    }

    /// Store pre-filled with the startup records
    pub fn seeded(mode: StoreMode) -> Self {
        Self::with_books(mode, Book::seed())
    }

    fn with_books(mode: StoreMode, books: Vec<Book>) -> Self {
        Self {
            books: Arc::new(RwLock::new(books)),
            mode,
            next_id: random_id,
        }
    }

    /// Replace the id generator
    pub fn with_id_source(mut self, next_id: fn() -> u32) -> Self {
        self.next_id = next_id;
        self
    }

    pub fn mode(&self) -> StoreMode {
        self.mode
    }

    /// All books in insertion order
    pub async fn list(&self) -> Vec<Book> {
        self.books.read().await.clone()
    }

    /// First book with the given id
    pub async fn get(&self, id: &str) -> AppResult<Book> {
        let books = self.books.read().await;
        match books.iter().find(|b| b.id == id) {
            Some(book) => Ok(book.clone()),
            None => match self.mode {
                StoreMode::Legacy => Ok(Book::default()),
                StoreMode::Strict => Err(not_found(id)),
            },
        }
    }

    /// Append a book under a freshly drawn id, ignoring the caller's id
    pub async fn create(&self, candidate: Book) -> AppResult<Book> {
        let mut books = self.books.write().await;
        let id = match self.mode {
            StoreMode::Legacy => (self.next_id)().to_string(),
            StoreMode::Strict => self.unused_id(&books)?,
        };
        let book = candidate.with_id(id);
        books.push(book.clone());
        Ok(book)
    }

    /// Swap the first book with the given id for `replacement`, which keeps
    /// that id and moves to the end of the collection
    pub async fn replace(&self, id: &str, replacement: Book) -> AppResult<Replaced> {
        let mut books = self.books.write().await;
        match books.iter().position(|b| b.id == id) {
            Some(idx) => {
                books.remove(idx);
                let book = replacement.with_id(id);
                books.push(book.clone());
                Ok(Replaced::Book(book))
            }
            None => match self.mode {
                StoreMode::Legacy => Ok(Replaced::Unchanged(books.clone())),
                StoreMode::Strict => Err(not_found(id)),
            },
        }
    }

    /// Remove a book and return what remains
    ///
    /// Legacy mode only ever looks at the first book: if it does not match,
    /// nothing is removed even when the id exists further down.
    pub async fn delete(&self, id: &str) -> AppResult<Vec<Book>> {
        let mut books = self.books.write().await;
        match self.mode {
            StoreMode::Legacy => {
                if books.first().is_some_and(|b| b.id == id) {
                    books.remove(0);
                }
            }
            StoreMode::Strict => {
                let idx = books
                    .iter()
                    .position(|b| b.id == id)
                    .ok_or_else(|| not_found(id))?;
                books.remove(idx);
            }
        }
        Ok(books.clone())
    }

    fn unused_id(&self, books: &[Book]) -> AppResult<String> {
        if books.len() >= ID_SPACE as usize {
            return Err(AppError::Conflict("No book ids left".to_string()));
        }
        let taken: HashSet<&str> = books.iter().map(|b| b.id.as_str()).collect();
        loop {
            let id = (self.next_id)().to_string();
            if !taken.contains(id.as_str()) {
                return Ok(id);
            }
        }
    }
}

fn not_found(id: &str) -> AppError {
    AppError::NotFound(format!("Book {} not found", id))
}
