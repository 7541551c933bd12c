//! Repository layer for book storage

pub mod books;

use crate::config::StoreConfig;

pub use books::{BookStore, Replaced};

/// Main repository struct holding the in-memory stores
#[derive(Clone)]
pub struct Repository {
    pub books: BookStore,
}

impl Repository {
    /// Create a repository, seeding the book store when configured to
    pub fn new(config: &StoreConfig) -> Self {
        let books = if config.seed {
            BookStore::seeded(config.mode)
        } else {
            BookStore::new(config.mode)
        };
        Self { books }
    }
}
