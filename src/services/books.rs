//! Books service

use crate::{
    config::StoreMode,
    error::AppResult,
    models::Book,
    repository::{Replaced, Repository},
};

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub fn mode(&self) -> StoreMode {
        self.repository.books.mode()
    }

    pub async fn list(&self) -> Vec<Book> {
        self.repository.books.list().await
    }

    pub async fn get_by_id(&self, id: &str) -> AppResult<Book> {
        let book = self.repository.books.get(id).await?;
        if book.id.is_empty() {
            tracing::debug!("Book {} not found, returning placeholder", id);
        }
        Ok(book)
    }

    pub async fn create(&self, data: Book) -> AppResult<Book> {
        let book = self.repository.books.create(data).await?;
        tracing::info!("Created book {} ({})", book.id, book.title);
        Ok(book)
    }

    /// Replace a book, keeping its id
    pub async fn replace(&self, id: &str, data: Book) -> AppResult<Replaced> {
        let replaced = self.repository.books.replace(id, data).await?;
        match &replaced {
            Replaced::Book(book) => tracing::info!("Replaced book {} ({})", id, book.title),
            Replaced::Unchanged(_) => tracing::debug!("Book {} not found, nothing replaced", id),
        }
        Ok(replaced)
    }

    /// Delete a book, returning the remaining collection
    pub async fn delete(&self, id: &str) -> AppResult<Vec<Book>> {
        let remaining = self.repository.books.delete(id).await?;
        tracing::info!("Delete book {}: {} book(s) remaining", id, remaining.len());
        Ok(remaining)
    }
}
