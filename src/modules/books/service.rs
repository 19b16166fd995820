use bookshelf_db::StoreError;
use thiserror::Error;

use super::models::{Book, BookId, CreateBook, UpdateBook, ValidationErrors};
use super::repository::BookRepositoryArc;

pub const NOT_FOUND_MESSAGE: &str = "Book not found";

/// Failures of the book operations.
#[derive(Error, Debug)]
pub enum BookError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    /// The identifier is not well formed; callers see it as not found.
    #[error("Book not found")]
    InvalidId(String),

    #[error("Book not found")]
    NotFound,

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type BookResult<T> = Result<T, BookError>;

/// Create, read, update and delete over the injected repository.
///
/// Holds no state besides the repository handle; every call goes to the store.
#[derive(Debug, Clone)]
pub struct BookService {
    repository: BookRepositoryArc,
}

impl BookService {
    pub fn new(repository: BookRepositoryArc) -> Self {
        Self { repository }
    }

    pub async fn create(&self, payload: CreateBook) -> BookResult<Book> {
        let new_book = payload.validate()?;
        let book = self.repository.insert(new_book).await?;
        tracing::debug!(book_id = %book.id, "book created");
        Ok(book)
    }

    pub async fn list(&self) -> BookResult<Vec<Book>> {
        Ok(self.repository.select_all().await?)
    }

    pub async fn get(&self, id: &str) -> BookResult<Book> {
        let id = parse_id(id)?;
        self.repository
            .select(&id)
            .await?
            .ok_or(BookError::NotFound)
    }

    /// Apply the truthy fields of `payload` to the stored record.
    pub async fn update(&self, id: &str, payload: UpdateBook) -> BookResult<Book> {
        let mut book = self.get(id).await?;
        payload.merge_into(&mut book)?;
        book.validate()?;

        if !self.repository.replace(&book).await? {
            return Err(BookError::NotFound);
        }
        tracing::debug!(book_id = %book.id, "book updated");
        Ok(book)
    }

    pub async fn delete(&self, id: &str) -> BookResult<()> {
        let id = parse_id(id)?;
        if !self.repository.delete(&id).await? {
            return Err(BookError::NotFound);
        }
        tracing::debug!(book_id = %id, "book deleted");
        Ok(())
    }
}

fn parse_id(raw: &str) -> BookResult<BookId> {
    raw.parse()
        .map_err(|_| BookError::InvalidId(raw.to_string()))
}
