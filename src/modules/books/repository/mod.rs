use std::{fmt::Debug, sync::Arc};

use async_trait::async_trait;
use bookshelf_db::StoreResult;

use super::models::{Book, BookId, NewBook};

/// In-memory repository implementation.
pub mod memory;
/// MongoDB-backed repository implementation.
pub mod mongo;

pub use memory::MemoryBookRepository;
pub use mongo::MongoBookRepository;

/// Persistence operations for book records.
///
/// Each method is a single call against the backing store.
#[async_trait]
pub trait BookRepository: Debug + Send + Sync {
    /// Stores a new record under a freshly generated identifier.
    async fn insert(&self, book: NewBook) -> StoreResult<Book>;

    /// Returns every record in the store's natural order.
    async fn select_all(&self) -> StoreResult<Vec<Book>>;

    /// Returns the record if it exists.
    async fn select(&self, id: &BookId) -> StoreResult<Option<Book>>;

    /// Overwrites the stored record with the same id.
    ///
    /// Returns `false` when no such record exists.
    async fn replace(&self, book: &Book) -> StoreResult<bool>;

    /// Removes a record permanently.
    ///
    /// Returns `false` when nothing was deleted.
    async fn delete(&self, id: &BookId) -> StoreResult<bool>;
}

/// Shared handle to a book repository.
pub type BookRepositoryArc = Arc<dyn BookRepository>;
