use std::sync::Arc;

use async_trait::async_trait;
use bookshelf_db::StoreResult;
use tokio::sync::RwLock;

use super::BookRepository;
use crate::modules::books::models::{Book, BookId, NewBook};

/// Book repository kept in process memory, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct MemoryBookRepository {
    books: Arc<RwLock<Vec<Book>>>,
}

impl MemoryBookRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a repository pre-populated with `books`.
    pub fn with_data(books: Vec<Book>) -> Self {
        Self {
            books: Arc::new(RwLock::new(books)),
        }
    }
}

#[async_trait]
impl BookRepository for MemoryBookRepository {
    async fn insert(&self, book: NewBook) -> StoreResult<Book> {
        let book = Book::with_id(BookId::generate(), book);
        self.books.write().await.push(book.clone());
        Ok(book)
    }

    async fn select_all(&self) -> StoreResult<Vec<Book>> {
        Ok(self.books.read().await.clone())
    }

    async fn select(&self, id: &BookId) -> StoreResult<Option<Book>> {
        Ok(self.books.read().await.iter().find(|b| &b.id == id).cloned())
    }

    async fn replace(&self, book: &Book) -> StoreResult<bool> {
        let mut books = self.books.write().await;
        match books.iter_mut().find(|b| b.id == book.id) {
            Some(stored) => {
                *stored = book.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: &BookId) -> StoreResult<bool> {
        let mut books = self.books.write().await;
        match books.iter().position(|b| &b.id == id) {
            Some(index) => {
                books.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
