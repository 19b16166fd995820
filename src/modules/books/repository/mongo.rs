use async_trait::async_trait;
use bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::Collection;
use serde::{Deserialize, Serialize};

use bookshelf_db::{Database, StoreResult};

use super::BookRepository;
use crate::modules::books::models::{Book, BookId, NewBook};

const COLLECTION: &str = "books";

/// Stored shape of a book in the `books` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BookDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    title: String,
    author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    published_date: Option<BsonDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    price: Option<f64>,
}

impl From<&Book> for BookDocument {
    fn from(book: &Book) -> Self {
        Self {
            id: object_id(&book.id),
            title: book.title.clone(),
            author: book.author.clone(),
            published_date: book
                .published_date
                .map(|date| BsonDateTime::from_millis(date.timestamp_millis())),
            genre: book.genre.clone(),
            price: book.price,
        }
    }
}

impl From<BookDocument> for Book {
    fn from(document: BookDocument) -> Self {
        Self {
            id: BookId::from_bytes(document.id.bytes()),
            title: document.title,
            author: document.author,
            published_date: document
                .published_date
                .and_then(|date| DateTime::<Utc>::from_timestamp_millis(date.timestamp_millis())),
            genre: document.genre,
            price: document.price,
        }
    }
}

fn object_id(id: &BookId) -> ObjectId {
    ObjectId::from_bytes(id.bytes())
}

/// Book repository backed by a MongoDB collection.
#[derive(Debug, Clone)]
pub struct MongoBookRepository {
    collection: Collection<BookDocument>,
}

impl MongoBookRepository {
    pub fn new(database: &Database) -> Self {
        Self {
            collection: database.collection(COLLECTION),
        }
    }
}

#[async_trait]
impl BookRepository for MongoBookRepository {
    async fn insert(&self, book: NewBook) -> StoreResult<Book> {
        let book = Book::with_id(BookId::generate(), book);
        self.collection.insert_one(BookDocument::from(&book)).await?;
        Ok(book)
    }

    async fn select_all(&self) -> StoreResult<Vec<Book>> {
        Ok(self
            .collection
            .find(doc! {})
            .await?
            .try_collect::<Vec<BookDocument>>()
            .await?
            .into_iter()
            .map(Book::from)
            .collect())
    }

    async fn select(&self, id: &BookId) -> StoreResult<Option<Book>> {
        Ok(self
            .collection
            .find_one(doc! { "_id": object_id(id) })
            .await?
            .map(Book::from))
    }

    async fn replace(&self, book: &Book) -> StoreResult<bool> {
        let result = self
            .collection
            .replace_one(doc! { "_id": object_id(&book.id) }, BookDocument::from(book))
            .await?;
        Ok(result.matched_count > 0)
    }

    async fn delete(&self, id: &BookId) -> StoreResult<bool> {
        let result = self
            .collection
            .delete_one(doc! { "_id": object_id(id) })
            .await?;
        Ok(result.deleted_count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn document_conversion_preserves_every_field() {
        let book = Book {
            id: BookId::generate(),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            published_date: Some(Utc.with_ymd_and_hms(1965, 8, 1, 0, 0, 0).unwrap()),
            genre: Some("Science Fiction".to_string()),
            price: Some(15.0),
        };

        let document = BookDocument::from(&book);
        assert_eq!(document.id.to_hex(), book.id.to_string());
        assert_eq!(Book::from(document), book);
    }

    #[test]
    fn document_uses_mongo_field_names() {
        let book = Book {
            id: BookId::generate(),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            published_date: Some(Utc.with_ymd_and_hms(1965, 8, 1, 0, 0, 0).unwrap()),
            genre: None,
            price: None,
        };

        let document = serde_json::to_value(BookDocument::from(&book)).unwrap();
        let mut keys: Vec<_> = document.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        assert_eq!(keys, vec!["_id", "author", "publishedDate", "title"]);
    }
}
