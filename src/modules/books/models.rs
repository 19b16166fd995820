use std::fmt;
use std::str::FromStr;

use bson::oid::ObjectId;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier assigned to a book when it is first stored.
///
/// Twelve bytes, written as 24 lowercase hex characters on the wire. Any other
/// string is rejected before a backend is consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookId([u8; 12]);

impl BookId {
    /// Fresh, process-unique identifier, roughly ordered by creation time.
    pub fn generate() -> Self {
        Self(ObjectId::new().bytes())
    }

    pub const fn from_bytes(bytes: [u8; 12]) -> Self {
        Self(bytes)
    }

    pub const fn bytes(&self) -> [u8; 12] {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid book id '{0}'")]
pub struct InvalidBookId(pub String);

impl FromStr for BookId {
    type Err = InvalidBookId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ObjectId::parse_str(s)
            .map(|oid| Self(oid.bytes()))
            .map_err(|_| InvalidBookId(s.to_string()))
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&ObjectId::from_bytes(self.0).to_hex())
    }
}

impl TryFrom<String> for BookId {
    type Error = InvalidBookId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BookId> for String {
    fn from(id: BookId) -> Self {
        id.to_string()
    }
}

/// A stored book record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl Book {
    pub fn with_id(id: BookId, book: NewBook) -> Self {
        Self {
            id,
            title: book.title,
            author: book.author,
            published_date: book.published_date,
            genre: book.genre,
            price: book.price,
        }
    }

    /// Check the record-level constraints every stored book must satisfy.
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        errors.require("title", &self.title);
        errors.require("author", &self.author);
        errors.into_result()
    }
}

/// A validated book that has not been assigned an identifier yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub published_date: Option<DateTime<Utc>>,
    pub genre: Option<String>,
    pub price: Option<f64>,
}

/// Accepted encodings for `publishedDate` in request bodies.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DateInput {
    /// Milliseconds since the Unix epoch
    Millis(i64),
    /// RFC 3339 date-time or a `YYYY-MM-DD` date
    Text(String),
}

impl DateInput {
    /// Only an empty string stands for "no date" on create; `0` is the epoch.
    fn is_supplied(&self) -> bool {
        !matches!(self, DateInput::Text(text) if text.is_empty())
    }

    fn is_truthy(&self) -> bool {
        match self {
            DateInput::Millis(ms) => *ms != 0,
            DateInput::Text(text) => !text.is_empty(),
        }
    }

    fn parse(&self) -> Option<DateTime<Utc>> {
        match self {
            DateInput::Millis(ms) => DateTime::from_timestamp_millis(*ms),
            DateInput::Text(text) => DateTime::parse_from_rfc3339(text)
                .map(|dt| dt.with_timezone(&Utc))
                .ok()
                .or_else(|| {
                    NaiveDate::parse_from_str(text, "%Y-%m-%d")
                        .ok()
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                        .map(|naive| naive.and_utc())
                }),
        }
    }

    fn raw(&self) -> String {
        match self {
            DateInput::Millis(ms) => ms.to_string(),
            DateInput::Text(text) => text.clone(),
        }
    }
}

/// Body of `POST /books`.
///
/// Every field is optional on the wire so that missing required fields are
/// reported by [`CreateBook::validate`] with a field-level message.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub published_date: Option<DateInput>,
    pub genre: Option<String>,
    pub price: Option<f64>,
}

impl CreateBook {
    pub fn validate(self) -> Result<NewBook, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let title = self.title.unwrap_or_default();
        let author = self.author.unwrap_or_default();
        errors.require("title", &title);
        errors.require("author", &author);

        let published_date = match self.published_date.filter(DateInput::is_supplied) {
            Some(input) => errors.cast_date(&input),
            None => None,
        };

        errors.into_result()?;

        Ok(NewBook {
            title,
            author,
            published_date,
            genre: self.genre,
            price: self.price,
        })
    }
}

/// Body of `PUT /books/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBook {
    pub title: Option<String>,
    pub author: Option<String>,
    pub published_date: Option<DateInput>,
    pub genre: Option<String>,
    pub price: Option<f64>,
}

impl UpdateBook {
    /// Overwrite the fields of `book` that carry a truthy value in this payload.
    ///
    /// Empty strings, `0` and `null` count as "not supplied", so a field can never
    /// be cleared through an update.
    pub fn merge_into(self, book: &mut Book) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if let Some(title) = self.title.filter(|t| !t.is_empty()) {
            book.title = title;
        }
        if let Some(author) = self.author.filter(|a| !a.is_empty()) {
            book.author = author;
        }
        if let Some(input) = self.published_date.filter(DateInput::is_truthy) {
            if let Some(date) = errors.cast_date(&input) {
                book.published_date = Some(date);
            }
        }
        if let Some(genre) = self.genre.filter(|g| !g.is_empty()) {
            book.genre = Some(genre);
        }
        if let Some(price) = self.price.filter(|p| *p != 0.0) {
            book.price = Some(price);
        }

        errors.into_result()
    }
}

/// Field-level validation failures, rendered as one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<(&'static str, String)>,
}

impl ValidationErrors {
    fn require(&mut self, field: &'static str, value: &str) {
        if value.is_empty() {
            self.fields
                .push((field, format!("Path `{}` is required.", field)));
        }
    }

    fn cast_date(&mut self, input: &DateInput) -> Option<DateTime<Utc>> {
        let parsed = input.parse();
        if parsed.is_none() {
            self.fields.push((
                "publishedDate",
                format!(
                    "Cast to date failed for value \"{}\" at path \"publishedDate\"",
                    input.raw()
                ),
            ));
        }
        parsed
    }

    fn into_result(self) -> Result<(), Self> {
        if self.fields.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Book validation failed: ")?;
        for (i, (field, reason)) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", field, reason)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Confirmation body returned by `DELETE /books/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn failing_fields(err: &ValidationErrors) -> Vec<&'static str> {
        err.fields.iter().map(|(field, _)| *field).collect()
    }

    fn stored_book() -> Book {
        Book {
            id: BookId::generate(),
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            published_date: Some(Utc.with_ymd_and_hms(1965, 8, 1, 0, 0, 0).unwrap()),
            genre: Some("Science Fiction".to_string()),
            price: Some(15.0),
        }
    }

    #[test]
    fn book_id_parses_its_own_display() {
        let id = BookId::generate();
        let text = id.to_string();
        assert_eq!(text.len(), 24);
        assert_eq!(text.parse::<BookId>().unwrap(), id);
    }

    #[test]
    fn book_id_rejects_malformed_strings() {
        for raw in ["", "123", "not-an-id", "zzzzzzzzzzzzzzzzzzzzzzzz", "64b7f0c2e4b0a1a2b3c4d5e6f"] {
            assert_eq!(raw.parse::<BookId>(), Err(InvalidBookId(raw.to_string())));
        }
        let upper: BookId = "64B7F0C2E4B0A1A2B3C4D5E6".parse().unwrap();
        assert_eq!(upper.to_string(), "64b7f0c2e4b0a1a2b3c4d5e6");
    }

    #[test]
    fn generated_ids_are_unique() {
        let a = BookId::generate();
        let b = BookId::generate();
        assert_ne!(a, b);
    }

    #[test]
    fn book_serializes_with_camel_case_and_skips_unset_fields() {
        let id: BookId = "64b7f0c2e4b0a1a2b3c4d5e6".parse().unwrap();
        let book = Book {
            id,
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            published_date: Some(Utc.with_ymd_and_hms(1965, 8, 1, 0, 0, 0).unwrap()),
            genre: None,
            price: Some(15.0),
        };

        assert_eq!(
            serde_json::to_value(&book).unwrap(),
            json!({
                "id": "64b7f0c2e4b0a1a2b3c4d5e6",
                "title": "Dune",
                "author": "Herbert",
                "publishedDate": "1965-08-01T00:00:00Z",
                "price": 15.0
            })
        );
    }

    #[test]
    fn create_requires_title_and_author() {
        let err = CreateBook::default().validate().unwrap_err();
        assert_eq!(failing_fields(&err), vec!["title", "author"]);
        assert_eq!(
            err.to_string(),
            "Book validation failed: title: Path `title` is required., author: Path `author` is required."
        );
    }

    #[test]
    fn create_treats_empty_title_as_missing() {
        let payload = CreateBook {
            title: Some(String::new()),
            author: Some("Herbert".to_string()),
            ..CreateBook::default()
        };
        let err = payload.validate().unwrap_err();
        assert_eq!(failing_fields(&err), vec!["title"]);
    }

    #[test]
    fn create_accepts_date_formats() {
        let expected = Utc.with_ymd_and_hms(1965, 8, 1, 0, 0, 0).unwrap();
        for input in [
            DateInput::Text("1965-08-01".to_string()),
            DateInput::Text("1965-08-01T00:00:00Z".to_string()),
            DateInput::Text("1965-08-01T02:00:00+02:00".to_string()),
            DateInput::Millis(expected.timestamp_millis()),
        ] {
            let payload = CreateBook {
                title: Some("Dune".to_string()),
                author: Some("Herbert".to_string()),
                published_date: Some(input),
                ..CreateBook::default()
            };
            assert_eq!(payload.validate().unwrap().published_date, Some(expected));
        }
    }

    #[test]
    fn create_keeps_epoch_date_and_drops_empty_one() {
        let payload: CreateBook = serde_json::from_value(json!({
            "title": "Dune",
            "author": "Herbert",
            "publishedDate": 0
        }))
        .unwrap();
        assert_eq!(
            payload.validate().unwrap().published_date,
            Some(Utc.timestamp_millis_opt(0).unwrap())
        );

        let payload: CreateBook = serde_json::from_value(json!({
            "title": "Dune",
            "author": "Herbert",
            "publishedDate": ""
        }))
        .unwrap();
        assert_eq!(payload.validate().unwrap().published_date, None);
    }

    #[test]
    fn create_rejects_uncastable_date() {
        let payload = CreateBook {
            title: Some("Dune".to_string()),
            author: Some("Herbert".to_string()),
            published_date: Some(DateInput::Text("last summer".to_string())),
            ..CreateBook::default()
        };
        assert_eq!(
            payload.validate().unwrap_err().to_string(),
            "Book validation failed: publishedDate: Cast to date failed for value \"last summer\" at path \"publishedDate\""
        );
    }

    #[test]
    fn create_payload_decodes_from_json() {
        let payload: CreateBook = serde_json::from_value(json!({
            "title": "Dune",
            "author": "Herbert",
            "publishedDate": "1965-08-01",
            "price": 15
        }))
        .unwrap();

        let book = payload.validate().unwrap();
        assert_eq!(book.title, "Dune");
        assert_eq!(book.price, Some(15.0));
        assert_eq!(book.genre, None);
        assert!(book.published_date.is_some());
    }

    #[test]
    fn update_only_touches_truthy_fields() {
        let mut book = stored_book();
        let original = book.clone();

        UpdateBook {
            genre: Some("Mystery".to_string()),
            ..UpdateBook::default()
        }
        .merge_into(&mut book)
        .unwrap();

        assert_eq!(book.genre.as_deref(), Some("Mystery"));
        assert_eq!(book.title, original.title);
        assert_eq!(book.author, original.author);
        assert_eq!(book.published_date, original.published_date);
        assert_eq!(book.price, original.price);
    }

    #[test]
    fn update_ignores_falsy_values() {
        let mut book = stored_book();
        let original = book.clone();

        let payload: UpdateBook = serde_json::from_value(json!({
            "title": "",
            "author": null,
            "publishedDate": "",
            "genre": "",
            "price": 0
        }))
        .unwrap();
        payload.merge_into(&mut book).unwrap();

        assert_eq!(book, original);
    }

    #[test]
    fn update_rejects_uncastable_date() {
        let mut book = stored_book();
        let err = UpdateBook {
            published_date: Some(DateInput::Text("soon".to_string())),
            ..UpdateBook::default()
        }
        .merge_into(&mut book)
        .unwrap_err();

        assert_eq!(failing_fields(&err), vec!["publishedDate"]);
    }

    #[test]
    fn stored_book_validation_flags_blank_required_fields() {
        let mut book = stored_book();
        assert!(book.validate().is_ok());

        book.author = String::new();
        assert_eq!(
            book.validate().unwrap_err().to_string(),
            "Book validation failed: author: Path `author` is required."
        );
    }
}
