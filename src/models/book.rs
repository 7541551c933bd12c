//! Book model

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use utoipa::ToSchema;

/// Author of a book
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Author {
    pub firstname: String,
    pub lastname: String,
}

/// Book record
///
/// Missing fields decode to their zero value, so `{}` is a valid (empty) book.
/// The zero-valued book doubles as the placeholder returned for unknown ids
/// in legacy mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(default)]
pub struct Book {
    /// Assigned by the store; ignored on create and replace
    pub id: String,
    pub isbn: String,
    pub title: String,
    pub author: Option<Author>,
}

impl Author {
    fn merge_lenient(&mut self, obj: &Map<String, Value>) {
        for (key, value) in obj {
            match key.to_lowercase().as_str() {
                "firstname" => assign_str(&mut self.firstname, value),
                "lastname" => assign_str(&mut self.lastname, value),
                _ => {}
            }
        }
    }
}

impl Book {
    /// Decode a request body the forgiving way legacy clients rely on
    ///
    /// Keys match field names case-insensitively, and a later key overrides
    /// an earlier one. A field whose value has the wrong type is skipped
    /// while the other fields are still taken. Anything that is not a JSON
    /// object yields the empty book.
    pub fn decode_lenient(bytes: &[u8]) -> Book {
        let mut book = Book::default();
        let Ok(Value::Object(obj)) = serde_json::from_slice::<Value>(bytes) else {
            return book;
        };
        for (key, value) in &obj {
            match key.to_lowercase().as_str() {
                "id" => assign_str(&mut book.id, value),
                "isbn" => assign_str(&mut book.isbn, value),
                "title" => assign_str(&mut book.title, value),
                "author" => match value {
                    Value::Null => book.author = None,
                    Value::Object(fields) => {
                        let mut author = book.author.take().unwrap_or_default();
                        author.merge_lenient(fields);
                        book.author = Some(author);
                    }
                    _ => {}
                },
                _ => {}
            }
        }
        book
    }

    /// Copy of this book carrying the given id
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// The two records present at startup
    pub fn seed() -> Vec<Book> {
        vec![
            Book {
                id: "1".to_string(),
                isbn: "32442".to_string(),
                title: "Be good".to_string(),
                author: Some(Author {
                    firstname: "John".to_string(),
                    lastname: "Doe".to_string(),
                }),
            },
            Book {
                id: "2".to_string(),
                isbn: "12442".to_string(),
                title: "Be bad".to_string(),
                author: Some(Author {
                    firstname: "Eric".to_string(),
                    lastname: "Cartman".to_string(),
                }),
            },
        ]
    }
}

/// Strings overwrite, null and mistyped values leave the field alone
fn assign_str(field: &mut String, value: &Value) {
    if let Value::String(s) = value {
        field.clone_from(s);
    }
}
