use rocket::serde::{Deserialize, Serialize};
use rust_decimal::Decimal;
use schemars::JsonSchema;

#[derive(Debug, Clone, PartialEq, Default, sqlx::FromRow)]
pub struct Book {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub price: Decimal,
    pub stock: i32,
}

/// Body of `POST /books` and `PUT /books/<id>`. Every field is required.
#[derive(Deserialize, Debug, Clone, JsonSchema)]
pub struct BookRequest {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub price: Decimal,
    pub stock: i32,
}

/// Body of `PATCH /books/<id>`. Omitted and `null` fields are left untouched.
#[derive(Deserialize, Debug, Clone, Default, JsonSchema)]
pub struct BookPatchRequest {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i32>,
}

#[derive(Serialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct BookResponse {
    pub id: i32,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub price: Decimal,
    pub stock: i32,
}

impl From<&Book> for BookResponse {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
            author: book.author.clone(),
            genre: book.genre.clone(),
            price: book.price,
            stock: book.stock,
        }
    }
}
