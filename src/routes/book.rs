use crate::auth::AuthenticatedUser;
use crate::config::BooksConfig;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::book::{BookPatchRequest, BookRequest, BookResponse};
use crate::service::book::BookService;
use rocket::response::status::Created;
use rocket::serde::json::Json;
use rocket::{State, delete, get, patch, post, put};
use rocket_okapi::openapi;
use sqlx::PgPool;
use tracing::info;

fn parse_book_id(id: &str) -> Result<i32, AppError> {
    id.parse::<i32>().map_err(|_| AppError::BadRequest(format!("Invalid book id: {}", id)))
}

/// List every book, ordered by id
#[openapi(tag = "Books")]
#[get("/")]
pub async fn list_books(pool: &State<PgPool>) -> Result<Json<Vec<BookResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    Ok(Json(BookService::new(&repo).list_books().await?))
}

/// Get a single book
#[openapi(tag = "Books")]
#[get("/<id>")]
pub async fn get_book(pool: &State<PgPool>, id: &str) -> Result<Json<BookResponse>, AppError> {
    let id = parse_book_id(id)?;
    let repo = PostgresRepository { pool: pool.inner().clone() };
    Ok(Json(BookService::new(&repo).get_book(id).await?))
}

/// Add a book to the inventory (requires a bearer token)
#[openapi(tag = "Books")]
#[post("/", data = "<payload>")]
pub async fn create_book(
    pool: &State<PgPool>,
    current_user: AuthenticatedUser,
    payload: JsonBody<BookRequest>,
) -> Result<Created<Json<BookResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let book = BookService::new(&repo).create_book(&payload).await?;
    info!(book_id = book.id, user_id = ?current_user.user_id, "book created");
    Ok(Created::new(format!("/books/{}", book.id)).body(Json(book)))
}

/// Replace every field of a book
#[openapi(tag = "Books")]
#[put("/<id>", data = "<payload>")]
pub async fn put_book(pool: &State<PgPool>, id: &str, payload: JsonBody<BookRequest>) -> Result<Json<BookResponse>, AppError> {
    let id = parse_book_id(id)?;
    let repo = PostgresRepository { pool: pool.inner().clone() };
    Ok(Json(BookService::new(&repo).update_book(id, &payload).await?))
}

/// Update only the supplied fields of a book
#[openapi(tag = "Books")]
#[patch("/<id>", data = "<payload>")]
pub async fn patch_book(
    pool: &State<PgPool>,
    books_config: &State<BooksConfig>,
    id: &str,
    payload: JsonBody<BookPatchRequest>,
) -> Result<Json<BookResponse>, AppError> {
    let id = parse_book_id(id)?;
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let service = BookService::new(&repo).with_patch_mode(books_config.patch_mode);
    Ok(Json(service.patch_book(id, &payload).await?))
}

/// Remove a book from the inventory
#[openapi(tag = "Books")]
#[delete("/<id>")]
pub async fn delete_book(pool: &State<PgPool>, id: &str) -> Result<String, AppError> {
    let id = parse_book_id(id)?;
    let repo = PostgresRepository { pool: pool.inner().clone() };
    BookService::new(&repo).delete_book(id).await?;
    Ok("Book deleted successfully".to_string())
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_books, get_book, create_book, put_book, patch_book, delete_book]
}
