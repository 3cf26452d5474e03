use crate::auth::TokenKeys;
use crate::config::Config;
use crate::database::book::BookRepository;
use crate::database::book_patch::{BookChangeset, BookField};
use crate::database::user::UserRepository;
use crate::error::app_error::AppError;
use crate::models::book::{Book, BookRequest};
use crate::models::user::User;
use crate::routes;
use rocket::local::asynchronous::Client;
use sqlx::postgres::PgPoolOptions;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

/// Client over the book and user routes with a pool that never connects
/// until a handler touches the store.
pub async fn route_client(config: &Config) -> Client {
    let pool = PgPoolOptions::new()
        .acquire_timeout(std::time::Duration::from_secs(1))
        .connect_lazy(&config.database.url)
        .expect("valid database url");
    let (book_routes, _) = routes::book::routes();
    let (user_routes, _) = routes::user::routes();

    let rocket = rocket::build()
        .manage(pool)
        .manage(TokenKeys::from_config(&config.auth))
        .manage(config.books)
        .mount("/books", book_routes)
        .mount("/", user_routes)
        .register("/", routes::error::catchers());

    Client::tracked(rocket).await.expect("valid rocket instance")
}

/// In-memory stand-in for both tables, ids assigned like a SERIAL column.
#[derive(Default)]
pub struct MockRepository {
    books: Mutex<Vec<Book>>,
    users: Mutex<Vec<User>>,
    next_id: AtomicUsize,
    patch_calls: AtomicUsize,
}

impl MockRepository {
    fn next_id(&self) -> i32 {
        (self.next_id.fetch_add(1, Ordering::SeqCst) + 1) as i32
    }

    pub fn patch_calls(&self) -> usize {
        self.patch_calls.load(Ordering::SeqCst)
    }
}

fn book_from_request(id: i32, request: &BookRequest) -> Book {
    Book {
        id,
        title: request.title.clone(),
        author: request.author.clone(),
        genre: request.genre.clone(),
        price: request.price,
        stock: request.stock,
    }
}

fn apply_changeset(book: &mut Book, changeset: &BookChangeset) {
    for field in changeset.fields() {
        match field {
            BookField::Title(value) => book.title = value.clone(),
            BookField::Author(value) => book.author = value.clone(),
            BookField::Genre(value) => book.genre = value.clone(),
            BookField::Price(value) => book.price = *value,
            BookField::Stock(value) => book.stock = *value,
        }
    }
}

#[async_trait::async_trait]
impl BookRepository for MockRepository {
    async fn list_books(&self) -> Result<Vec<Book>, AppError> {
        let mut books = self.books.lock().await.clone();
        books.sort_by_key(|book| book.id);
        Ok(books)
    }

    async fn get_book_by_id(&self, id: i32) -> Result<Option<Book>, AppError> {
        Ok(self.books.lock().await.iter().find(|book| book.id == id).cloned())
    }

    async fn create_book(&self, request: &BookRequest) -> Result<Book, AppError> {
        let book = book_from_request(self.next_id(), request);
        self.books.lock().await.push(book.clone());
        Ok(book)
    }

    async fn update_book(&self, id: i32, request: &BookRequest) -> Result<Option<Book>, AppError> {
        let mut books = self.books.lock().await;
        Ok(books.iter_mut().find(|book| book.id == id).map(|book| {
            *book = book_from_request(id, request);
            book.clone()
        }))
    }

    async fn patch_book(&self, id: i32, changeset: &BookChangeset) -> Result<Option<Book>, AppError> {
        self.patch_calls.fetch_add(1, Ordering::SeqCst);
        let mut books = self.books.lock().await;
        Ok(books.iter_mut().find(|book| book.id == id).map(|book| {
            apply_changeset(book, changeset);
            book.clone()
        }))
    }

    async fn delete_book(&self, id: i32) -> Result<Option<Book>, AppError> {
        let mut books = self.books.lock().await;
        Ok(books.iter().position(|book| book.id == id).map(|index| books.remove(index)))
    }
}

#[async_trait::async_trait]
impl UserRepository for MockRepository {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, AppError> {
        let mut users = self.users.lock().await;
        if users.iter().any(|user| user.email == email) {
            return Err(AppError::UserAlreadyExists(email.to_string()));
        }

        let user = User {
            id: self.next_id(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().await.iter().find(|user| user.email == email).cloned())
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.lock().await.clone())
    }
}
