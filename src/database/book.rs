use crate::database::book_patch::{BOOK_COLUMNS, BookChangeset, BookField};
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::book::{Book, BookRequest};

#[async_trait::async_trait]
pub trait BookRepository {
    async fn list_books(&self) -> Result<Vec<Book>, AppError>;
    async fn get_book_by_id(&self, id: i32) -> Result<Option<Book>, AppError>;
    async fn create_book(&self, request: &BookRequest) -> Result<Book, AppError>;
    async fn update_book(&self, id: i32, request: &BookRequest) -> Result<Option<Book>, AppError>;
    async fn patch_book(&self, id: i32, changeset: &BookChangeset) -> Result<Option<Book>, AppError>;
    async fn delete_book(&self, id: i32) -> Result<Option<Book>, AppError>;
}

#[async_trait::async_trait]
impl BookRepository for PostgresRepository {
    async fn list_books(&self) -> Result<Vec<Book>, AppError> {
        let query = format!("SELECT {} FROM books ORDER BY id ASC", BOOK_COLUMNS);
        let books = sqlx::query_as::<_, Book>(&query).fetch_all(&self.pool).await?;
        Ok(books)
    }

    async fn get_book_by_id(&self, id: i32) -> Result<Option<Book>, AppError> {
        let query = format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS);
        let book = sqlx::query_as::<_, Book>(&query).bind(id).fetch_optional(&self.pool).await?;
        Ok(book)
    }

    async fn create_book(&self, request: &BookRequest) -> Result<Book, AppError> {
        let query = format!(
            r#"
            INSERT INTO books (title, author, genre, price, stock)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );

        let book = sqlx::query_as::<_, Book>(&query)
            .bind(&request.title)
            .bind(&request.author)
            .bind(&request.genre)
            .bind(request.price)
            .bind(request.stock)
            .fetch_one(&self.pool)
            .await?;

        Ok(book)
    }

    async fn update_book(&self, id: i32, request: &BookRequest) -> Result<Option<Book>, AppError> {
        let query = format!(
            r#"
            UPDATE books
            SET title = $1, author = $2, genre = $3, price = $4, stock = $5
            WHERE id = $6
            RETURNING {}
            "#,
            BOOK_COLUMNS
        );

        let book = sqlx::query_as::<_, Book>(&query)
            .bind(&request.title)
            .bind(&request.author)
            .bind(&request.genre)
            .bind(request.price)
            .bind(request.stock)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(book)
    }

    async fn patch_book(&self, id: i32, changeset: &BookChangeset) -> Result<Option<Book>, AppError> {
        // Column names come from BookField::column, values are always bound.
        let sql = changeset.update_sql();

        let mut query = sqlx::query_as::<_, Book>(&sql);
        for field in changeset.fields() {
            query = match field {
                BookField::Title(value) | BookField::Author(value) | BookField::Genre(value) => query.bind(value),
                BookField::Price(value) => query.bind(value),
                BookField::Stock(value) => query.bind(value),
            };
        }

        let book = query.bind(id).fetch_optional(&self.pool).await?;
        Ok(book)
    }

    async fn delete_book(&self, id: i32) -> Result<Option<Book>, AppError> {
        let query = format!("DELETE FROM books WHERE id = $1 RETURNING {}", BOOK_COLUMNS);
        let book = sqlx::query_as::<_, Book>(&query).bind(id).fetch_optional(&self.pool).await?;
        Ok(book)
    }
}
