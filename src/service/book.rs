use crate::config::PatchMode;
use crate::database::book::BookRepository;
use crate::database::book_patch::BookChangeset;
use crate::error::app_error::AppError;
use crate::models::book::{BookPatchRequest, BookRequest, BookResponse};
use tracing::debug;

fn book_not_found() -> AppError {
    AppError::NotFound("Book not found".to_string())
}

pub struct BookService<'a, R: BookRepository + Sync> {
    repository: &'a R,
    patch_mode: PatchMode,
}

impl<'a, R: BookRepository + Sync> BookService<'a, R> {
    pub fn new(repository: &'a R) -> Self {
        BookService {
            repository,
            patch_mode: PatchMode::default(),
        }
    }

    pub fn with_patch_mode(mut self, patch_mode: PatchMode) -> Self {
        self.patch_mode = patch_mode;
        self
    }

    pub async fn list_books(&self) -> Result<Vec<BookResponse>, AppError> {
        let books = self.repository.list_books().await?;
        Ok(books.iter().map(BookResponse::from).collect())
    }

    pub async fn get_book(&self, id: i32) -> Result<BookResponse, AppError> {
        let book = self.repository.get_book_by_id(id).await?.ok_or_else(book_not_found)?;
        Ok(BookResponse::from(&book))
    }

    pub async fn create_book(&self, request: &BookRequest) -> Result<BookResponse, AppError> {
        let book = self.repository.create_book(request).await?;
        Ok(BookResponse::from(&book))
    }

    pub async fn update_book(&self, id: i32, request: &BookRequest) -> Result<BookResponse, AppError> {
        let book = self.repository.update_book(id, request).await?.ok_or_else(book_not_found)?;
        Ok(BookResponse::from(&book))
    }

    /// Applies only the fields that survive the configured [`PatchMode`] filter.
    /// An empty changeset never reaches the store.
    pub async fn patch_book(&self, id: i32, request: &BookPatchRequest) -> Result<BookResponse, AppError> {
        let changeset = BookChangeset::from_patch(request, self.patch_mode);
        if changeset.is_empty() {
            return Err(AppError::BadRequest("No fields to update".to_string()));
        }

        debug!(book_id = id, set_clause = %changeset.set_clause(), "patching book");
        let book = self.repository.patch_book(id, &changeset).await?.ok_or_else(book_not_found)?;
        Ok(BookResponse::from(&book))
    }

    pub async fn delete_book(&self, id: i32) -> Result<(), AppError> {
        self.repository.delete_book(id).await?.ok_or_else(book_not_found)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::MockRepository;
    use rust_decimal::Decimal;

    fn dune() -> BookRequest {
        BookRequest {
            title: "Dune".to_string(),
            author: "Herbert".to_string(),
            genre: "SciFi".to_string(),
            price: Decimal::new(999, 2),
            stock: 5,
        }
    }

    #[tokio::test]
    async fn create_then_get_returns_same_fields() {
        let repo = MockRepository::default();
        let service = BookService::new(&repo);

        let created = service.create_book(&dune()).await.unwrap();
        let fetched = service.get_book(created.id).await.unwrap();

        assert_eq!(created, fetched);
        assert_eq!(fetched.title, "Dune");
        assert_eq!(fetched.author, "Herbert");
        assert_eq!(fetched.genre, "SciFi");
        assert_eq!(fetched.price, Decimal::new(999, 2));
        assert_eq!(fetched.stock, 5);
    }

    #[tokio::test]
    async fn list_is_ordered_by_id() {
        let repo = MockRepository::default();
        let service = BookService::new(&repo);
        let first = service.create_book(&dune()).await.unwrap();
        let second = service
            .create_book(&BookRequest {
                title: "Emma".to_string(),
                ..dune()
            })
            .await
            .unwrap();

        let ids: Vec<_> = service.list_books().await.unwrap().iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![first.id, second.id]);
    }

    #[tokio::test]
    async fn missing_book_is_not_found() {
        let repo = MockRepository::default();
        let service = BookService::new(&repo);
        assert!(matches!(service.get_book(404).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.update_book(404, &dune()).await, Err(AppError::NotFound(_))));
        assert!(matches!(service.delete_book(404).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let repo = MockRepository::default();
        let service = BookService::new(&repo);
        let created = service.create_book(&dune()).await.unwrap();

        service.delete_book(created.id).await.unwrap();
        assert!(matches!(service.get_book(created.id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn full_update_replaces_every_field() {
        let repo = MockRepository::default();
        let service = BookService::new(&repo);
        let created = service.create_book(&dune()).await.unwrap();

        let replacement = BookRequest {
            title: "Children of Dune".to_string(),
            author: "F. Herbert".to_string(),
            genre: "Science Fiction".to_string(),
            price: Decimal::new(1250, 2),
            stock: 0,
        };
        let updated = service.update_book(created.id, &replacement).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.title, "Children of Dune");
        assert_eq!(updated.stock, 0);
        assert_eq!(updated.price, Decimal::new(1250, 2));
    }

    #[tokio::test]
    async fn patch_touches_only_supplied_fields() {
        let repo = MockRepository::default();
        let service = BookService::new(&repo);
        let created = service.create_book(&dune()).await.unwrap();

        let patch = BookPatchRequest {
            stock: Some(12),
            ..BookPatchRequest::default()
        };
        let patched = service.patch_book(created.id, &patch).await.unwrap();

        assert_eq!(patched.stock, 12);
        assert_eq!(patched.title, created.title);
        assert_eq!(patched.price, created.price);
    }

    #[tokio::test]
    async fn empty_patch_is_bad_request_and_skips_store() {
        let repo = MockRepository::default();
        let service = BookService::new(&repo);
        let created = service.create_book(&dune()).await.unwrap();

        let result = service.patch_book(created.id, &BookPatchRequest::default()).await;

        assert!(matches!(result, Err(AppError::BadRequest(ref message)) if message == "No fields to update"));
        assert_eq!(repo.patch_calls(), 0);
        assert_eq!(service.get_book(created.id).await.unwrap(), created);
    }

    #[tokio::test]
    async fn zero_price_is_dropped_in_truthy_mode() {
        let repo = MockRepository::default();
        let service = BookService::new(&repo);
        let created = service.create_book(&dune()).await.unwrap();

        let patch = BookPatchRequest {
            price: Some(Decimal::ZERO),
            ..BookPatchRequest::default()
        };
        let result = service.patch_book(created.id, &patch).await;

        assert!(matches!(result, Err(AppError::BadRequest(_))));
        assert_eq!(service.get_book(created.id).await.unwrap().price, Decimal::new(999, 2));
    }

    #[tokio::test]
    async fn zero_price_with_other_field_keeps_price() {
        let repo = MockRepository::default();
        let service = BookService::new(&repo);
        let created = service.create_book(&dune()).await.unwrap();

        let patch = BookPatchRequest {
            price: Some(Decimal::ZERO),
            genre: Some("Classic".to_string()),
            ..BookPatchRequest::default()
        };
        let patched = service.patch_book(created.id, &patch).await.unwrap();

        assert_eq!(patched.genre, "Classic");
        assert_eq!(patched.price, Decimal::new(999, 2));
    }

    #[tokio::test]
    async fn zero_stock_is_applied_in_present_mode() {
        let repo = MockRepository::default();
        let service = BookService::new(&repo).with_patch_mode(PatchMode::Present);
        let created = service.create_book(&dune()).await.unwrap();

        let patch = BookPatchRequest {
            stock: Some(0),
            ..BookPatchRequest::default()
        };
        let patched = service.patch_book(created.id, &patch).await.unwrap();

        assert_eq!(patched.stock, 0);
    }

    #[tokio::test]
    async fn patch_of_missing_book_is_not_found() {
        let repo = MockRepository::default();
        let service = BookService::new(&repo);
        let patch = BookPatchRequest {
            title: Some("Ghost".to_string()),
            ..BookPatchRequest::default()
        };
        assert!(matches!(service.patch_book(99, &patch).await, Err(AppError::NotFound(_))));
        assert_eq!(repo.patch_calls(), 1);
    }
}
