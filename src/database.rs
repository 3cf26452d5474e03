pub mod book;
pub mod book_patch;
pub mod postgres_repository;
pub mod user;
