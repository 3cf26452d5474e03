pub mod book;
pub mod error;
pub mod health;
pub mod index;
pub mod user;
