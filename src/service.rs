pub mod auth;
pub mod book;
