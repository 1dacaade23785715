pub mod error;
pub mod note;
pub mod repository;
pub mod spelling;
pub mod user;
