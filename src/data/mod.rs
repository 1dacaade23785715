pub mod memory;
pub mod sqlite;
pub mod user_repository;
