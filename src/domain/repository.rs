use crate::domain::note::{Note, Page};
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;

/// Credential store. `insert_user` must reject a taken username with
/// `DomainError::AlreadyExists`, atomically with the insert itself.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User>;
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>>;
}

#[async_trait]
pub trait NoteRepository: Send + Sync {
    async fn insert_note(&self, owner_id: i64, title: &str, content: &str) -> Result<Note>;
    async fn list_notes_by_owner(&self, owner_id: i64, page: Page) -> Result<Vec<Note>>;
}
