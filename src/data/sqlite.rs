use crate::domain::error::DomainError;
use crate::domain::note::{Note, Page};
use crate::domain::repository::{NoteRepository, UserRepository};
use crate::domain::user::User;
use anyhow::Result;
use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use tracing::{debug, instrument, warn};

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            username: row.username,
            password_hash: row.password_hash,
        }
    }
}

#[derive(FromRow)]
struct NoteRow {
    id: i64,
    title: String,
    content: String,
    owner_id: i64,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            content: row.content,
            owner_id: row.owner_id,
        }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    #[instrument(skip(self, password_hash))]
    async fn insert_user(&self, username: &str, password_hash: &str) -> Result<User> {
        let result = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (username, password_hash) VALUES (?, ?) \
             RETURNING id, username, password_hash",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(row) => {
                let user = User::from(row);
                debug!(user_id = user.id, "User inserted");
                Ok(user)
            }
            Err(e) if is_unique_violation(&e) => {
                warn!(username = username, "Insert rejected by unique constraint");
                Err(DomainError::AlreadyExists.into())
            }
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash FROM users WHERE username = ?",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(User::from))
    }
}

#[derive(Clone)]
pub struct SqliteNoteRepository {
    pool: SqlitePool,
}

impl SqliteNoteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NoteRepository for SqliteNoteRepository {
    #[instrument(skip(self, title, content))]
    async fn insert_note(&self, owner_id: i64, title: &str, content: &str) -> Result<Note> {
        let row = sqlx::query_as::<_, NoteRow>(
            "INSERT INTO notes (title, content, owner_id) VALUES (?, ?, ?) \
             RETURNING id, title, content, owner_id",
        )
        .bind(title)
        .bind(content)
        .bind(owner_id)
        .fetch_one(&self.pool)
        .await?;

        debug!(note_id = row.id, "Note inserted");
        Ok(row.into())
    }

    #[instrument(skip(self))]
    async fn list_notes_by_owner(&self, owner_id: i64, page: Page) -> Result<Vec<Note>> {
        let rows = sqlx::query_as::<_, NoteRow>(
            "SELECT id, title, content, owner_id FROM notes \
             WHERE owner_id = ? ORDER BY id ASC LIMIT ? OFFSET ?",
        )
        .bind(owner_id)
        .bind(i64::from(page.limit))
        .bind(i64::from(page.skip))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Note::from).collect())
    }
}
