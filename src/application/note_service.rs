use crate::domain::error::DomainError;
use crate::domain::note::{CreateNote, Note, Page};
use crate::domain::repository::NoteRepository;
use crate::domain::spelling::SpellChecker;
use crate::domain::user::User;
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, instrument, warn};

pub struct NoteService {
    repository: Arc<dyn NoteRepository>,
    spell_checker: Arc<dyn SpellChecker>,
}

impl NoteService {
    pub fn new(repository: Arc<dyn NoteRepository>, spell_checker: Arc<dyn SpellChecker>) -> Self {
        Self {
            repository,
            spell_checker,
        }
    }

    #[instrument(skip(self, owner, req), fields(owner_id = owner.id))]
    pub async fn create_note(&self, owner: &User, req: CreateNote) -> Result<Note> {
        let title_errors = self.spell_checker.check(&req.title);
        let content_errors = self.spell_checker.check(&req.content);

        if !title_errors.is_empty() || !content_errors.is_empty() {
            warn!(
                title_errors = title_errors.len(),
                content_errors = content_errors.len(),
                "Note rejected by spelling check"
            );
            return Err(DomainError::Spelling {
                title_errors,
                content_errors,
            }
            .into());
        }

        let note = self
            .repository
            .insert_note(owner.id, &req.title, &req.content)
            .await?;
        info!(note_id = note.id, "Note created");
        Ok(note)
    }

    #[instrument(skip(self, owner), fields(owner_id = owner.id))]
    pub async fn list_notes(&self, owner: &User, page: Page) -> Result<Vec<Note>> {
        self.repository.list_notes_by_owner(owner.id, page).await
    }
}
