use crate::domain::note::{Note, Page};
use crate::domain::repository::NoteRepository;
use anyhow::Result;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument};

#[derive(Default)]
struct NoteTable {
    // keyed by id so iteration yields ascending id order
    notes: BTreeMap<i64, Note>,
    last_id: i64,
}

#[derive(Clone, Default)]
pub struct InMemoryNoteRepository {
    storage: Arc<RwLock<NoteTable>>,
}

impl InMemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl NoteRepository for InMemoryNoteRepository {
    #[instrument(skip(self, title, content))]
    async fn insert_note(&self, owner_id: i64, title: &str, content: &str) -> Result<Note> {
        let mut storage = self.storage.write().await;
        storage.last_id += 1;
        let note = Note {
            id: storage.last_id,
            title: title.to_string(),
            content: content.to_string(),
            owner_id,
        };
        storage.notes.insert(note.id, note.clone());
        debug!(note_id = note.id, owner_id, "Note saved to memory storage");
        Ok(note)
    }

    #[instrument(skip(self))]
    async fn list_notes_by_owner(&self, owner_id: i64, page: Page) -> Result<Vec<Note>> {
        let storage = self.storage.read().await;
        let notes: Vec<Note> = storage
            .notes
            .values()
            .filter(|n| n.owner_id == owner_id)
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .cloned()
            .collect();
        debug!(owner_id, count = notes.len(), "Notes listed from memory storage");
        Ok(notes)
    }
}
