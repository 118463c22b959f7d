//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::cmp::Reverse;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicI64;
use std::sync::atomic::Ordering;

use chrono::TimeDelta;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::notes::Note;

use super::CreateNoteValues;
use super::ListNotesValues;
use super::Result;
use super::SortKey;
use super::Storage;
use super::UpdateNoteValues;

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug, Default)]
pub struct Memory {
    /// All notes in storage, by public ID
    notes: Arc<Mutex<HashMap<String, Note>>>,

    /// Last handed out internal ID
    last_id: Arc<AtomicI64>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self::default()
    }
}

/// Does the note match the (already lowercased) search?
fn matches_search(note: &Note, search: &str) -> bool {
    search.is_empty()
        || note.title.to_lowercase().contains(search)
        || note.content.to_lowercase().contains(search)
}

impl Storage for Memory {
    async fn note_exists(&self, public_id: &str) -> Result<bool> {
        Ok(self.notes.lock().await.contains_key(public_id))
    }

    async fn find_single_note_by_public_id(&self, public_id: &str) -> Result<Option<Note>> {
        Ok(self.notes.lock().await.get(public_id).cloned())
    }

    async fn find_notes(&self, values: &ListNotesValues<'_>) -> Result<Vec<Note>> {
        let search = values.search.to_lowercase();

        let mut notes = self
            .notes
            .lock()
            .await
            .values()
            .filter(|note| matches_search(note, &search))
            .cloned()
            .collect::<Vec<Note>>();

        match values.sort {
            SortKey::Updated => notes.sort_by_key(|note| Reverse((note.updated_at, note.id))),
            SortKey::Created => notes.sort_by_key(|note| Reverse((note.created_at, note.id))),
        }

        Ok(notes
            .into_iter()
            .skip(usize::try_from(values.offset).unwrap_or(usize::MAX))
            .take(usize::try_from(values.limit).unwrap_or(usize::MAX))
            .collect())
    }

    async fn count_notes(&self, search: &str) -> Result<u64> {
        let search = search.to_lowercase();

        let count = self
            .notes
            .lock()
            .await
            .values()
            .filter(|note| matches_search(note, &search))
            .count();

        Ok(count as u64)
    }

    async fn create_note(&self, values: &CreateNoteValues<'_>) -> Result<Note> {
        let now = Utc::now().naive_utc();

        let note = Note {
            id: self.last_id.fetch_add(1, Ordering::SeqCst) + 1,
            public_id: values.public_id.to_string(),
            title: values.title.to_string(),
            content: values.content.to_string(),
            created_at: now,
            updated_at: now,
        };

        self.notes
            .lock()
            .await
            .insert(note.public_id.clone(), note.clone());

        Ok(note)
    }

    async fn update_note(
        &self,
        public_id: &str,
        values: &UpdateNoteValues<'_>,
    ) -> Result<Option<Note>> {
        Ok(self.notes.lock().await.get_mut(public_id).map(|note| {
            note.title = values.title.to_string();
            note.content = values.content.to_string();
            note.updated_at = values
                .updated_at
                .max(note.updated_at + TimeDelta::microseconds(1));

            note.clone()
        }))
    }

    async fn delete_note(&self, public_id: &str) -> Result<bool> {
        Ok(self.notes.lock().await.remove(public_id).is_some())
    }
}
