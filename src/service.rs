//! Note service
//!
//! Validation, title derivation and the optimistic-concurrency update, on top of a
//! [`Storage`]. Handlers stay thin and call into this.

use chrono::NaiveDateTime;
use chrono::Utc;
use thiserror::Error;

use crate::config::Config;
use crate::identifier;
use crate::notes::Note;
use crate::notes::PLACEHOLDER_TITLE;
use crate::notes::derive_title;
use crate::storage;
use crate::storage::CreateNoteValues;
use crate::storage::ListNotesValues;
use crate::storage::SortKey;
use crate::storage::Storage;
use crate::storage::UpdateNoteValues;
use crate::timestamps::seconds_between;

/// Everything that can go wrong with a note
#[derive(Debug, Error)]
pub enum NoteError {
    /// Content is empty after trimming
    #[error("Note content cannot be empty.")]
    EmptyContent,

    /// Content is longer than allowed
    #[error("Note content cannot exceed {max_chars} characters.")]
    ContentTooLong {
        /// Configured maximum, in characters
        max_chars: usize,
    },

    /// No note with the given public ID
    #[error("Note not found")]
    NotFound,

    /// The note changed since the caller last saw it
    #[error("Note was changed somewhere else, reload it or overwrite the changes")]
    Conflict {
        /// The `updated_at` the caller based its edit on
        expected_updated_at: NaiveDateTime,

        /// The `updated_at` currently stored
        current_updated_at: NaiveDateTime,
    },

    /// CSRF token did not match the session
    #[error("Invalid request. Please try again.")]
    InvalidToken,

    /// The store could not be reached, fatal for the request
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),
}

impl From<storage::Error> for NoteError {
    fn from(error: storage::Error) -> Self {
        NoteError::StoreUnavailable(error.to_string())
    }
}

impl From<identifier::Error> for NoteError {
    fn from(error: identifier::Error) -> Self {
        NoteError::StoreUnavailable(error.to_string())
    }
}

/// Rules applied to every update
#[derive(Clone, Copy, Debug)]
pub struct UpdatePolicy {
    /// Maximum length of the content, in characters
    pub max_content_chars: usize,

    /// Tolerated difference between expected and stored `updated_at`, in seconds
    pub conflict_grace_seconds: i64,
}

impl UpdatePolicy {
    /// Policy from the application configuration
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_content_chars: config.content_max_chars,
            conflict_grace_seconds: config.conflict_grace_seconds,
        }
    }

    /// Is the expected timestamp a different version than the stored one?
    ///
    /// Compared per second, differences within the grace window are the same version
    pub fn is_conflict(&self, expected: &NaiveDateTime, current: &NaiveDateTime) -> bool {
        seconds_between(expected, current) > self.conflict_grace_seconds
    }
}

/// Requested change to a note
#[derive(Debug)]
pub struct NoteUpdate<'a> {
    /// New title, derived from the content when blank
    pub title: &'a str,

    /// New content, stored as given
    pub content: &'a str,

    /// The `updated_at` the edit is based on, skips the conflict check when missing
    pub expected_updated_at: Option<NaiveDateTime>,
}

/// A page of notes with the total number of matches
#[derive(Debug)]
pub struct NotePage {
    /// The notes on this page
    pub notes: Vec<Note>,

    /// Total number of matching notes
    pub total: u64,
}

impl NotePage {
    /// Are there notes beyond this page?
    pub fn has_more(&self, offset: u64, limit: u64) -> bool {
        offset.saturating_add(limit) < self.total
    }
}

/// Note service
#[derive(Clone)]
pub struct NoteService<S: Storage> {
    /// Where the notes live
    storage: S,

    /// Rules for updates
    policy: UpdatePolicy,
}

impl<S: Storage> NoteService<S> {
    /// Create the service around a storage handle
    pub fn new(storage: S, policy: UpdatePolicy) -> Self {
        Self { storage, policy }
    }

    /// Create an empty note, returns its public ID
    pub async fn create(&self) -> Result<String, NoteError> {
        let public_id = identifier::generate(&self.storage).await?;

        let values = CreateNoteValues {
            public_id: &public_id,
            title: PLACEHOLDER_TITLE,
            content: "",
        };

        self.storage.create_note(&values).await?;

        tracing::debug!("Created note {public_id}");

        Ok(public_id)
    }

    /// Get a single note
    pub async fn get(&self, public_id: &str) -> Result<Note, NoteError> {
        self.storage
            .find_single_note_by_public_id(public_id)
            .await?
            .ok_or(NoteError::NotFound)
    }

    /// List a page of notes, newest first according to the sort key
    pub async fn list(
        &self,
        search: &str,
        sort: SortKey,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Note>, NoteError> {
        let values = ListNotesValues {
            search: search.trim(),
            sort,
            offset,
            limit,
        };

        Ok(self.storage.find_notes(&values).await?)
    }

    /// Count the notes matching a search
    pub async fn count(&self, search: &str) -> Result<u64, NoteError> {
        Ok(self.storage.count_notes(search.trim()).await?)
    }

    /// A page of notes together with the total number of matches
    pub async fn page(
        &self,
        search: &str,
        sort: SortKey,
        offset: u64,
        limit: u64,
    ) -> Result<NotePage, NoteError> {
        let notes = self.list(search, sort, offset, limit).await?;
        let total = self.count(search).await?;

        Ok(NotePage { notes, total })
    }

    /// Update title and content of a note
    ///
    /// Rejects empty and too long content, derives a missing title and, when the caller
    /// tells which version it edited, refuses to overwrite a different version
    pub async fn update(&self, public_id: &str, update: &NoteUpdate<'_>) -> Result<Note, NoteError> {
        if update.content.trim().is_empty() {
            return Err(NoteError::EmptyContent);
        }

        if update.content.chars().count() > self.policy.max_content_chars {
            return Err(NoteError::ContentTooLong {
                max_chars: self.policy.max_content_chars,
            });
        }

        let title = match update.title.trim() {
            "" => derive_title(update.content),
            title => title.to_string(),
        };

        if let Some(expected_updated_at) = update.expected_updated_at {
            let current = self.get(public_id).await?;

            if self
                .policy
                .is_conflict(&expected_updated_at, &current.updated_at)
            {
                tracing::debug!(
                    "Conflict on note {public_id}: expected {expected_updated_at}, current {}",
                    current.updated_at
                );

                return Err(NoteError::Conflict {
                    expected_updated_at,
                    current_updated_at: current.updated_at,
                });
            }
        }

        let values = UpdateNoteValues {
            title: &title,
            content: update.content,
            updated_at: Utc::now().naive_utc(),
        };

        self.storage
            .update_note(public_id, &values)
            .await?
            .ok_or(NoteError::NotFound)
    }

    /// Delete a note, `false` when there was nothing to delete
    pub async fn delete(&self, public_id: &str) -> Result<bool, NoteError> {
        let deleted = self.storage.delete_note(public_id).await?;

        if deleted {
            tracing::debug!("Deleted note {public_id}");
        }

        Ok(deleted)
    }
}
