//! All things related to the storage of notes

use std::future::Future;

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::notes::Note;

pub use memory::Memory;
#[cfg(feature = "postgres")]
pub use postgres::Postgres;

mod memory;
#[cfg(feature = "postgres")]
mod postgres;

/// Setup the storage
#[cfg(not(feature = "postgres"))]
#[allow(clippy::unused_async)]
pub async fn setup() -> Result<Memory> {
    Ok(Memory::new())
}

/// Setup the storage
#[cfg(feature = "postgres")]
pub async fn setup() -> Result<Postgres> {
    Postgres::new().await
}

/// Storage errors
#[derive(Debug, Error)]
pub enum Error {
    /// A connection error with the storage
    #[error("Connection error: {0}")]
    Connection(String),
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Order of a note listing, always newest first
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Last edited first
    #[default]
    Updated,

    /// Last created first
    Created,
}

impl SortKey {
    /// Parse a sort key, anything unknown means [`SortKey::Updated`]
    pub fn parse_lenient(value: &str) -> Self {
        match value {
            "created" => SortKey::Created,
            _ => SortKey::Updated,
        }
    }

    /// Query parameter value of the sort key
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::Updated => "updated",
            SortKey::Created => "created",
        }
    }
}

/// Values to find notes
pub struct ListNotesValues<'a> {
    /// Case-insensitive substring on title or content, empty matches everything
    pub search: &'a str,

    /// Order of the notes
    pub sort: SortKey,

    /// Number of notes to skip
    pub offset: u64,

    /// Maximum number of notes to return
    pub limit: u64,
}

/// Values to create a note
pub struct CreateNoteValues<'a> {
    /// External identifier, must be unused
    pub public_id: &'a str,

    /// Title of the note
    pub title: &'a str,

    /// Content of the note
    pub content: &'a str,
}

/// Values to update a note
pub struct UpdateNoteValues<'a> {
    /// New title of the note
    pub title: &'a str,

    /// New content of the note
    pub content: &'a str,

    /// Moment of the update
    ///
    /// The stored `updated_at` becomes this moment, or a microsecond past the previous
    /// `updated_at` when the clock did not move forward
    pub updated_at: NaiveDateTime,
}

/// Storage with all supported operations
pub trait Storage: Clone + Send + Sync + 'static {
    /// Does a note with this public ID exist?
    fn note_exists(&self, public_id: &str) -> impl Future<Output = Result<bool>> + Send;

    /// Find a single note by its public ID
    fn find_single_note_by_public_id(
        &self,
        public_id: &str,
    ) -> impl Future<Output = Result<Option<Note>>> + Send;

    /// Find a page of notes
    fn find_notes(
        &self,
        values: &ListNotesValues<'_>,
    ) -> impl Future<Output = Result<Vec<Note>>> + Send;

    /// Count the notes matching a search, empty matches everything
    fn count_notes(&self, search: &str) -> impl Future<Output = Result<u64>> + Send;

    /// Create a note
    fn create_note(
        &self,
        values: &CreateNoteValues<'_>,
    ) -> impl Future<Output = Result<Note>> + Send;

    /// Update title, content and `updated_at` of a note in a single write
    ///
    /// `None` when the note does not exist (anymore)
    fn update_note(
        &self,
        public_id: &str,
        values: &UpdateNoteValues<'_>,
    ) -> impl Future<Output = Result<Option<Note>>> + Send;

    /// Delete a note, returns whether a note was deleted
    fn delete_note(&self, public_id: &str) -> impl Future<Output = Result<bool>> + Send;
}
