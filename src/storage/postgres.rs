//! Postgres storage

use std::time::Duration;

use chrono::NaiveDateTime;
use chrono::Utc;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

use crate::notes::Note;

use super::CreateNoteValues;
use super::Error;
use super::ListNotesValues;
use super::Result;
use super::SortKey;
use super::Storage;
use super::UpdateNoteValues;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Columns of a note, in the order of [`SqlxNote`]
const NOTE_COLUMNS: &str = "id, hash_id, title, content, created_at, updated_at";

/// Filter shared by listing and counting
///
/// `$1` is the raw search, `$2` the escaped `ILIKE` pattern
const SEARCH_FILTER: &str = "($1 = '' OR title ILIKE $2 OR content ILIKE $2)";

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage
    ///
    /// Use the `DATABASE_URL` environment variable
    ///
    /// Migrations will be run
    pub async fn new() -> Result<Self> {
        let database_connection_string = std::env::var("DATABASE_URL")
            .map_err(|_| Error::Connection("`DATABASE_URL` is not set".to_string()))?;

        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_connection_string)
            .await
            .map_err(connection_error)?;

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with existing pool
    ///
    /// Migrations will be run
    pub async fn new_with_pool(connection_pool: PgPool) -> Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .map_err(|err| Error::Connection(format!("Migrations could not run: {err}")))?;

        Ok(Self { connection_pool })
    }
}

/// `SQLx` version of note
#[derive(sqlx::FromRow)]
struct SqlxNote {
    /// Internal ID
    id: i64,

    /// Public ID
    hash_id: String,

    /// Title
    title: String,

    /// Content
    content: String,

    /// Creation date
    created_at: NaiveDateTime,

    /// Last updated at
    updated_at: NaiveDateTime,
}

impl Note {
    /// Create note from `SQLx` version
    fn from_sqlx_note(note: SqlxNote) -> Self {
        Self {
            id: note.id,
            public_id: note.hash_id,
            title: note.title,
            content: note.content,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }

    /// Maybe create note from `SQLx` version
    fn from_sqlx_note_optional(note: Option<SqlxNote>) -> Option<Self> {
        note.map(Self::from_sqlx_note)
    }

    /// Create multiple notes from `SQLx` version
    fn from_sqlx_note_multiple(notes: Vec<SqlxNote>) -> Vec<Self> {
        notes.into_iter().map(Self::from_sqlx_note).collect()
    }
}

/// Escape a search for use inside an `ILIKE` pattern
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');

    for ch in search.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }

    pattern.push('%');
    pattern
}

impl Storage for Postgres {
    async fn note_exists(&self, public_id: &str) -> Result<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS (SELECT 1 FROM notes WHERE hash_id = $1)
            ",
        )
        .bind(public_id)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(exists)
    }

    async fn find_single_note_by_public_id(&self, public_id: &str) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, SqlxNote>(&format!(
            r"
            SELECT {NOTE_COLUMNS}
            FROM notes
            WHERE hash_id = $1
            LIMIT 1
            "
        ))
        .bind(public_id)
        .fetch_optional(&self.connection_pool)
        .await
        .map(Note::from_sqlx_note_optional)
        .map_err(connection_error)?;

        Ok(note)
    }

    async fn find_notes(&self, values: &ListNotesValues<'_>) -> Result<Vec<Note>> {
        let order_by = match values.sort {
            SortKey::Updated => "updated_at DESC, id DESC",
            SortKey::Created => "created_at DESC, id DESC",
        };

        let notes = sqlx::query_as::<_, SqlxNote>(&format!(
            r"
            SELECT {NOTE_COLUMNS}
            FROM notes
            WHERE {SEARCH_FILTER}
            ORDER BY {order_by}
            LIMIT $3 OFFSET $4
            "
        ))
        .bind(values.search)
        .bind(like_pattern(values.search))
        .bind(i64::try_from(values.limit).unwrap_or(i64::MAX))
        .bind(i64::try_from(values.offset).unwrap_or(i64::MAX))
        .fetch_all(&self.connection_pool)
        .await
        .map(Note::from_sqlx_note_multiple)
        .map_err(connection_error)?;

        Ok(notes)
    }

    async fn count_notes(&self, search: &str) -> Result<u64> {
        let count = sqlx::query_scalar::<_, i64>(&format!(
            r"
            SELECT COUNT(*)
            FROM notes
            WHERE {SEARCH_FILTER}
            "
        ))
        .bind(search)
        .bind(like_pattern(search))
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn create_note(&self, values: &CreateNoteValues<'_>) -> Result<Note> {
        let now = Utc::now().naive_utc();

        let note = sqlx::query_as::<_, SqlxNote>(&format!(
            r"
            INSERT INTO notes (hash_id, title, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING {NOTE_COLUMNS}
            "
        ))
        .bind(values.public_id)
        .bind(values.title)
        .bind(values.content)
        .bind(now)
        .fetch_one(&self.connection_pool)
        .await
        .map(Note::from_sqlx_note)
        .map_err(connection_error)?;

        Ok(note)
    }

    async fn update_note(
        &self,
        public_id: &str,
        values: &UpdateNoteValues<'_>,
    ) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, SqlxNote>(&format!(
            r"
            UPDATE notes
            SET title = $1,
                content = $2,
                updated_at = GREATEST($3, updated_at + INTERVAL '1 microsecond')
            WHERE hash_id = $4
            RETURNING {NOTE_COLUMNS}
            "
        ))
        .bind(values.title)
        .bind(values.content)
        .bind(values.updated_at)
        .bind(public_id)
        .fetch_optional(&self.connection_pool)
        .await
        .map(Note::from_sqlx_note_optional)
        .map_err(connection_error)?;

        Ok(note)
    }

    async fn delete_note(&self, public_id: &str) -> Result<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM notes
            WHERE hash_id = $1
            ",
        )
        .bind(public_id)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Convert `SQLx` to storage connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Connection(err.to_string())
}
