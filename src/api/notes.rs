//! Notes endpoints
//!
//! Listing, a single note, saving, creating and deleting

use axum::Extension;
use axum::response::Redirect;
use serde::Deserialize;
use serde::Serialize;

use crate::config::Config;
use crate::notes::Note;
use crate::service::NoteError;
use crate::service::NoteService;
use crate::service::NoteUpdate;
use crate::session::CsrfKeys;
use crate::session::Session;
use crate::session::verify_token;
use crate::storage::SortKey;
use crate::storage::Storage;
use crate::timestamps;

use super::Error;
use super::Form;
use super::PathParameters;
use super::QueryParameters;
use super::Success;
use super::parse_offset;

/// Number of notes per page
pub const PAGE_SIZE: u64 = 20;

/// Note response going to the user
///
/// The internal ID stays inside, timestamps are wire formatted
#[derive(Debug, Serialize)]
pub struct NoteResponse {
    /// Public ID
    pub hash_id: String,

    /// Title
    pub title: String,

    /// Content
    pub content: String,

    /// Creation date
    pub created_at: String,

    /// Last updated at
    pub updated_at: String,
}

impl NoteResponse {
    /// Create a response from a [`Note`]
    fn from_note(note: Note, config: &Config) -> Self {
        Self {
            created_at: timestamps::format(&note.created_at, &config.display_timezone),
            updated_at: timestamps::format(&note.updated_at, &config.display_timezone),
            hash_id: note.public_id,
            title: note.title,
            content: note.content,
        }
    }

    /// Create a response from multiple [`Note`]s
    fn from_note_multiple(notes: Vec<Note>, config: &Config) -> Vec<Self> {
        notes
            .into_iter()
            .map(|note| Self::from_note(note, config))
            .collect()
    }
}

/// Query parameters of the listing, all optional and leniently parsed
#[derive(Debug, Default, Deserialize)]
pub struct ListParameters {
    /// Search on title or content
    q: Option<String>,

    /// `updated` or `created`
    sort: Option<String>,

    /// Number of notes to skip
    offset: Option<String>,
}

/// A page of notes
#[derive(Debug, Serialize)]
pub struct NotePageResponse {
    notes: Vec<NoteResponse>,
    #[serde(rename = "hasMore")]
    has_more: bool,
    total: u64,
    offset: u64,
    limit: u64,
}

/// List notes
///
/// Request:
/// ```sh
/// curl 'http://localhost:6000/api/notes?q=groceries&sort=created&offset=20'
/// ```
pub async fn list<S: Storage>(
    Extension(service): Extension<NoteService<S>>,
    Extension(config): Extension<Config>,
    QueryParameters(parameters): QueryParameters<ListParameters>,
) -> Result<Success<NotePageResponse>, Error> {
    let search = parameters.q.unwrap_or_default();
    let sort = SortKey::parse_lenient(parameters.sort.as_deref().unwrap_or_default());
    let offset = parse_offset(parameters.offset.as_deref());

    let page = service
        .page(&search, sort, offset, PAGE_SIZE)
        .await
        .map_err(|err| Error::from_note_error(err, &config))?;

    Ok(Success::ok(NotePageResponse {
        has_more: page.has_more(offset, PAGE_SIZE),
        total: page.total,
        notes: NoteResponse::from_note_multiple(page.notes, &config),
        offset,
        limit: PAGE_SIZE,
    }))
}

/// Single note body
#[derive(Debug, Serialize)]
pub struct SingleNoteResponse {
    note: NoteResponse,
}

/// Get a single note
///
/// Request:
/// ```sh
/// curl http://localhost:6000/note/<hash_id>
/// ```
pub async fn single<S: Storage>(
    Extension(service): Extension<NoteService<S>>,
    Extension(config): Extension<Config>,
    PathParameters(hash_id): PathParameters<String>,
) -> Result<Success<SingleNoteResponse>, Error> {
    let note = service
        .get(&hash_id)
        .await
        .map_err(|err| Error::from_note_error(err, &config))?;

    Ok(Success::ok(SingleNoteResponse {
        note: NoteResponse::from_note(note, &config),
    }))
}

/// Submitted editor form
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaveNoteForm {
    /// CSRF token from `/api/session`
    csrf_token: String,

    /// Title, derived from the content when blank
    title: String,

    /// Content
    content: String,

    /// `"1"` for an autosave, anything else is a manual save
    auto_save: String,

    /// The `updated_at` the edit is based on, wire formatted
    expected_updated_at: Option<String>,
}

/// Saved note body
#[derive(Debug, Serialize)]
pub struct SaveNoteResponse {
    message: &'static str,
    timestamp: String,
}

/// Save a note
///
/// Request:
/// ```sh
/// curl -X POST http://localhost:6000/note/<hash_id> \
///     --cookie 'jotter_session=<session>' \
///     -d 'csrf_token=<token>' \
///     -d 'title=' \
///     -d 'content=Hello #world' \
///     -d 'auto_save=1' \
///     -d 'expected_updated_at=2024-06-01 12:00:00'
/// ```
pub async fn save<S: Storage>(
    Extension(service): Extension<NoteService<S>>,
    Extension(config): Extension<Config>,
    Extension(csrf_keys): Extension<CsrfKeys>,
    session: Session,
    PathParameters(hash_id): PathParameters<String>,
    Form(form): Form<SaveNoteForm>,
) -> Result<Success<SaveNoteResponse>, Error> {
    if !verify_token(&csrf_keys, &session, &form.csrf_token) {
        return Err(Error::from_note_error(NoteError::InvalidToken, &config));
    }

    let expected_updated_at = match form.expected_updated_at.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(
            timestamps::parse(value, &config.display_timezone)
                .ok_or_else(|| Error::bad_request("Invalid `expected_updated_at` timestamp"))?,
        ),
    };

    let update = NoteUpdate {
        title: &form.title,
        content: &form.content,
        expected_updated_at,
    };

    let note = service
        .update(&hash_id, &update)
        .await
        .map_err(|err| Error::from_note_error(err, &config))?;

    let message = if form.auto_save == "1" {
        "Note auto-saved successfully"
    } else {
        "Note saved successfully"
    };

    Ok(Success::ok(SaveNoteResponse {
        message,
        timestamp: timestamps::format(&note.updated_at, &config.display_timezone),
    }))
}

/// Create a note and go edit it
///
/// Request:
/// ```sh
/// curl -i http://localhost:6000/create
/// ```
pub async fn create<S: Storage>(
    Extension(service): Extension<NoteService<S>>,
    Extension(config): Extension<Config>,
) -> Result<Redirect, Error> {
    let hash_id = service
        .create()
        .await
        .map_err(|err| Error::from_note_error(err, &config))?;

    let location = config
        .base_url
        .join(&format!("note/{hash_id}"))
        .map_err(|err| Error::server_error(err, &config))?;

    Ok(Redirect::to(location.as_str()))
}

/// Submitted delete form
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DeleteNoteForm {
    /// Public ID of the note
    hash_id: String,

    /// CSRF token from `/api/session`
    csrf_token: String,
}

/// Delete a note, then go back to the listing
///
/// The outcome is reported in the `success` or `error` query parameter, an unreadable
/// form included
///
/// Request:
/// ```sh
/// curl -i -X POST http://localhost:6000/delete \
///     --cookie 'jotter_session=<session>' \
///     -d 'hash_id=<hash_id>' \
///     -d 'csrf_token=<token>'
/// ```
pub async fn delete<S: Storage>(
    Extension(service): Extension<NoteService<S>>,
    Extension(config): Extension<Config>,
    Extension(csrf_keys): Extension<CsrfKeys>,
    session: Session,
    form: Result<Form<DeleteNoteForm>, Error>,
) -> Redirect {
    let outcome = match form {
        Ok(Form(form)) if verify_token(&csrf_keys, &session, &form.csrf_token) => {
            match service.delete(form.hash_id.trim()).await {
                Ok(true) => Ok(()),
                Ok(false) => Err(Error::from_note_error(NoteError::NotFound, &config)),
                Err(err) => Err(Error::from_note_error(err, &config)),
            }
        }
        Ok(_) => Err(Error::from_note_error(NoteError::InvalidToken, &config)),
        Err(err) => Err(err),
    };

    let mut location = config.base_url.clone();

    match outcome {
        Ok(()) => {
            location
                .query_pairs_mut()
                .append_pair("success", "Note deleted successfully.");
        }
        Err(err) => {
            location.query_pairs_mut().append_pair("error", err.message());
        }
    }

    Redirect::to(location.as_str())
}
