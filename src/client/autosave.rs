//! Autosave
//!
//! [`Autosave`] is the editor side of saving: it notices edits, debounces them, hands out
//! save requests one at a time and reconciles the answers. It never does IO itself and
//! is driven with explicit instants, [`Autosaver`] drives it against a [`SaveTransport`].

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Quiet period after the last edit before an autosave starts
pub const DEBOUNCE: Duration = Duration::from_millis(3000);

/// How long a successful save stays visible
pub const SUCCESS_DISPLAY: Duration = Duration::from_millis(2000);

/// How long a failed save stays visible
pub const ERROR_DISPLAY: Duration = Duration::from_millis(3000);

/// Warning shown when leaving with unsaved changes
pub const UNLOAD_WARNING: &str = "You have unsaved changes. Are you sure you want to leave?";

/// Title and content as edited
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub content: String,
}

impl Draft {
    pub fn new(title: &str, content: &str) -> Self {
        Self {
            title: title.to_string(),
            content: content.to_string(),
        }
    }
}

/// What the save indicator shows
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveState {
    /// Nothing to save
    Saved,

    /// Edits not acknowledged by the server yet
    Unsaved,

    /// A save is in flight
    Saving,

    /// The last save succeeded, shown for a moment
    Success,

    /// The last save failed, shown for a moment
    Error,
}

/// A save to submit to `POST /note/{hash_id}`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveRequest {
    /// Public ID of the note
    pub hash_id: String,

    /// What to save
    pub draft: Draft,

    /// Started by the debounce rather than by the user
    pub auto_save: bool,

    /// The server timestamp the draft is based on
    pub expected_updated_at: Option<String>,
}

impl SaveRequest {
    /// Path to post the request to
    pub fn path(&self) -> String {
        format!("note/{}", self.hash_id)
    }

    /// URL-encoded form body
    pub fn to_form(&self, csrf_token: &str) -> String {
        let mut form = url::form_urlencoded::Serializer::new(String::new());

        form.append_pair("csrf_token", csrf_token)
            .append_pair("title", &self.draft.title)
            .append_pair("content", &self.draft.content)
            .append_pair("auto_save", if self.auto_save { "1" } else { "0" });

        if let Some(expected_updated_at) = &self.expected_updated_at {
            form.append_pair("expected_updated_at", expected_updated_at);
        }

        form.finish()
    }
}

/// How a save ended
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Stored, with the new server timestamp
    Saved { timestamp: String },

    /// Someone else changed the note, the server copy has this timestamp
    Conflict {
        current_updated_at: String,
        message: String,
    },

    /// Any other failure, including the network
    Failed { message: String },
}

/// Body of a save response, both outcomes
#[derive(Debug, Deserialize)]
struct SaveResponse {
    success: bool,
    #[serde(default)]
    message: String,
    timestamp: Option<String>,
    current_updated_at: Option<String>,
}

impl SaveOutcome {
    /// Interpret a save response body
    pub fn from_json(body: &[u8]) -> Self {
        match serde_json::from_slice::<SaveResponse>(body) {
            Ok(SaveResponse {
                success: true,
                timestamp: Some(timestamp),
                ..
            }) => SaveOutcome::Saved { timestamp },
            Ok(SaveResponse {
                current_updated_at: Some(current_updated_at),
                message,
                ..
            }) => SaveOutcome::Conflict {
                current_updated_at,
                message,
            },
            Ok(SaveResponse { message, .. }) => SaveOutcome::Failed { message },
            Err(err) => SaveOutcome::Failed {
                message: format!("Unreadable response: {err}"),
            },
        }
    }
}

/// Leaving the page with unsaved edits
#[derive(Debug)]
pub struct Unload {
    /// Best-effort save of the current draft
    pub request: SaveRequest,

    /// Warning to show, whatever happens to the request
    pub warning: &'static str,
}

/// Autosave state machine for a single note
#[derive(Debug)]
pub struct Autosave {
    hash_id: String,

    /// Last values the server acknowledged
    acknowledged: Draft,

    /// Values in the editor
    current: Draft,

    /// Server timestamp the next save is based on
    expected_updated_at: Option<String>,

    state: SaveState,

    /// Draft of the save that left but did not come back yet
    in_flight: Option<Draft>,

    /// Debounce deadline, survives a save in flight
    deadline: Option<Instant>,

    /// End of the success/error display
    display_until: Option<Instant>,

    /// Kind of the last save, for the labels
    last_auto_save: bool,

    /// Server timestamp of a conflicting copy
    conflict: Option<String>,

    last_error: Option<String>,
}

impl Autosave {
    /// Start editing a note as loaded from the server
    pub fn new(hash_id: &str, loaded: Draft, updated_at: Option<String>) -> Self {
        Self {
            hash_id: hash_id.to_string(),
            current: loaded.clone(),
            acknowledged: loaded,
            expected_updated_at: updated_at,
            state: SaveState::Saved,
            in_flight: None,
            deadline: None,
            display_until: None,
            last_auto_save: false,
            conflict: None,
            last_error: None,
        }
    }

    pub fn state(&self) -> SaveState {
        self.state
    }

    pub fn draft(&self) -> &Draft {
        &self.current
    }

    /// Do the editor values differ from the acknowledged ones?
    pub fn is_dirty(&self) -> bool {
        self.current != self.acknowledged
    }

    pub fn is_saving(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Server timestamp the next save is based on
    pub fn expected_updated_at(&self) -> Option<&str> {
        self.expected_updated_at.as_deref()
    }

    /// Server timestamp of the conflicting copy, if any
    pub fn conflict(&self) -> Option<&str> {
        self.conflict.as_deref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Next moment [`Autosave::poll`] has something to do
    pub fn next_deadline(&self) -> Option<Instant> {
        match (self.deadline, self.display_until) {
            (Some(deadline), Some(display_until)) => Some(deadline.min(display_until)),
            (deadline, display_until) => deadline.or(display_until),
        }
    }

    /// Label of the save indicator
    pub fn label(&self) -> &'static str {
        match self.state {
            SaveState::Saved => "Saved",
            SaveState::Unsaved => "Save",
            SaveState::Saving if self.last_auto_save => "Auto-saving...",
            SaveState::Saving => "Saving...",
            SaveState::Success if self.last_auto_save => "Auto-saved!",
            SaveState::Success => "Saved!",
            SaveState::Error => "Save failed",
        }
    }

    /// The editor changed
    ///
    /// Restarts the debounce while there is something to save
    pub fn edit(&mut self, draft: Draft, now: Instant) {
        self.current = draft;

        self.deadline = if self.is_dirty() {
            Some(now + DEBOUNCE)
        } else {
            None
        };

        if matches!(self.state, SaveState::Saved | SaveState::Unsaved) {
            self.state = self.settled_state();
        }
    }

    /// Advance time, returns an autosave to submit when one is due
    pub fn poll(&mut self, now: Instant) -> Option<SaveRequest> {
        if self.display_until.is_some_and(|display_until| now >= display_until) {
            self.display_until = None;
            self.state = self.settled_state();
        }

        let deadline = self.deadline?;

        if now < deadline || self.in_flight.is_some() {
            return None;
        }

        self.deadline = None;

        if self.is_dirty() {
            Some(self.start(true))
        } else {
            None
        }
    }

    /// Save right away, only when there are unsaved edits and nothing in flight
    pub fn save_now(&mut self) -> Option<SaveRequest> {
        if self.state != SaveState::Unsaved || self.in_flight.is_some() || !self.is_dirty() {
            return None;
        }

        Some(self.start(false))
    }

    /// The in-flight save came back
    pub fn resolve(&mut self, outcome: SaveOutcome, now: Instant) {
        let Some(in_flight) = self.in_flight.take() else {
            tracing::debug!("Save outcome without a save in flight");
            return;
        };

        match outcome {
            SaveOutcome::Saved { timestamp } => {
                self.acknowledged = in_flight;
                self.expected_updated_at = Some(timestamp);
                self.conflict = None;
                self.last_error = None;
                self.state = SaveState::Success;
                self.display_until = Some(now + SUCCESS_DISPLAY);

                // edits made while the save was in flight still need saving
                if self.is_dirty() && self.deadline.is_none() {
                    self.deadline = Some(now + DEBOUNCE);
                }
            }
            SaveOutcome::Conflict {
                current_updated_at,
                message,
            } => {
                self.conflict = Some(current_updated_at);
                self.fail(message, now);
            }
            SaveOutcome::Failed { message } => self.fail(message, now),
        }
    }

    /// Keep the local draft after a conflict, based on the server copy
    pub fn overwrite(&mut self) -> Option<SaveRequest> {
        if self.in_flight.is_some() {
            return None;
        }

        let current_updated_at = self.conflict.take()?;
        self.expected_updated_at = Some(current_updated_at);

        Some(self.start(false))
    }

    /// Drop the local draft in favor of the server copy
    pub fn reload(&mut self, server: Draft, updated_at: String) {
        self.current = server.clone();
        self.acknowledged = server;
        self.expected_updated_at = Some(updated_at);
        self.conflict = None;
        self.last_error = None;
        self.deadline = None;
        self.display_until = None;

        if self.in_flight.is_none() {
            self.state = SaveState::Saved;
        }
    }

    /// The page is about to go away
    ///
    /// Does not touch the state, a save in flight does not stop the request
    pub fn before_unload(&self) -> Option<Unload> {
        if !self.is_dirty() {
            return None;
        }

        Some(Unload {
            request: self.request(true),
            warning: UNLOAD_WARNING,
        })
    }

    /// Last chance save when the editor closes
    pub fn flush(&mut self) -> Option<SaveRequest> {
        if self.in_flight.is_some() || !self.is_dirty() {
            return None;
        }

        Some(self.start(true))
    }

    fn request(&self, auto_save: bool) -> SaveRequest {
        SaveRequest {
            hash_id: self.hash_id.clone(),
            draft: self.current.clone(),
            auto_save,
            expected_updated_at: self.expected_updated_at.clone(),
        }
    }

    fn start(&mut self, auto_save: bool) -> SaveRequest {
        let request = self.request(auto_save);

        self.in_flight = Some(request.draft.clone());
        self.last_auto_save = auto_save;
        self.deadline = None;
        self.display_until = None;
        self.state = SaveState::Saving;

        request
    }

    fn fail(&mut self, message: String, now: Instant) {
        tracing::debug!("Save of {} failed: {message}", self.hash_id);

        self.last_error = Some(message);
        self.state = SaveState::Error;
        self.display_until = Some(now + ERROR_DISPLAY);
    }

    fn settled_state(&self) -> SaveState {
        if self.is_dirty() {
            SaveState::Unsaved
        } else {
            SaveState::Saved
        }
    }
}

/// Something that can deliver a save to the server
pub trait SaveTransport: Send {
    /// Submit the save, every failure ends up as [`SaveOutcome::Failed`]
    fn save(&mut self, request: &SaveRequest) -> impl Future<Output = SaveOutcome> + Send;
}

/// Drives an [`Autosave`] with real time
pub struct Autosaver<T: SaveTransport> {
    autosave: Autosave,
    transport: T,
}

impl<T: SaveTransport> Autosaver<T> {
    pub fn new(autosave: Autosave, transport: T) -> Self {
        Self {
            autosave,
            transport,
        }
    }

    /// Apply edits from the channel until it closes, saving along the way
    ///
    /// Saves still pending when the channel closes are flushed, the final state is returned
    pub async fn run(mut self, mut edits: mpsc::Receiver<Draft>) -> Autosave {
        loop {
            let deadline = self.autosave.next_deadline();

            tokio::select! {
                edit = edits.recv() => match edit {
                    Some(draft) => self.autosave.edit(draft, Instant::now()),
                    None => break,
                },
                () = wait_until(deadline) => {
                    if let Some(request) = self.autosave.poll(Instant::now()) {
                        self.submit(request).await;
                    }
                }
            }
        }

        if let Some(request) = self.autosave.flush() {
            self.submit(request).await;
        }

        self.autosave
    }

    async fn submit(&mut self, request: SaveRequest) {
        let outcome = self.transport.save(&request).await;

        self.autosave.resolve(outcome, Instant::now());
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
