//! API response helpers

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

use crate::config::Config;
use crate::service::NoteError;
use crate::timestamps;

/// Hold data for a successful API interaction
pub struct Success<V>
where
    V: Serialize,
{
    status_code: StatusCode,
    data: V,
}

impl<V> Success<V>
where
    V: Serialize,
{
    pub fn ok(data: V) -> Self {
        Self {
            status_code: StatusCode::OK,
            data,
        }
    }
}

/// Successful body: the data next to `"success": true`
#[derive(Serialize)]
struct SuccessWrapper<D>
where
    D: Serialize,
{
    success: bool,
    #[serde(flatten)]
    data: D,
}

impl<V> IntoResponse for Success<V>
where
    V: Serialize,
{
    fn into_response(self) -> Response {
        (
            self.status_code,
            Json(SuccessWrapper {
                success: true,
                data: self.data,
            }),
        )
            .into_response()
    }
}

/// Both sides of a conflicting update, as wire timestamps
#[derive(Clone, Debug, Serialize)]
struct ConflictDetails {
    expected_updated_at: String,
    current_updated_at: String,
}

/// Hold data for a failed API interaction
#[derive(Debug)]
pub struct Error {
    status_code: StatusCode,
    message: String,
    description: Option<String>,
    conflict: Option<ConflictDetails>,
}

impl Error {
    fn new<M>(status_code: StatusCode, message: M) -> Self
    where
        M: ToString,
    {
        Self {
            status_code,
            message: message.to_string(),
            description: None,
            conflict: None,
        }
    }

    pub fn bad_request<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::new(StatusCode::CONFLICT, message)
    }

    pub fn internal_server_error<M>(message: M) -> Self
    where
        M: ToString,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn with_description<M>(self, description: M) -> Self
    where
        M: ToString,
    {
        Self {
            description: Some(description.to_string()),
            ..self
        }
    }

    /// Generic server error, the details are logged and only shown in debug mode
    pub fn server_error<M>(detail: M, config: &Config) -> Self
    where
        M: ToString,
    {
        let detail = detail.to_string();

        tracing::error!("Internal server error: {detail}");

        let error = Self::internal_server_error("Internal server error");

        if config.debug_mode {
            error.with_description(detail)
        } else {
            error
        }
    }

    /// Translate a note error to its response
    pub fn from_note_error(error: NoteError, config: &Config) -> Self {
        match error {
            NoteError::EmptyContent | NoteError::ContentTooLong { .. } => {
                Self::bad_request(error)
            }
            NoteError::NotFound => Self::not_found(error),
            NoteError::Conflict {
                expected_updated_at,
                current_updated_at,
            } => Self {
                conflict: Some(ConflictDetails {
                    expected_updated_at: timestamps::format(
                        &expected_updated_at,
                        &config.display_timezone,
                    ),
                    current_updated_at: timestamps::format(
                        &current_updated_at,
                        &config.display_timezone,
                    ),
                }),
                ..Self::conflict(error)
            },
            NoteError::InvalidToken => Self::forbidden(error),
            NoteError::StoreUnavailable(detail) => Self::server_error(detail, config),
        }
    }

    /// The user facing message
    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Serialize)]
struct ErrorWrapper {
    success: bool,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(flatten)]
    conflict: Option<ConflictDetails>,
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (
            self.status_code,
            Json(ErrorWrapper {
                success: false,
                message: self.message,
                description: self.description,
                conflict: self.conflict,
            }),
        )
            .into_response()
    }
}
