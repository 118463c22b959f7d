//! Session endpoint
//!
//! Hands out the CSRF token the forms need, starting a session when there is none

use axum::Extension;
use axum::http::HeaderValue;
use axum::http::header::SET_COOKIE;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Serialize;

use crate::config::Config;
use crate::session::CsrfKeys;
use crate::session::Session;
use crate::session::issue_token;

use super::Error;
use super::Success;

/// Session body
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    csrf_token: String,
}

/// Get a CSRF token for the current session
///
/// Request:
/// ```sh
/// curl -i --cookie-jar cookies.txt http://localhost:6000/api/session
/// ```
pub async fn show(
    Extension(config): Extension<Config>,
    Extension(csrf_keys): Extension<CsrfKeys>,
    session: Session,
) -> Result<Response, Error> {
    let csrf_token =
        issue_token(&csrf_keys, &session).map_err(|err| Error::server_error(err, &config))?;

    let mut response = Success::ok(SessionResponse { csrf_token }).into_response();

    if session.is_new() {
        tracing::debug!("Started session {}", session.id());

        let cookie = HeaderValue::from_str(&session.cookie())
            .map_err(|err| Error::server_error(err, &config))?;

        response.headers_mut().insert(SET_COOKIE, cookie);
    }

    Ok(response)
}
