//! Session and CSRF tokens
//!
//! A session is a random ID in the `jotter_session` cookie, the CSRF token is a signed
//! JWT with that ID as subject

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::TypedHeader;
use axum_extra::headers::Cookie;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "jotter_session";

/// How long a CSRF token stays valid, in seconds
const TOKEN_LIFETIME_SECONDS: i64 = 24 * 3600;

/// The keys used for signing and verifying CSRF tokens
#[derive(Clone)]
pub struct CsrfKeys {
    /// The encoding key
    encoding: EncodingKey,

    /// The decoding key
    decoding: DecodingKey,
}

impl CsrfKeys {
    /// Create new encoding/decoding keys, derived from a secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// The claims of a CSRF token
#[derive(Debug, Deserialize, Serialize)]
struct Claims {
    /// The session ID
    sub: Uuid,

    /// Expiration as a UNIX timestamp
    exp: i64,
}

/// Session of the current request
#[derive(Clone, Copy, Debug)]
pub struct Session {
    /// The session ID
    id: Uuid,

    /// No (valid) session cookie came with the request
    is_new: bool,
}

impl Session {
    /// Start a fresh session
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            is_new: true,
        }
    }

    /// Continue an existing session
    pub fn existing(id: Uuid) -> Self {
        Self { id, is_new: false }
    }

    /// The session ID
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Does the client still need the cookie?
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Value for the `Set-Cookie` header
    pub fn cookie(&self) -> String {
        format!("{SESSION_COOKIE}={}; HttpOnly; SameSite=Lax; Path=/", self.id)
    }

    /// Session from a `Cookie` header, a fresh one when missing or unreadable
    fn from_cookie(cookie: Option<&Cookie>) -> Self {
        cookie
            .and_then(|cookie| cookie.get(SESSION_COOKIE))
            .and_then(|value| Uuid::parse_str(value).ok())
            .map_or_else(Self::new, Self::existing)
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let cookie = Option::<TypedHeader<Cookie>>::from_request_parts(parts, state)
            .await
            .ok()
            .flatten();

        Ok(Session::from_cookie(cookie.as_ref().map(|TypedHeader(cookie)| cookie)))
    }
}

/// Issue a CSRF token for a session
pub fn issue_token(
    keys: &CsrfKeys,
    session: &Session,
) -> Result<String, jsonwebtoken::errors::Error> {
    use jsonwebtoken::Header;
    use jsonwebtoken::encode;

    let claims = Claims {
        sub: session.id,
        exp: chrono::Utc::now().timestamp() + TOKEN_LIFETIME_SECONDS,
    };

    encode(&Header::default(), &claims, &keys.encoding)
}

/// Is the token issued for this session and not expired?
pub fn verify_token(keys: &CsrfKeys, session: &Session, token: &str) -> bool {
    use jsonwebtoken::Validation;
    use jsonwebtoken::decode;

    if token.is_empty() {
        return false;
    }

    match decode::<Claims>(token, &keys.decoding, &Validation::default()) {
        Ok(token_data) => token_data.claims.sub == session.id,
        Err(err) => {
            tracing::debug!("Rejected CSRF token: {err}");
            false
        }
    }
}
