//! Public identifiers for notes
//!
//! 16 random bytes, URL-safe base64 without padding: always 22 characters of `[A-Za-z0-9_-]`

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand_core::OsRng;
use rand_core::TryRngCore;
use thiserror::Error;

use crate::storage;
use crate::storage::Storage;

/// Length of every public identifier
pub const PUBLIC_ID_LENGTH: usize = 22;

/// Number of random bytes behind a public identifier
const PUBLIC_ID_BYTES: usize = 16;

/// Number of candidates to try before giving up
///
/// With 128 bits of randomness a single collision is already unlikely
const MAX_ATTEMPTS: usize = 8;

/// Identifier generation errors
#[derive(Debug, Error)]
pub enum Error {
    /// The OS random source failed
    #[error("Random source error: {0}")]
    Random(String),

    /// Checking for collisions failed
    #[error(transparent)]
    Storage(#[from] storage::Error),

    /// Every candidate collided with an existing note
    #[error("Could not find an unused identifier after {} attempts", MAX_ATTEMPTS)]
    Exhausted,
}

/// Generate a public identifier no existing note uses
pub async fn generate<S: Storage>(storage: &S) -> Result<String, Error> {
    for _ in 0..MAX_ATTEMPTS {
        let candidate = candidate()?;

        if !storage.note_exists(&candidate).await? {
            return Ok(candidate);
        }

        tracing::debug!("Identifier {candidate} is taken, trying again");
    }

    Err(Error::Exhausted)
}

/// A random identifier, not checked against storage
pub fn candidate() -> Result<String, Error> {
    random_encoded::<PUBLIC_ID_BYTES>()
}

/// A random secret token, 32 bytes URL-safe encoded
pub fn random_token() -> Result<String, Error> {
    random_encoded::<32>()
}

fn random_encoded<const N: usize>() -> Result<String, Error> {
    let mut bytes = [0u8; N];

    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|err| Error::Random(err.to_string()))?;

    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Is this a well-formed public identifier?
pub fn is_valid(public_id: &str) -> bool {
    public_id.len() == PUBLIC_ID_LENGTH
        && public_id
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_')
}
