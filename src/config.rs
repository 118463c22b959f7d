//! Application configuration
//!
//! All values come from the environment, a `.env` file is loaded first by `main`

use chrono::FixedOffset;
use url::Url;

use crate::identifier;
use crate::utils::env_var_or_else;
use crate::utils::env_var_parsed_or;
use crate::utils::is_truthy;

/// Default maximum number of characters in a note
pub const DEFAULT_CONTENT_MAX_CHARS: usize = 10_000;

/// Default tolerance for timestamp mismatches on update
pub const DEFAULT_CONFLICT_GRACE_SECONDS: i64 = 5;

const DEFAULT_BASE_URL: &str = "http://localhost:6000/";

/// Read-only configuration shared by the service and the handlers
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum length of note content, in characters
    pub content_max_chars: usize,

    /// Timezone used for timestamps on the wire
    pub display_timezone: FixedOffset,

    /// Base URL used to build redirects, always ends with a `/`
    pub base_url: Url,

    /// Include error details in responses
    pub debug_mode: bool,

    /// Maximum difference (in seconds) between an expected and a stored
    /// `updated_at` that is still accepted as the same version
    pub conflict_grace_seconds: i64,

    /// Secret used to sign CSRF tokens
    pub csrf_secret: String,
}

impl Config {
    /// Build the configuration from the environment
    ///
    /// Missing values fall back to defaults, a missing `CSRF_TOKEN_SECRET` is generated
    pub fn from_env() -> Result<Self, identifier::Error> {
        let display_timezone = parse_timezone(&env_var_or_else("DISPLAY_TIMEZONE", || {
            env_var_or_else("TIMEZONE", || String::from("UTC"))
        }))
        .unwrap_or_else(|| {
            tracing::warn!("Unknown display timezone, falling back to UTC");
            utc()
        });

        let base_url = parse_base_url(&env_var_or_else("BASE_URL", || {
            String::from(DEFAULT_BASE_URL)
        }))
        .unwrap_or_else(|| {
            tracing::warn!("`BASE_URL` is not a valid URL, using {DEFAULT_BASE_URL}");
            parse_base_url(DEFAULT_BASE_URL).expect("Valid default base URL")
        });

        let csrf_secret = match std::env::var("CSRF_TOKEN_SECRET") {
            Ok(csrf_secret) if !csrf_secret.is_empty() => csrf_secret,
            _ => {
                tracing::info!("`CSRF_TOKEN_SECRET` is not set, generating temporary one");
                identifier::random_token()?
            }
        };

        Ok(Self {
            content_max_chars: env_var_parsed_or("CONTENT_MAX_CHARS", DEFAULT_CONTENT_MAX_CHARS),
            display_timezone,
            base_url,
            debug_mode: is_truthy(&env_var_or_else("DEBUG_MODE", String::new)),
            conflict_grace_seconds: env_var_parsed_or(
                "CONFLICT_GRACE_SECONDS",
                DEFAULT_CONFLICT_GRACE_SECONDS,
            ),
            csrf_secret,
        })
    }

    /// Configuration with defaults and a fixed secret, handy for tests
    pub fn with_secret(csrf_secret: &str) -> Self {
        Self {
            content_max_chars: DEFAULT_CONTENT_MAX_CHARS,
            display_timezone: utc(),
            base_url: parse_base_url(DEFAULT_BASE_URL).expect("Valid default base URL"),
            debug_mode: false,
            conflict_grace_seconds: DEFAULT_CONFLICT_GRACE_SECONDS,
            csrf_secret: csrf_secret.to_string(),
        }
    }
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).expect("Zero offset is valid")
}

/// Parse a timezone as `UTC`/`Z` or a fixed offset like `+02:00`
pub fn parse_timezone(value: &str) -> Option<FixedOffset> {
    let value = value.trim();

    if value.eq_ignore_ascii_case("utc") || value.eq_ignore_ascii_case("z") {
        return Some(utc());
    }

    value.parse::<FixedOffset>().ok()
}

/// Parse the base URL, a trailing slash is added so joins stay below it
pub fn parse_base_url(value: &str) -> Option<Url> {
    let mut url = Url::parse(value.trim()).ok()?;

    if url.cannot_be_a_base() {
        return None;
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Some(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timezone() {
        assert_eq!(Some(utc()), parse_timezone("UTC"));
        assert_eq!(Some(utc()), parse_timezone("z"));
        assert_eq!(FixedOffset::east_opt(7200), parse_timezone("+02:00"));
        assert_eq!(None, parse_timezone("Mars/Olympus"));
    }

    #[test]
    fn test_parse_base_url() {
        let url = parse_base_url("http://localhost/notes").unwrap();
        assert_eq!("http://localhost/notes/", url.as_str());

        let url = parse_base_url("https://example.com/").unwrap();
        assert_eq!("https://example.com/", url.as_str());

        assert!(parse_base_url("not a url").is_none());
        assert!(parse_base_url("mailto:someone@example.com").is_none());
    }
}
