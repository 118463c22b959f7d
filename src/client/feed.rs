//! Infinite scrolling over the note listing

use chrono::NaiveDateTime;
use serde::Deserialize;
use url::Url;

use crate::storage::SortKey;

/// Longest title shown in the feed before it is cut
const TITLE_MAX_CHARS: usize = 50;

/// Longest content preview shown in the feed before it is cut
const PREVIEW_MAX_CHARS: usize = 150;

/// A note as listed by `GET /api/notes`
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct FeedNote {
    pub hash_id: String,
    pub title: String,
    pub content: String,
    pub created_at: String,
    pub updated_at: String,
}

/// A page as listed by `GET /api/notes`
#[derive(Debug, Deserialize)]
pub struct FeedPage {
    pub notes: Vec<FeedNote>,
    #[serde(rename = "hasMore")]
    pub has_more: bool,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

/// Next page to fetch
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeedRequest {
    pub search: String,
    pub sort: SortKey,
    pub offset: u64,
}

impl FeedRequest {
    /// URL of the listing, relative to the base URL
    pub fn to_url(&self, base_url: &Url) -> Result<Url, url::ParseError> {
        let mut url = base_url.join("api/notes")?;

        url.query_pairs_mut()
            .append_pair("q", &self.search)
            .append_pair("sort", self.sort.as_str())
            .append_pair("offset", &self.offset.to_string());

        Ok(url)
    }
}

/// Position in the feed
#[derive(Debug)]
pub struct FeedCursor {
    search: String,
    sort: SortKey,
    offset: u64,
    has_more: bool,
    loading: bool,
    notes: Vec<FeedNote>,
}

impl FeedCursor {
    /// Cursor at the start of a search
    pub fn new(search: &str, sort: SortKey) -> Self {
        Self {
            search: search.to_string(),
            sort,
            offset: 0,
            has_more: true,
            loading: false,
            notes: Vec::new(),
        }
    }

    /// Cursor continuing after the first page, as rendered by the server
    pub fn after_first_page(search: &str, sort: SortKey, page: FeedPage) -> Self {
        let mut cursor = Self::new(search, sort);
        cursor.loading = true;
        cursor.complete(page);
        cursor
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// All notes loaded so far
    pub fn notes(&self) -> &[FeedNote] {
        &self.notes
    }

    /// Ask for the next page, `None` while loading or at the end
    pub fn load_more(&mut self) -> Option<FeedRequest> {
        if self.loading || !self.has_more {
            return None;
        }

        self.loading = true;

        Some(FeedRequest {
            search: self.search.clone(),
            sort: self.sort,
            offset: self.offset,
        })
    }

    /// The requested page arrived
    pub fn complete(&mut self, page: FeedPage) {
        self.loading = false;

        if page.notes.is_empty() {
            self.has_more = false;
            return;
        }

        self.offset += page.notes.len() as u64;
        self.has_more = page.has_more;
        self.notes.extend(page.notes);
    }

    /// The requested page did not arrive, loading can be tried again
    pub fn fail(&mut self) {
        self.loading = false;
    }

    /// The element at the end of the feed became (in)visible
    pub fn on_sentinel(&mut self, visible: bool) -> Option<FeedRequest> {
        if visible { self.load_more() } else { None }
    }
}

/// Title as shown in the feed
pub fn display_title(title: &str) -> String {
    truncate(title, TITLE_MAX_CHARS, TITLE_MAX_CHARS)
}

/// Content preview as shown in the feed
pub fn preview(content: &str) -> String {
    truncate(content, PREVIEW_MAX_CHARS, PREVIEW_MAX_CHARS - 3)
}

/// Cut to `keep` characters plus `...` when longer than `max` characters
fn truncate(value: &str, max: usize, keep: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }

    let mut truncated = value.chars().take(keep).collect::<String>();
    truncated.push_str("...");
    truncated
}

/// Human friendly age of a timestamp
///
/// ```rust
/// # use chrono::NaiveDate;
/// # use jotter::client::feed::relative_time;
/// let now = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap().and_hms_opt(12, 0, 0).unwrap();
/// let then = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap().and_hms_opt(11, 15, 0).unwrap();
/// assert_eq!("45 min ago", relative_time(&then, &now));
/// ```
pub fn relative_time(timestamp: &NaiveDateTime, now: &NaiveDateTime) -> String {
    let elapsed = now.signed_duration_since(*timestamp);

    let minutes = elapsed.num_minutes();
    let hours = elapsed.num_hours();
    let days = elapsed.num_days();

    match (minutes, hours, days) {
        (..1, _, _) => "Just now".to_string(),
        (..60, _, _) => format!("{minutes} min ago"),
        (_, ..24, _) => format!("{hours}h ago"),
        (_, _, 1) => "Yesterday".to_string(),
        (_, _, ..7) => format!("{days} days ago"),
        _ => timestamp.format("%b %-d, %Y").to_string(),
    }
}
