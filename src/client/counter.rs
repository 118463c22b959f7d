//! Character counter under the editor

/// Remaining characters from which the counter warns
pub const NEAR_LIMIT: i64 = 100;

/// How close the content is to the limit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CounterLevel {
    Normal,
    NearLimit,
    AtLimit,
}

/// Counter state for some content
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Counter {
    /// Characters left, negative when over the limit
    pub remaining: i64,

    pub level: CounterLevel,
}

impl Counter {
    /// Count the characters of the content against the maximum
    pub fn new(content: &str, max_chars: usize) -> Self {
        let used = i64::try_from(content.chars().count()).unwrap_or(i64::MAX);
        let max_chars = i64::try_from(max_chars).unwrap_or(i64::MAX);

        let remaining = max_chars.saturating_sub(used);

        let level = if remaining <= 0 {
            CounterLevel::AtLimit
        } else if remaining <= NEAR_LIMIT {
            CounterLevel::NearLimit
        } else {
            CounterLevel::Normal
        };

        Self { remaining, level }
    }

    pub fn label(&self) -> String {
        match self.level {
            CounterLevel::AtLimit => "Character limit reached".to_string(),
            CounterLevel::Normal | CounterLevel::NearLimit => {
                format!("{} remaining", self.remaining)
            }
        }
    }
}
