//! Notes

use chrono::naive::NaiveDateTime;

/// Title used for fresh notes and when no title can be derived
pub const PLACEHOLDER_TITLE: &str = "untitled";

/// Minimum number of characters a word needs to become a derived title
const TITLE_WORD_MIN_CHARS: usize = 5;

/// A single note
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Note {
    /// Internal ID, never leaves the service
    pub id: i64,

    /// External identifier, URL-safe
    pub public_id: String,

    /// Title of the note
    pub title: String,

    /// Content of the note
    pub content: String,

    /// Creation date
    pub created_at: NaiveDateTime,

    /// Last updated at
    pub updated_at: NaiveDateTime,
}

/// Derive a title from the content of a note
///
/// Takes the first whitespace separated word with at least five word characters (after
/// removing everything else), capitalized. Falls back to [`PLACEHOLDER_TITLE`].
///
/// ```rust
/// # use jotter::notes::derive_title;
/// assert_eq!("There", derive_title("hi there wonderful world"));
/// assert_eq!("untitled", derive_title("a bb ccc"));
/// ```
pub fn derive_title(content: &str) -> String {
    content
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|ch| ch.is_alphanumeric() || *ch == '_')
                .collect::<String>()
        })
        .find(|word| word.chars().count() >= TITLE_WORD_MIN_CHARS)
        .map_or_else(|| PLACEHOLDER_TITLE.to_string(), |word| capitalize(&word))
}

/// Uppercase the first character, lowercase the rest
fn capitalize(word: &str) -> String {
    let mut chars = word.chars();

    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_title() {
        assert_eq!("There", derive_title("hi there wonderful world"));
        assert_eq!("untitled", derive_title("a bb ccc"));
        assert_eq!("Hello", derive_title("Hello #world"));
        assert_eq!("untitled", derive_title("   "));
    }

    #[test]
    fn test_derive_title_strips_punctuation() {
        // "#tag!" is only 3 word characters, "(meeting)" is 7
        assert_eq!("Meeting", derive_title("#tag! (meeting) notes"));
        assert_eq!("Shoppinglist", derive_title("SHOPPING-list"));
        assert_eq!("Snake_case", derive_title("snake_case"));
    }

    #[test]
    fn test_derive_title_counts_characters() {
        assert_eq!("Écoles", derive_title("les ÉCOLES"));
    }
}
