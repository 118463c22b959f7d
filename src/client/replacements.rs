//! Text replacements while typing
//!
//! A trigger typed right before the cursor is swapped for its replacement. Cursor
//! positions are byte offsets into the text and must be on a character boundary.

use chrono::NaiveDate;

/// Open checkbox
pub const OPEN: &str = "🔴";

/// Checked checkbox
pub const DONE: &str = "✅";

/// What a trigger turns into
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Replacement {
    /// Fixed text
    Text(String),

    /// Today as `dd/mm`, after a prefix
    Date { prefix: String },

    /// Swap the checkboxes on the line, the trigger becomes today as `dd/mm`
    ToggleLine,
}

/// A single replacement rule
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rule {
    pub trigger: String,
    pub replacement: Replacement,
    pub description: String,
}

impl Rule {
    pub fn new(trigger: &str, replacement: Replacement, description: &str) -> Self {
        Self {
            trigger: trigger.to_string(),
            replacement,
            description: description.to_string(),
        }
    }

    fn text(trigger: &str, replacement: &str, description: &str) -> Self {
        Self::new(trigger, Replacement::Text(replacement.to_string()), description)
    }
}

/// Text after a replacement, with the new cursor
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Replaced {
    pub text: String,
    pub cursor: usize,
}

/// The set of active rules
#[derive(Clone, Debug)]
pub struct Replacer {
    rules: Vec<Rule>,
}

impl Default for Replacer {
    fn default() -> Self {
        Self {
            rules: vec![
                Rule::new(
                    "ddd",
                    Replacement::Date {
                        prefix: "*** ".to_string(),
                    },
                    "Current date",
                ),
                Rule::text("[]", OPEN, "Checkbox"),
                Rule::text("[ ]", OPEN, "Checkbox"),
                Rule::text("[x]", DONE, "Checked checkbox"),
                Rule::text("[!!]", "‼️", "Double exclamation mark"),
                Rule::text("[!]", "⚠️", "Warning"),
                Rule::text("[?]", "❓", "Question mark"),
                Rule::text("[->]", "👉", "Arrow"),
                Rule::new(
                    "xxx",
                    Replacement::ToggleLine,
                    "Toggle the checkboxes on the line and add the date",
                ),
            ],
        }
    }
}

impl Replacer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Add a rule, an empty trigger is ignored
    pub fn add(&mut self, rule: Rule) {
        if rule.trigger.is_empty() {
            return;
        }

        self.rules.push(rule);
    }

    /// Remove the rule for a trigger, returns whether there was one
    pub fn remove(&mut self, trigger: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|rule| rule.trigger != trigger);
        self.rules.len() != before
    }

    /// Apply the first rule whose trigger ends at the cursor
    pub fn apply(&self, text: &str, cursor: usize, today: NaiveDate) -> Option<Replaced> {
        if !text.is_char_boundary(cursor) {
            return None;
        }

        let rule = self
            .rules
            .iter()
            .find(|rule| text[..cursor].ends_with(rule.trigger.as_str()))?;

        let start = cursor - rule.trigger.len();
        let date = today.format("%d/%m").to_string();

        Some(match &rule.replacement {
            Replacement::Text(replacement) => splice(text, start, cursor, replacement),
            Replacement::Date { prefix } => splice(text, start, cursor, &format!("{prefix}{date}")),
            Replacement::ToggleLine => toggle_line(text, start, cursor, &date),
        })
    }
}

/// Replace `text[start..end]`, the cursor ends up after the replacement
fn splice(text: &str, start: usize, end: usize, replacement: &str) -> Replaced {
    let mut replaced = String::with_capacity(text.len() + replacement.len());
    replaced.push_str(&text[..start]);
    replaced.push_str(replacement);

    let cursor = replaced.len();
    replaced.push_str(&text[end..]);

    Replaced {
        text: replaced,
        cursor,
    }
}

/// Swap open and done checkboxes on the line around `start..end`, replacing that range
/// with the date, the cursor ends up at the end of the line
fn toggle_line(text: &str, start: usize, end: usize, date: &str) -> Replaced {
    let line_start = text[..start].rfind('\n').map_or(0, |index| index + 1);
    let line_end = text[end..].find('\n').map_or(text.len(), |index| end + index);

    let mut replaced = String::with_capacity(text.len() + date.len());
    replaced.push_str(&text[..line_start]);
    replaced.push_str(&swap_checkboxes(&text[line_start..start]));
    replaced.push_str(date);
    replaced.push_str(&swap_checkboxes(&text[end..line_end]));

    let cursor = replaced.len();
    replaced.push_str(&text[line_end..]);

    Replaced {
        text: replaced,
        cursor,
    }
}

fn swap_checkboxes(line: &str) -> String {
    line.split(OPEN)
        .map(|part| part.replace(DONE, OPEN))
        .collect::<Vec<_>>()
        .join(DONE)
}
