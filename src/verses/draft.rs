use thiserror::Error;

use crate::models::{Priority, Verse, VerseCategory, VersePayload};

/// Reasons a draft is refused before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("{0} is required.")]
    Missing(&'static str),
    #[error("{field} must be a number (got \"{value}\").")]
    NotANumber { field: &'static str, value: String },
}

/// List-valued draft fields arrive either as the sequence loaded from a
/// record or as the comma-delimited text the user typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListInput {
    Items(Vec<String>),
    Text(String),
}

impl Default for ListInput {
    fn default() -> Self {
        ListInput::Items(Vec::new())
    }
}

impl ListInput {
    /// Trimmed, non-empty entries in their original order.
    pub fn normalize(&self) -> Vec<String> {
        match self {
            ListInput::Text(raw) => split_list(raw),
            ListInput::Items(items) => items
                .iter()
                .map(|item| item.trim())
                .filter(|item| !item.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Editable text form of the value.
    pub fn as_text(&self) -> String {
        match self {
            ListInput::Text(raw) => raw.clone(),
            ListInput::Items(items) => items.join(", "),
        }
    }
}

/// Split on commas, trim, and drop empty tokens.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Non-empty whitespace-delimited tokens.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Lines holding at least one non-whitespace character.
pub fn line_count(text: &str) -> usize {
    text.lines().filter(|line| !line.trim().is_empty()).count()
}

/// Editable fields of the verse form, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerseField {
    Title,
    Category,
    Lyrics,
    BeatName,
    BeatLink,
    Tags,
    Bpm,
    Key,
    Mood,
    Priority,
    Collaborators,
    Notes,
    RecordingNotes,
    Complete,
}

impl VerseField {
    pub const ALL: [VerseField; 14] = [
        VerseField::Title,
        VerseField::Category,
        VerseField::Lyrics,
        VerseField::BeatName,
        VerseField::BeatLink,
        VerseField::Tags,
        VerseField::Bpm,
        VerseField::Key,
        VerseField::Mood,
        VerseField::Priority,
        VerseField::Collaborators,
        VerseField::Notes,
        VerseField::RecordingNotes,
        VerseField::Complete,
    ];

    pub fn label(self) -> &'static str {
        match self {
            VerseField::Title => "Title",
            VerseField::Category => "Category",
            VerseField::Lyrics => "Lyrics",
            VerseField::BeatName => "Beat",
            VerseField::BeatLink => "Beat Link",
            VerseField::Tags => "Tags",
            VerseField::Bpm => "BPM",
            VerseField::Key => "Key",
            VerseField::Mood => "Mood",
            VerseField::Priority => "Priority",
            VerseField::Collaborators => "Collaborators",
            VerseField::Notes => "Notes",
            VerseField::RecordingNotes => "Recording Notes",
            VerseField::Complete => "Complete",
        }
    }

    /// Fields that accept free text (the rest are choices or a flag).
    pub fn is_text(self) -> bool {
        !matches!(
            self,
            VerseField::Category | VerseField::Priority | VerseField::Complete
        )
    }

    /// Fields where Enter inserts a newline instead of saving.
    pub fn is_multiline(self) -> bool {
        matches!(
            self,
            VerseField::Lyrics | VerseField::Notes | VerseField::RecordingNotes
        )
    }

    pub fn is_required(self) -> bool {
        matches!(self, VerseField::Title | VerseField::Lyrics)
    }

    pub fn step(self, forward: bool) -> Self {
        let len = Self::ALL.len();
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        let next = if forward {
            (idx + 1) % len
        } else {
            (idx + len - 1) % len
        };
        Self::ALL[next]
    }
}

/// New value for a single form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Category(VerseCategory),
    Priority(Priority),
    Flag(bool),
}

/// Edit buffer for a verse. Optional record fields are held as (possibly
/// empty) text so the form can edit them uniformly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerseDraft {
    pub title: String,
    pub lyrics: String,
    pub category: VerseCategory,
    pub beat_name: String,
    pub beat_external_link: String,
    pub tags: ListInput,
    pub notes: String,
    pub bpm: String,
    pub key: String,
    pub mood: String,
    pub priority: Priority,
    pub collaborators: ListInput,
    pub recording_notes: String,
    pub is_complete: bool,
}

impl Default for VerseDraft {
    /// Blank template for a new verse.
    fn default() -> Self {
        Self {
            title: String::new(),
            lyrics: String::new(),
            category: VerseCategory::Freestyle,
            beat_name: String::new(),
            beat_external_link: String::new(),
            tags: ListInput::default(),
            notes: String::new(),
            bpm: String::new(),
            key: String::new(),
            mood: String::new(),
            priority: Priority::Medium,
            collaborators: ListInput::default(),
            recording_notes: String::new(),
            is_complete: false,
        }
    }
}

impl VerseDraft {
    /// Field-by-field copy of a record; absent optional fields become empty.
    pub fn from_verse(verse: &Verse) -> Self {
        Self {
            title: verse.title.clone(),
            lyrics: verse.lyrics.clone(),
            category: verse.category,
            beat_name: verse.beat_name.clone().unwrap_or_default(),
            beat_external_link: verse.beat_external_link.clone().unwrap_or_default(),
            tags: ListInput::Items(verse.tags.clone()),
            notes: verse.notes.clone().unwrap_or_default(),
            bpm: verse.bpm.map(|bpm| bpm.to_string()).unwrap_or_default(),
            key: verse.key.clone().unwrap_or_default(),
            mood: verse.mood.clone().unwrap_or_default(),
            priority: verse.priority,
            collaborators: ListInput::Items(verse.collaborators.clone()),
            recording_notes: verse.recording_notes.clone().unwrap_or_default(),
            is_complete: verse.is_complete,
        }
    }

    pub fn word_count(&self) -> usize {
        word_count(&self.lyrics)
    }

    pub fn line_count(&self) -> usize {
        line_count(&self.lyrics)
    }

    /// Current value of a field as editable text.
    pub fn text(&self, field: VerseField) -> String {
        match field {
            VerseField::Title => self.title.clone(),
            VerseField::Category => self.category.label().to_string(),
            VerseField::Lyrics => self.lyrics.clone(),
            VerseField::BeatName => self.beat_name.clone(),
            VerseField::BeatLink => self.beat_external_link.clone(),
            VerseField::Tags => self.tags.as_text(),
            VerseField::Bpm => self.bpm.clone(),
            VerseField::Key => self.key.clone(),
            VerseField::Mood => self.mood.clone(),
            VerseField::Priority => self.priority.label().to_string(),
            VerseField::Collaborators => self.collaborators.as_text(),
            VerseField::Notes => self.notes.clone(),
            VerseField::RecordingNotes => self.recording_notes.clone(),
            VerseField::Complete => (if self.is_complete { "yes" } else { "no" }).to_string(),
        }
    }

    /// Apply a field change. Returns `false` when the value kind does not fit
    /// the field, leaving the draft as it was.
    pub fn set(&mut self, field: VerseField, value: FieldValue) -> bool {
        match (field, value) {
            (VerseField::Category, FieldValue::Category(category)) => self.category = category,
            (VerseField::Priority, FieldValue::Priority(priority)) => self.priority = priority,
            (VerseField::Complete, FieldValue::Flag(flag)) => self.is_complete = flag,
            (VerseField::Tags, FieldValue::Text(text)) => self.tags = ListInput::Text(text),
            (VerseField::Collaborators, FieldValue::Text(text)) => {
                self.collaborators = ListInput::Text(text)
            }
            (field, FieldValue::Text(text)) if field.is_text() => {
                let slot = match field {
                    VerseField::Title => &mut self.title,
                    VerseField::Lyrics => &mut self.lyrics,
                    VerseField::BeatName => &mut self.beat_name,
                    VerseField::BeatLink => &mut self.beat_external_link,
                    VerseField::Bpm => &mut self.bpm,
                    VerseField::Key => &mut self.key,
                    VerseField::Mood => &mut self.mood,
                    VerseField::Notes => &mut self.notes,
                    VerseField::RecordingNotes => &mut self.recording_notes,
                    _ => return false,
                };
                *slot = text;
            }
            _ => return false,
        }
        true
    }

    /// Validate and normalize into the request body.
    pub fn to_payload(&self) -> Result<VersePayload, DraftError> {
        if self.title.trim().is_empty() {
            return Err(DraftError::Missing("Title"));
        }
        if self.lyrics.trim().is_empty() {
            return Err(DraftError::Missing("Lyrics"));
        }

        let bpm_raw = self.bpm.trim();
        let bpm = if bpm_raw.is_empty() {
            None
        } else {
            Some(
                bpm_raw
                    .parse::<u32>()
                    .map_err(|_| DraftError::NotANumber {
                        field: "BPM",
                        value: bpm_raw.to_string(),
                    })?,
            )
        };

        Ok(VersePayload {
            title: self.title.trim().to_string(),
            lyrics: self.lyrics.clone(),
            category: self.category,
            beat_name: optional(&self.beat_name),
            beat_external_link: optional(&self.beat_external_link),
            tags: self.tags.normalize(),
            notes: optional(&self.notes),
            bpm,
            key: optional(&self.key),
            mood: optional(&self.mood),
            priority: self.priority,
            collaborators: self.collaborators.normalize(),
            recording_notes: optional(&self.recording_notes),
            is_complete: self.is_complete,
        })
    }
}

fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> VerseDraft {
        VerseDraft {
            title: "Cold Open".to_string(),
            lyrics: "first bar\nsecond bar".to_string(),
            ..VerseDraft::default()
        }
    }

    #[test]
    fn delimited_text_drops_empty_tokens() {
        assert_eq!(split_list("a, b ,  , c"), vec!["a", "b", "c"]);
        assert_eq!(
            ListInput::Text("a, b ,  , c".to_string()).normalize(),
            vec!["a", "b", "c"]
        );
        assert!(split_list(" , ,").is_empty());
    }

    #[test]
    fn sequence_input_is_trimmed_too() {
        let items = ListInput::Items(vec![" a".to_string(), "".to_string(), "b ".to_string()]);
        assert_eq!(items.normalize(), vec!["a", "b"]);
        assert_eq!(items.as_text(), " a, , b ");
    }

    #[test]
    fn counts_ignore_blank_tokens_and_lines() {
        let lyrics = "  one two\n\n   \nthree\tfour  five\n";
        assert_eq!(word_count(lyrics), 5);
        assert_eq!(line_count(lyrics), 2);
        assert_eq!(word_count(""), 0);
        assert_eq!(line_count("\n\n"), 0);
    }

    #[test]
    fn blank_template_has_fixed_defaults() {
        let draft = VerseDraft::default();
        assert_eq!(draft.category, VerseCategory::Freestyle);
        assert_eq!(draft.priority, Priority::Medium);
        assert!(!draft.is_complete);
        assert!(draft.title.is_empty());
    }

    #[test]
    fn loading_a_record_is_idempotent() {
        let verse = Verse {
            id: "v9".to_string(),
            title: "Reload".to_string(),
            lyrics: "one".to_string(),
            tags: vec!["x".to_string()],
            bpm: Some(92),
            mood: Some("moody".to_string()),
            ..Verse::default()
        };
        let first = VerseDraft::from_verse(&verse);
        let second = VerseDraft::from_verse(&verse);
        assert_eq!(first, second);
        assert_eq!(first.bpm, "92");
        assert_eq!(first.key, "");
    }

    #[test]
    fn missing_title_or_lyrics_is_rejected() {
        let mut draft = filled();
        draft.title = "   ".to_string();
        assert_eq!(draft.to_payload(), Err(DraftError::Missing("Title")));

        let mut draft = filled();
        draft.lyrics.clear();
        assert_eq!(draft.to_payload(), Err(DraftError::Missing("Lyrics")));
    }

    #[test]
    fn payload_normalizes_lists_and_optionals() {
        let mut draft = filled();
        draft.tags = ListInput::Text("dark, , trap".to_string());
        draft.collaborators = ListInput::Text("Kay ,".to_string());
        draft.bpm = " 140 ".to_string();
        draft.beat_name = "  ".to_string();

        let payload = draft.to_payload().unwrap();
        assert_eq!(payload.tags, vec!["dark", "trap"]);
        assert_eq!(payload.collaborators, vec!["Kay"]);
        assert_eq!(payload.bpm, Some(140));
        assert_eq!(payload.beat_name, None);
    }

    #[test]
    fn non_numeric_bpm_is_rejected() {
        let mut draft = filled();
        draft.bpm = "fast".to_string();
        assert!(matches!(
            draft.to_payload(),
            Err(DraftError::NotANumber { field: "BPM", .. })
        ));
    }

    #[test]
    fn set_refuses_mismatched_values() {
        let mut draft = filled();
        assert!(!draft.set(VerseField::Category, FieldValue::Text("hooks".to_string())));
        assert!(!draft.set(VerseField::Title, FieldValue::Flag(true)));
        assert_eq!(draft, filled());

        assert!(draft.set(VerseField::Complete, FieldValue::Flag(true)));
        assert!(draft.set(VerseField::Tags, FieldValue::Text("a,b".to_string())));
        assert!(draft.is_complete);
        assert_eq!(draft.tags, ListInput::Text("a,b".to_string()));
    }
}
