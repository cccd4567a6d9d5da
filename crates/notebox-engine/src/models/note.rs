use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a note. Ids handed out by the store start at 1.
pub type NoteId = u64;

/// A text note as held in the store cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub content: String,
    pub created_date: DateTime<Utc>,
}

/// Caller input for creating a note; the store picks the id and timestamp
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
}

impl NoteDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
        }
    }
}

/// Caller input for replacing the title and content of an existing note
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteUpdate {
    pub id: NoteId,
    pub title: String,
    pub content: String,
}

impl NoteUpdate {
    pub fn new(id: NoteId, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            content: content.into(),
        }
    }
}
