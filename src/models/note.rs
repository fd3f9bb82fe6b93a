use chrono::{DateTime, Utc};
use diesel::{AsChangeset, Insertable, Queryable};
use serde_derive::{Deserialize, Serialize};

use super::{check_max_chars, contains_pattern, required};
use crate::errors::ServerError;
use crate::schema::notes;

pub const TITLE_MAX_CHARS: usize = 100;
pub const CONTENT_MAX_CHARS: usize = 280;

pub const SEARCH_DEFAULT_LIMIT: i64 = 20;
pub const SEARCH_MAX_LIMIT: i64 = 100;

#[derive(Clone, Debug, PartialEq, Queryable, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: i32,
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of `POST /notes`. Every field is optional here so that a missing
/// field is reported as a validation message instead of a parse failure.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct IncomingNote {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// A note that passed validation. Only [`IncomingNote::validate`] builds one,
/// so stores never see unchecked input.
#[derive(Clone, Debug, PartialEq)]
pub struct NewNote {
    title: String,
    content: String,
    author: String,
}

#[derive(Insertable)]
#[diesel(table_name = notes)]
pub struct InsertNote {
    pub title: String,
    pub content: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IncomingNote {
    pub fn validate(self) -> Result<NewNote, ServerError> {
        let mut errors = vec![];

        let title = required(self.title, "Title is required", &mut errors);
        check_max_chars(&title, "Title", TITLE_MAX_CHARS, &mut errors);
        let content = required(self.content, "Content is required", &mut errors);
        check_max_chars(&content, "Content", CONTENT_MAX_CHARS, &mut errors);
        let author = required(self.author, "Author is required", &mut errors);

        if !errors.is_empty() {
            return Err(ServerError::validation(errors));
        }

        Ok(NewNote {
            title,
            content,
            author,
        })
    }
}

impl NewNote {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn into_insertable(self, time_now: DateTime<Utc>) -> InsertNote {
        InsertNote {
            title: self.title,
            content: self.content,
            author: self.author,
            created_at: time_now,
            updated_at: time_now,
        }
    }
}

/// Body of `PUT /notes/{id}`. The author is fixed at creation and ignored here.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct IncomingNoteUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoteUpdate {
    title: Option<String>,
    content: Option<String>,
}

#[derive(AsChangeset)]
#[diesel(table_name = notes)]
pub struct NoteChangeset {
    pub title: Option<String>,
    pub content: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl IncomingNoteUpdate {
    pub fn validate(self) -> Result<NoteUpdate, ServerError> {
        let mut errors = vec![];

        let title = self.title.map(|title| {
            let title = required(Some(title), "Title cannot be empty", &mut errors);
            check_max_chars(&title, "Title", TITLE_MAX_CHARS, &mut errors);
            title
        });
        let content = self.content.map(|content| {
            let content = required(Some(content), "Content cannot be empty", &mut errors);
            check_max_chars(&content, "Content", CONTENT_MAX_CHARS, &mut errors);
            content
        });

        if !errors.is_empty() {
            return Err(ServerError::validation(errors));
        }

        Ok(NoteUpdate { title, content })
    }
}

impl NoteUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none()
    }

    /// Whether applying this update would change the note's title or content.
    pub fn differs_from(&self, note: &Note) -> bool {
        let title_changed = self.title.as_ref().map_or(false, |t| *t != note.title);
        let content_changed = self.content.as_ref().map_or(false, |c| *c != note.content);
        title_changed || content_changed
    }

    pub fn apply_to(&self, note: &mut Note, time_now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            note.title = title.clone();
        }
        if let Some(content) = &self.content {
            note.content = content.clone();
        }
        note.updated_at = time_now;
    }

    pub fn into_changeset(self, time_now: DateTime<Utc>) -> NoteChangeset {
        NoteChangeset {
            title: self.title,
            content: self.content,
            updated_at: time_now,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NoteSearch {
    needle: String,
    offset: i64,
    limit: i64,
}

impl NoteSearch {
    pub fn new(q: Option<String>, offset: Option<i64>, limit: Option<i64>) -> Result<Self, ServerError> {
        let needle = q.map(|q| q.trim().to_string()).unwrap_or_default();
        if needle.is_empty() {
            return Err(ServerError::Validation("Search query is required".to_string()));
        }

        Ok(NoteSearch {
            needle,
            offset: offset.unwrap_or(0).max(0),
            limit: limit.unwrap_or(SEARCH_DEFAULT_LIMIT).clamp(1, SEARCH_MAX_LIMIT),
        })
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    pub fn like_pattern(&self) -> String {
        contains_pattern(&self.needle)
    }

    pub fn matches(&self, note: &Note) -> bool {
        let needle = self.needle.to_lowercase();
        note.title.to_lowercase().contains(&needle) || note.content.to_lowercase().contains(&needle)
    }
}
