use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_derive::Deserialize;

use super::contains_pattern;
use crate::errors::ServerError;
use crate::models::note::Note;
use crate::utils::parse_id;

/// Query string of `GET /notes/search/advanced` and `GET /folders/{id}/search`.
/// Everything arrives as text so bad values get our own messages.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingNoteFilter {
    pub query: Option<String>,
    /// Comma separated tag names.
    pub tags: Option<String>,
    pub author: Option<String>,
    pub created_after: Option<String>,
    pub created_before: Option<String>,
    pub updated_after: Option<String>,
    pub updated_before: Option<String>,
    pub folder_id: Option<String>,
}

/// Criteria combined with AND. Absent criteria match every note.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NoteFilter {
    query: Option<String>,
    tags: Vec<String>,
    author: Option<String>,
    created_after: Option<DateTime<Utc>>,
    created_before: Option<DateTime<Utc>>,
    updated_after: Option<DateTime<Utc>>,
    updated_before: Option<DateTime<Utc>>,
    folder_id: Option<i32>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM:SS[.fff]`, the same with a space
/// instead of `T`, or a bare date. Zone-less values are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn timestamp(
    raw: Option<String>,
    field: &str,
    errors: &mut Vec<String>,
) -> Option<DateTime<Utc>> {
    let raw = non_blank(raw)?;
    let parsed = parse_timestamp(&raw);
    if parsed.is_none() {
        errors.push(format!("Invalid {field}"));
    }
    parsed
}

impl IncomingNoteFilter {
    pub fn validate(self) -> Result<NoteFilter, ServerError> {
        let mut errors = vec![];

        let created_after = timestamp(self.created_after, "createdAfter", &mut errors);
        let created_before = timestamp(self.created_before, "createdBefore", &mut errors);
        let updated_after = timestamp(self.updated_after, "updatedAfter", &mut errors);
        let updated_before = timestamp(self.updated_before, "updatedBefore", &mut errors);
        let folder_id = match non_blank(self.folder_id) {
            Some(raw) => match parse_id(&raw, "folder ID") {
                Ok(id) => Some(id),
                Err(e) => {
                    errors.push(e.to_string());
                    None
                }
            },
            None => None,
        };

        if !errors.is_empty() {
            return Err(ServerError::validation(errors));
        }

        let tags = self
            .tags
            .unwrap_or_default()
            .split(',')
            .map(|tag| tag.trim().to_lowercase())
            .filter(|tag| !tag.is_empty())
            .collect();

        Ok(NoteFilter {
            query: non_blank(self.query),
            tags,
            author: non_blank(self.author),
            created_after,
            created_before,
            updated_after,
            updated_before,
            folder_id,
        })
    }
}

impl NoteFilter {
    /// Restricts the filter to one folder, replacing any `folderId` given.
    pub fn in_folder(mut self, folder_id: i32) -> Self {
        self.folder_id = Some(folder_id);
        self
    }

    pub fn with_query(mut self, query: &str) -> Self {
        self.query = non_blank(Some(query.to_string()));
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.trim().to_lowercase()).collect();
        self
    }

    pub fn with_author(mut self, author: &str) -> Self {
        self.author = non_blank(Some(author.to_string()));
        self
    }

    pub fn created_between(mut self, after: Option<DateTime<Utc>>, before: Option<DateTime<Utc>>) -> Self {
        self.created_after = after;
        self.created_before = before;
        self
    }

    pub fn updated_between(mut self, after: Option<DateTime<Utc>>, before: Option<DateTime<Utc>>) -> Self {
        self.updated_after = after;
        self.updated_before = before;
        self
    }

    /// `ILIKE` pattern for the title/content query.
    pub fn query_pattern(&self) -> Option<String> {
        self.query.as_deref().map(contains_pattern)
    }

    /// `ILIKE` pattern matching the whole author name, wildcards escaped.
    pub fn author_pattern(&self) -> Option<String> {
        self.author.as_deref().map(|author| {
            let pattern = contains_pattern(author);
            pattern[1..pattern.len() - 1].to_string()
        })
    }

    /// Lowercased tag names. A note matches when it carries any of them.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn folder_id(&self) -> Option<i32> {
        self.folder_id
    }

    pub fn created_after(&self) -> Option<DateTime<Utc>> {
        self.created_after
    }

    pub fn created_before(&self) -> Option<DateTime<Utc>> {
        self.created_before
    }

    pub fn updated_after(&self) -> Option<DateTime<Utc>> {
        self.updated_after
    }

    pub fn updated_before(&self) -> Option<DateTime<Utc>> {
        self.updated_before
    }

    /// Checks every criterion except tags and folder, which live outside the note row.
    pub fn matches(&self, note: &Note) -> bool {
        let query_ok = self.query.as_ref().map_or(true, |q| {
            let q = q.to_lowercase();
            note.title.to_lowercase().contains(&q) || note.content.to_lowercase().contains(&q)
        });
        let author_ok = self
            .author
            .as_ref()
            .map_or(true, |a| a.to_lowercase() == note.author.to_lowercase());

        query_ok
            && author_ok
            && self.created_after.map_or(true, |t| note.created_at >= t)
            && self.created_before.map_or(true, |t| note.created_at <= t)
            && self.updated_after.map_or(true, |t| note.updated_at >= t)
            && self.updated_before.map_or(true, |t| note.updated_at <= t)
    }

    /// `tag_names` must be lowercased.
    pub fn matches_tags<'a>(&self, mut tag_names: impl Iterator<Item = &'a str>) -> bool {
        self.tags.is_empty() || tag_names.any(|name| self.tags.iter().any(|t| t == name))
    }
}
