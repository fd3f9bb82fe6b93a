use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable};
use serde_derive::Serialize;

use super::note::Note;
use crate::diff::TextDiff;
use crate::schema::note_versions;

/// Stored snapshots kept per note; older ones are pruned on insert.
pub const MAX_VERSIONS_PER_NOTE: usize = 10;

#[derive(Clone, Debug, PartialEq, Queryable)]
pub struct StoredVersion {
    pub id: i32,
    pub note_id: i32,
    pub version_number: i32,
    pub title: String,
    pub content: String,
    pub author: String,
    pub note_created_at: DateTime<Utc>,
    pub note_updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Insertable)]
#[diesel(table_name = note_versions)]
pub struct InsertVersion {
    pub note_id: i32,
    pub version_number: i32,
    pub title: String,
    pub content: String,
    pub author: String,
    pub note_created_at: DateTime<Utc>,
    pub note_updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl InsertVersion {
    pub fn snapshot(note: &Note, version_number: i32, time_now: DateTime<Utc>) -> Self {
        InsertVersion {
            note_id: note.id,
            version_number,
            title: note.title.clone(),
            content: note.content.clone(),
            author: note.author.clone(),
            note_created_at: note.created_at,
            note_updated_at: note.updated_at,
            created_at: time_now,
        }
    }

    pub fn into_stored(self, id: i32) -> StoredVersion {
        StoredVersion {
            id,
            note_id: self.note_id,
            version_number: self.version_number,
            title: self.title,
            content: self.content,
            author: self.author,
            note_created_at: self.note_created_at,
            note_updated_at: self.note_updated_at,
            created_at: self.created_at,
        }
    }
}

/// A version as served to clients. The note's live state is included as a
/// virtual version with no `id` and `is_current` set.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteVersion {
    pub id: Option<i32>,
    pub note_id: i32,
    pub version_number: i32,
    pub title: String,
    pub content: String,
    pub author: String,
    pub note_created_at: DateTime<Utc>,
    pub note_updated_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub is_current: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restored_from_version: Option<i32>,
}

impl From<StoredVersion> for NoteVersion {
    fn from(v: StoredVersion) -> Self {
        NoteVersion {
            id: Some(v.id),
            note_id: v.note_id,
            version_number: v.version_number,
            title: v.title,
            content: v.content,
            author: v.author,
            note_created_at: v.note_created_at,
            note_updated_at: v.note_updated_at,
            created_at: v.created_at,
            is_current: false,
            restored_from_version: None,
        }
    }
}

pub fn next_version_number(latest: Option<i32>) -> i32 {
    latest.map_or(1, |n| n + 1)
}

/// How many of the oldest stored versions must go once `stored` exist.
pub fn prune_count(stored: usize) -> usize {
    stored.saturating_sub(MAX_VERSIONS_PER_NOTE)
}

/// `stored` must be ordered newest first.
pub fn current_version(note: &Note, stored: &[StoredVersion]) -> NoteVersion {
    let latest = stored.iter().map(|v| v.version_number).max();
    let restored_from_version = stored
        .iter()
        .find(|v| v.title == note.title && v.content == note.content)
        .map(|v| v.version_number);

    NoteVersion {
        id: None,
        note_id: note.id,
        version_number: next_version_number(latest),
        title: note.title.clone(),
        content: note.content.clone(),
        author: note.author.clone(),
        note_created_at: note.created_at,
        note_updated_at: note.updated_at,
        created_at: note.updated_at,
        is_current: true,
        restored_from_version,
    }
}

/// Full history: the live state first, then stored versions newest first.
pub fn history(note: &Note, stored: Vec<StoredVersion>) -> Vec<NoteVersion> {
    let mut versions = Vec::with_capacity(stored.len() + 1);
    versions.push(current_version(note, &stored));
    versions.extend(stored.into_iter().map(NoteVersion::from));
    versions
}

/// Resolves `version_number` against stored versions (newest first) and the
/// note's live state.
pub fn find_version(note: &Note, stored: Vec<StoredVersion>, version_number: i32) -> Option<NoteVersion> {
    let current = current_version(note, &stored);
    if current.version_number == version_number {
        return Some(current);
    }
    stored
        .into_iter()
        .find(|v| v.version_number == version_number)
        .map(NoteVersion::from)
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionComparison {
    pub left_version: NoteVersion,
    pub right_version: NoteVersion,
    pub title_diff: TextDiff,
    pub content_diff: TextDiff,
    pub has_changes: bool,
}

impl VersionComparison {
    pub fn new(left_version: NoteVersion, right_version: NoteVersion) -> Self {
        let title_diff = TextDiff::between(&left_version.title, &right_version.title);
        let content_diff = TextDiff::between(&left_version.content, &right_version.content);
        let has_changes = title_diff.has_changes() || content_diff.has_changes();

        VersionComparison {
            left_version,
            right_version,
            title_diff,
            content_diff,
            has_changes,
        }
    }
}
