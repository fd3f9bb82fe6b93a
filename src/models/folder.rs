use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable};
use serde_derive::{Deserialize, Serialize};

use super::required;
use crate::errors::ServerError;
use crate::schema::folders;

#[derive(Clone, Debug, PartialEq, Queryable)]
pub struct Folder {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FolderSummary {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FolderNoteRef {
    pub id: i32,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FolderDetail {
    pub id: i32,
    pub name: String,
    pub notes: Vec<FolderNoteRef>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct IncomingFolder {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = folders)]
pub struct InsertFolder {
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl IncomingFolder {
    /// Returns the trimmed folder name.
    pub fn validate(self) -> Result<String, ServerError> {
        let mut errors = vec![];
        let name = required(self.name, "Name required", &mut errors);
        if !errors.is_empty() {
            return Err(ServerError::validation(errors));
        }
        Ok(name)
    }
}

impl InsertFolder {
    pub fn new(name: String, time_now: DateTime<Utc>) -> Self {
        InsertFolder {
            name,
            created_at: time_now,
            updated_at: time_now,
        }
    }
}

impl From<&Folder> for FolderSummary {
    fn from(f: &Folder) -> Self {
        FolderSummary {
            id: f.id,
            name: f.name.clone(),
        }
    }
}

impl FolderDetail {
    pub fn new(folder: &Folder, note_ids: impl IntoIterator<Item = i32>) -> Self {
        FolderDetail {
            id: folder.id,
            name: folder.name.clone(),
            notes: note_ids.into_iter().map(|id| FolderNoteRef { id }).collect(),
        }
    }
}
