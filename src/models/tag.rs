use chrono::{DateTime, Utc};
use diesel::{Insertable, Queryable};
use serde_derive::{Deserialize, Serialize};

use super::{contains_pattern, required};
use crate::errors::ServerError;
use crate::schema::tags;

/// Tags listed when no filter is given.
pub const TAG_LIST_LIMIT: i64 = 20;

#[derive(Clone, Debug, PartialEq, Queryable, Serialize)]
pub struct Tag {
    pub id: i32,
    pub name: String,
    #[serde(skip_serializing)]
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct IncomingTag {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Insertable)]
#[diesel(table_name = tags)]
pub struct InsertTag {
    pub name: String,
    pub created_at: DateTime<Utc>,
}

impl IncomingTag {
    /// Returns the trimmed tag name.
    pub fn validate(self) -> Result<String, ServerError> {
        let mut errors = vec![];
        let name = required(self.name, "Tag name is required", &mut errors);
        if !errors.is_empty() {
            return Err(ServerError::validation(errors));
        }
        Ok(name)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum TagFilter {
    All,
    NameContains(String),
}

impl TagFilter {
    pub fn new(q: Option<String>) -> Self {
        match q.map(|q| q.trim().to_string()) {
            Some(q) if !q.is_empty() => TagFilter::NameContains(q),
            _ => TagFilter::All,
        }
    }

    pub fn like_pattern(&self) -> Option<String> {
        match self {
            TagFilter::All => None,
            TagFilter::NameContains(q) => Some(contains_pattern(q)),
        }
    }

    pub fn matches(&self, tag: &Tag) -> bool {
        match self {
            TagFilter::All => true,
            TagFilter::NameContains(q) => tag.name.to_lowercase().contains(&q.to_lowercase()),
        }
    }
}
