use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;

use super::NoteStore;
use crate::errors::ServerError;
use crate::models::{
    filter::NoteFilter,
    folder::{Folder, FolderDetail, FolderSummary},
    note::{NewNote, Note, NoteSearch, NoteUpdate},
    tag::{Tag, TagFilter, TAG_LIST_LIMIT},
    version::{self, InsertVersion, NoteVersion, StoredVersion},
};

#[derive(Default)]
struct State {
    last_note_id: i32,
    last_version_id: i32,
    last_folder_id: i32,
    last_tag_id: i32,
    notes: BTreeMap<i32, Note>,
    /// Per note, oldest first.
    versions: BTreeMap<i32, Vec<StoredVersion>>,
    folders: BTreeMap<i32, Folder>,
    folder_notes: BTreeSet<(i32, i32)>,
    tags: BTreeMap<i32, Tag>,
    note_tags: BTreeSet<(i32, i32)>,
}

impl State {
    fn newest_first(&self, note_id: i32) -> Vec<StoredVersion> {
        let mut stored = self.versions.get(&note_id).cloned().unwrap_or_default();
        stored.reverse();
        stored
    }

    fn record_version(&mut self, note: &Note) -> i32 {
        self.last_version_id += 1;
        let id = self.last_version_id;
        let stored = self.versions.entry(note.id).or_default();
        let latest = stored.last().map(|v| v.version_number);
        let version_number = version::next_version_number(latest);
        stored.push(InsertVersion::snapshot(note, version_number, Utc::now()).into_stored(id));

        let pruned = version::prune_count(stored.len());
        if pruned > 0 {
            stored.drain(..pruned);
            log::info!("pruned {pruned} old versions of note {}", note.id);
        }
        version_number
    }
}

/// Keeps everything in process memory behind one mutex. Used by the test
/// suite and for running the API without a database.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, ServerError> {
        Ok(self.state.lock()?)
    }
}

/// Case-insensitive, falling back to byte order between names that differ only in case.
fn by_name(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

fn sorted_newest_first(mut notes: Vec<Note>) -> Vec<Note> {
    notes.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
    notes
}

impl NoteStore for MemoryStore {
    fn create_note(&self, note: NewNote) -> Result<Note, ServerError> {
        let mut state = self.lock()?;
        state.last_note_id += 1;
        let insert = note.into_insertable(Utc::now());
        let note = Note {
            id: state.last_note_id,
            title: insert.title,
            content: insert.content,
            author: insert.author,
            created_at: insert.created_at,
            updated_at: insert.updated_at,
        };
        state.notes.insert(note.id, note.clone());
        Ok(note)
    }

    fn all_notes(&self) -> Result<Vec<Note>, ServerError> {
        let state = self.lock()?;
        Ok(sorted_newest_first(state.notes.values().cloned().collect()))
    }

    fn note_by_id(&self, id: i32) -> Result<Option<Note>, ServerError> {
        Ok(self.lock()?.notes.get(&id).cloned())
    }

    fn search_notes(&self, search: &NoteSearch) -> Result<Vec<Note>, ServerError> {
        let state = self.lock()?;
        let matching = state
            .notes
            .values()
            .filter(|note| search.matches(note))
            .cloned()
            .collect();
        Ok(sorted_newest_first(matching)
            .into_iter()
            .skip(search.offset() as usize)
            .take(search.limit() as usize)
            .collect())
    }

    fn filter_notes(&self, filter: &NoteFilter) -> Result<Vec<Note>, ServerError> {
        let state = self.lock()?;
        let matching = state
            .notes
            .values()
            .filter(|note| filter.matches(note))
            .filter(|note| {
                filter.folder_id().map_or(true, |folder_id| {
                    state.folder_notes.contains(&(folder_id, note.id))
                })
            })
            .filter(|note| {
                let names: Vec<String> = state
                    .note_tags
                    .range((note.id, i32::MIN)..=(note.id, i32::MAX))
                    .filter_map(|(_, tag_id)| state.tags.get(tag_id))
                    .map(|tag| tag.name.to_lowercase())
                    .collect();
                filter.matches_tags(names.iter().map(String::as_str))
            })
            .cloned()
            .collect();
        Ok(sorted_newest_first(matching))
    }

    fn copy_note(&self, id: i32) -> Result<Option<Note>, ServerError> {
        let mut state = self.lock()?;
        let source = match state.notes.get(&id) {
            Some(note) => note.clone(),
            None => return Ok(None),
        };
        state.last_note_id += 1;
        let time_now = Utc::now();
        let copy = Note {
            id: state.last_note_id,
            created_at: time_now,
            updated_at: time_now,
            ..source
        };
        let tag_ids: Vec<i32> = state
            .note_tags
            .range((id, i32::MIN)..=(id, i32::MAX))
            .map(|&(_, tag_id)| tag_id)
            .collect();
        for tag_id in tag_ids {
            state.note_tags.insert((copy.id, tag_id));
        }
        state.notes.insert(copy.id, copy.clone());
        log::info!("note {id} copied to {}", copy.id);
        Ok(Some(copy))
    }

    fn update_note(&self, id: i32, update: NoteUpdate) -> Result<Option<Note>, ServerError> {
        let mut state = self.lock()?;
        let current = match state.notes.get(&id) {
            Some(note) => note.clone(),
            None => return Ok(None),
        };
        if update.is_empty() {
            return Ok(Some(current));
        }

        if update.differs_from(&current) {
            state.record_version(&current);
        }
        let mut note = current;
        update.apply_to(&mut note, Utc::now());
        state.notes.insert(id, note.clone());
        Ok(Some(note))
    }

    fn delete_note(&self, id: i32) -> Result<bool, ServerError> {
        let mut state = self.lock()?;
        if state.notes.remove(&id).is_none() {
            return Ok(false);
        }
        state.versions.remove(&id);
        state.folder_notes.retain(|&(_, note_id)| note_id != id);
        state.note_tags.retain(|&(note_id, _)| note_id != id);
        Ok(true)
    }

    fn version_history(&self, note_id: i32) -> Result<Option<Vec<NoteVersion>>, ServerError> {
        let state = self.lock()?;
        Ok(state
            .notes
            .get(&note_id)
            .map(|note| version::history(note, state.newest_first(note_id))))
    }

    fn version(&self, note_id: i32, version_number: i32) -> Result<Option<NoteVersion>, ServerError> {
        let state = self.lock()?;
        Ok(state.notes.get(&note_id).and_then(|note| {
            version::find_version(note, state.newest_first(note_id), version_number)
        }))
    }

    fn restore_version(&self, note_id: i32, version_number: i32) -> Result<Note, ServerError> {
        let mut state = self.lock()?;
        let current = state
            .notes
            .get(&note_id)
            .cloned()
            .ok_or(ServerError::NotFound("Note"))?;
        let target = state
            .versions
            .get(&note_id)
            .and_then(|stored| stored.iter().find(|v| v.version_number == version_number))
            .cloned()
            .ok_or(ServerError::NotFound("Version"))?;

        state.record_version(&current);
        let mut note = current;
        note.title = target.title;
        note.content = target.content;
        note.updated_at = Utc::now();
        state.notes.insert(note_id, note.clone());
        log::info!("note {note_id} restored to version {version_number}");
        Ok(note)
    }

    fn all_folders(&self) -> Result<Vec<FolderSummary>, ServerError> {
        let state = self.lock()?;
        let mut folders: Vec<FolderSummary> = state.folders.values().map(FolderSummary::from).collect();
        folders.sort_by(|a, b| by_name(&a.name, &b.name));
        Ok(folders)
    }

    fn create_folder(&self, name: String) -> Result<FolderSummary, ServerError> {
        let mut state = self.lock()?;
        if state.folders.values().any(|f| f.name == name) {
            return Err(ServerError::Conflict("Folder name already exists"));
        }
        state.last_folder_id += 1;
        let time_now = Utc::now();
        let folder = Folder {
            id: state.last_folder_id,
            name,
            created_at: time_now,
            updated_at: time_now,
        };
        let summary = FolderSummary::from(&folder);
        state.folders.insert(folder.id, folder);
        Ok(summary)
    }

    fn folder_detail(&self, id: i32) -> Result<Option<FolderDetail>, ServerError> {
        let state = self.lock()?;
        Ok(state.folders.get(&id).map(|folder| {
            let note_ids = state
                .folder_notes
                .range((id, i32::MIN)..=(id, i32::MAX))
                .map(|&(_, note_id)| note_id);
            FolderDetail::new(folder, note_ids)
        }))
    }

    fn delete_folder(&self, id: i32) -> Result<bool, ServerError> {
        let mut state = self.lock()?;
        if state.folders.remove(&id).is_none() {
            return Ok(false);
        }
        state.folder_notes.retain(|&(folder_id, _)| folder_id != id);
        Ok(true)
    }

    fn add_note_to_folder(&self, folder_id: i32, note_id: i32) -> Result<(), ServerError> {
        let mut state = self.lock()?;
        if !state.folders.contains_key(&folder_id) {
            return Err(ServerError::NotFound("Folder"));
        }
        if !state.notes.contains_key(&note_id) {
            return Err(ServerError::NotFound("Note"));
        }
        if !state.folder_notes.insert((folder_id, note_id)) {
            return Err(ServerError::Conflict("Note already in folder"));
        }
        Ok(())
    }

    fn remove_note_from_folder(&self, folder_id: i32, note_id: i32) -> Result<(), ServerError> {
        let mut state = self.lock()?;
        if !state.folders.contains_key(&folder_id) {
            return Err(ServerError::NotFound("Folder"));
        }
        state.folder_notes.remove(&(folder_id, note_id));
        Ok(())
    }

    fn tags(&self, filter: &TagFilter) -> Result<Vec<Tag>, ServerError> {
        let state = self.lock()?;
        let mut result: Vec<Tag> = state
            .tags
            .values()
            .filter(|tag| filter.matches(tag))
            .cloned()
            .collect();
        result.sort_by(|a, b| by_name(&a.name, &b.name));
        if *filter == TagFilter::All {
            result.truncate(TAG_LIST_LIMIT as usize);
        }
        Ok(result)
    }

    fn create_tag(&self, name: String) -> Result<Tag, ServerError> {
        let mut state = self.lock()?;
        let lowered = name.to_lowercase();
        if state.tags.values().any(|t| t.name.to_lowercase() == lowered) {
            return Err(ServerError::Conflict("Tag already exists"));
        }
        state.last_tag_id += 1;
        let tag = Tag {
            id: state.last_tag_id,
            name,
            created_at: Utc::now(),
        };
        state.tags.insert(tag.id, tag.clone());
        Ok(tag)
    }

    fn note_tags(&self, note_id: i32) -> Result<Option<Vec<Tag>>, ServerError> {
        let state = self.lock()?;
        if !state.notes.contains_key(&note_id) {
            return Ok(None);
        }
        let mut result: Vec<Tag> = state
            .note_tags
            .range((note_id, i32::MIN)..=(note_id, i32::MAX))
            .filter_map(|(_, tag_id)| state.tags.get(tag_id).cloned())
            .collect();
        result.sort_by(|a, b| by_name(&a.name, &b.name));
        Ok(Some(result))
    }

    fn tag_note(&self, note_id: i32, tag_id: i32) -> Result<(), ServerError> {
        let mut state = self.lock()?;
        if !state.notes.contains_key(&note_id) {
            return Err(ServerError::NotFound("Note"));
        }
        if !state.tags.contains_key(&tag_id) {
            return Err(ServerError::NotFound("Tag"));
        }
        if !state.note_tags.insert((note_id, tag_id)) {
            return Err(ServerError::Conflict("Tag already attached to note"));
        }
        Ok(())
    }

    fn untag_note(&self, note_id: i32, tag_id: i32) -> Result<(), ServerError> {
        let mut state = self.lock()?;
        if !state.notes.contains_key(&note_id) {
            return Err(ServerError::NotFound("Note"));
        }
        state.note_tags.remove(&(note_id, tag_id));
        Ok(())
    }
}
