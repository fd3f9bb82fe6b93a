use std::sync::Arc;

use crate::config::{Config, StoreKind};
use crate::errors::ServerError;
use crate::models::{
    filter::NoteFilter,
    folder::{FolderDetail, FolderSummary},
    note::{NewNote, Note, NoteSearch, NoteUpdate},
    tag::{Tag, TagFilter},
    version::NoteVersion,
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Data access for notes and everything hanging off them.
///
/// Calls are synchronous; handlers run them on the blocking thread pool.
/// "Absent" results (`None`, `false`) are not errors, while a missing parent
/// resource of a nested operation is reported as [`ServerError::NotFound`].
pub trait NoteStore: Send + Sync {
    fn create_note(&self, note: NewNote) -> Result<Note, ServerError>;

    /// Newest first.
    fn all_notes(&self) -> Result<Vec<Note>, ServerError>;

    fn note_by_id(&self, id: i32) -> Result<Option<Note>, ServerError>;

    fn search_notes(&self, search: &NoteSearch) -> Result<Vec<Note>, ServerError>;

    /// Newest first. Criteria of `filter` are combined with AND.
    fn filter_notes(&self, filter: &NoteFilter) -> Result<Vec<Note>, ServerError>;

    /// Creates a new note with the title, content, author and tags of `id`.
    /// History and folder memberships are not copied.
    fn copy_note(&self, id: i32) -> Result<Option<Note>, ServerError>;

    /// Applies the supplied fields and refreshes `updated_at`, snapshotting
    /// the previous state when title or content actually change. An empty
    /// update returns the stored note untouched.
    fn update_note(&self, id: i32, update: NoteUpdate) -> Result<Option<Note>, ServerError>;

    /// `true` iff a note was removed.
    fn delete_note(&self, id: i32) -> Result<bool, ServerError>;

    /// `None` when the note does not exist.
    fn version_history(&self, note_id: i32) -> Result<Option<Vec<NoteVersion>>, ServerError>;

    fn version(&self, note_id: i32, version_number: i32) -> Result<Option<NoteVersion>, ServerError>;

    /// Snapshots the live state, then copies the stored version back onto the note.
    fn restore_version(&self, note_id: i32, version_number: i32) -> Result<Note, ServerError>;

    /// Ordered by name, ignoring case.
    fn all_folders(&self) -> Result<Vec<FolderSummary>, ServerError>;

    fn create_folder(&self, name: String) -> Result<FolderSummary, ServerError>;

    fn folder_detail(&self, id: i32) -> Result<Option<FolderDetail>, ServerError>;

    fn delete_folder(&self, id: i32) -> Result<bool, ServerError>;

    fn add_note_to_folder(&self, folder_id: i32, note_id: i32) -> Result<(), ServerError>;

    fn remove_note_from_folder(&self, folder_id: i32, note_id: i32) -> Result<(), ServerError>;

    /// Ordered by name, ignoring case.
    fn tags(&self, filter: &TagFilter) -> Result<Vec<Tag>, ServerError>;

    fn create_tag(&self, name: String) -> Result<Tag, ServerError>;

    /// `None` when the note does not exist.
    fn note_tags(&self, note_id: i32) -> Result<Option<Vec<Tag>>, ServerError>;

    fn tag_note(&self, note_id: i32, tag_id: i32) -> Result<(), ServerError>;

    fn untag_note(&self, note_id: i32, tag_id: i32) -> Result<(), ServerError>;
}

pub fn connect(config: &Config) -> Result<Arc<dyn NoteStore>, ServerError> {
    match config.store {
        StoreKind::Memory => {
            log::warn!("using the in-memory store, notes are lost on restart");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreKind::Postgres => {
            let database_url = config.database_url.as_deref().ok_or_else(|| {
                ServerError::EnvironmentError("DATABASE_URL is not set".to_string())
            })?;
            let store = PgStore::connect(database_url, config.pool_size)?;
            store.run_migrations()?;
            Ok(Arc::new(store))
        }
    }
}
