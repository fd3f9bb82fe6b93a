use chrono::{DateTime, Utc};
use diesel::dsl::{exists, max};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::ConnectionManager;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

use super::NoteStore;
use crate::errors::ServerError;
use crate::models::{
    filter::NoteFilter,
    folder::{Folder, FolderDetail, FolderSummary, InsertFolder},
    note::{InsertNote, NewNote, Note, NoteSearch, NoteUpdate},
    tag::{InsertTag, Tag, TagFilter, TAG_LIST_LIMIT},
    version::{self, InsertVersion, NoteVersion, StoredVersion, MAX_VERSIONS_PER_NOTE},
};
use crate::schema::{folder_notes, folders, note_tags, note_versions, notes, tags};

type Pool = r2d2::Pool<ConnectionManager<PgConnection>>;

sql_function!(fn lower(x: diesel::sql_types::Text) -> diesel::sql_types::Text);

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

pub struct PgStore {
    pool: Pool,
}

impl PgStore {
    pub fn connect(database_url: &str, pool_size: u32) -> Result<Self, ServerError> {
        let manager = ConnectionManager::<PgConnection>::new(database_url);
        let pool = r2d2::Pool::builder().max_size(pool_size).build(manager)?;
        Ok(PgStore { pool })
    }

    pub fn run_migrations(&self) -> Result<(), ServerError> {
        let mut connection = self.pool.get()?;
        let applied = connection
            .run_pending_migrations(MIGRATIONS)
            .map_err(|e| ServerError::MigrationError(e.to_string()))?;
        for migration in applied {
            log::info!("applied migration {migration}");
        }
        Ok(())
    }
}

fn on_unique_violation(err: DieselError, conflict: &'static str) -> ServerError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ServerError::Conflict(conflict)
        }
        other => ServerError::DieselError(other),
    }
}

fn find_note(connection: &mut PgConnection, id: i32) -> Result<Option<Note>, ServerError> {
    Ok(notes::table.find(id).first::<Note>(connection).optional()?)
}

fn lock_note(connection: &mut PgConnection, id: i32) -> Result<Option<Note>, ServerError> {
    Ok(notes::table
        .find(id)
        .for_update()
        .get_result::<Note>(connection)
        .optional()?)
}

fn note_exists(connection: &mut PgConnection, id: i32) -> Result<bool, ServerError> {
    Ok(diesel::select(exists(notes::table.find(id))).get_result(connection)?)
}

fn folder_exists(connection: &mut PgConnection, id: i32) -> Result<bool, ServerError> {
    Ok(diesel::select(exists(folders::table.find(id))).get_result(connection)?)
}

fn stored_versions(
    connection: &mut PgConnection,
    note_id: i32,
) -> Result<Vec<StoredVersion>, ServerError> {
    Ok(note_versions::table
        .filter(note_versions::note_id.eq(note_id))
        .order(note_versions::version_number.desc())
        .load::<StoredVersion>(connection)?)
}

/// Stores a snapshot of `note` as its next version and prunes the oldest
/// ones beyond the per-note limit. Must run inside the caller's transaction.
fn record_version(
    connection: &mut PgConnection,
    note: &Note,
    time_now: DateTime<Utc>,
) -> Result<i32, ServerError> {
    let latest = note_versions::table
        .filter(note_versions::note_id.eq(note.id))
        .select(max(note_versions::version_number))
        .first::<Option<i32>>(connection)?;
    let version_number = version::next_version_number(latest);

    diesel::insert_into(note_versions::table)
        .values(InsertVersion::snapshot(note, version_number, time_now))
        .execute(connection)?;

    let keep = note_versions::table
        .filter(note_versions::note_id.eq(note.id))
        .order(note_versions::version_number.desc())
        .limit(MAX_VERSIONS_PER_NOTE as i64)
        .select(note_versions::id)
        .load::<i32>(connection)?;
    let pruned = diesel::delete(
        note_versions::table
            .filter(note_versions::note_id.eq(note.id))
            .filter(note_versions::id.ne_all(keep)),
    )
    .execute(connection)?;

    log::debug!("note {} saved as version {version_number}", note.id);
    if pruned > 0 {
        log::info!("pruned {pruned} old versions of note {}", note.id);
    }
    Ok(version_number)
}

impl NoteStore for PgStore {
    fn create_note(&self, note: NewNote) -> Result<Note, ServerError> {
        let mut connection = self.pool.get()?;
        let result = diesel::insert_into(notes::table)
            .values(note.into_insertable(Utc::now()))
            .get_result::<Note>(&mut connection)?;
        Ok(result)
    }

    fn all_notes(&self) -> Result<Vec<Note>, ServerError> {
        let mut connection = self.pool.get()?;
        Ok(notes::table
            .order((notes::created_at.desc(), notes::id.desc()))
            .load::<Note>(&mut connection)?)
    }

    fn note_by_id(&self, id: i32) -> Result<Option<Note>, ServerError> {
        let mut connection = self.pool.get()?;
        find_note(&mut connection, id)
    }

    fn search_notes(&self, search: &NoteSearch) -> Result<Vec<Note>, ServerError> {
        let mut connection = self.pool.get()?;
        let pattern = search.like_pattern();
        Ok(notes::table
            .filter(
                notes::title
                    .ilike(pattern.clone())
                    .or(notes::content.ilike(pattern)),
            )
            .order((notes::created_at.desc(), notes::id.desc()))
            .offset(search.offset())
            .limit(search.limit())
            .load::<Note>(&mut connection)?)
    }

    fn filter_notes(&self, filter: &NoteFilter) -> Result<Vec<Note>, ServerError> {
        let mut connection = self.pool.get()?;
        let mut query = notes::table.into_boxed();

        if let Some(pattern) = filter.query_pattern() {
            query = query.filter(
                notes::title
                    .ilike(pattern.clone())
                    .or(notes::content.ilike(pattern)),
            );
        }
        if let Some(pattern) = filter.author_pattern() {
            query = query.filter(notes::author.ilike(pattern));
        }
        if let Some(after) = filter.created_after() {
            query = query.filter(notes::created_at.ge(after));
        }
        if let Some(before) = filter.created_before() {
            query = query.filter(notes::created_at.le(before));
        }
        if let Some(after) = filter.updated_after() {
            query = query.filter(notes::updated_at.ge(after));
        }
        if let Some(before) = filter.updated_before() {
            query = query.filter(notes::updated_at.le(before));
        }
        if let Some(folder_id) = filter.folder_id() {
            query = query.filter(
                notes::id.eq_any(
                    folder_notes::table
                        .filter(folder_notes::folder_id.eq(folder_id))
                        .select(folder_notes::note_id),
                ),
            );
        }
        if !filter.tags().is_empty() {
            query = query.filter(
                notes::id.eq_any(
                    note_tags::table
                        .inner_join(tags::table)
                        .filter(lower(tags::name).eq_any(filter.tags().to_vec()))
                        .select(note_tags::note_id),
                ),
            );
        }

        Ok(query
            .order((notes::created_at.desc(), notes::id.desc()))
            .load::<Note>(&mut connection)?)
    }

    fn copy_note(&self, id: i32) -> Result<Option<Note>, ServerError> {
        let mut connection = self.pool.get()?;
        connection.transaction::<_, ServerError, _>(|connection| {
            let source = match find_note(connection, id)? {
                Some(note) => note,
                None => return Ok(None),
            };
            let time_now = Utc::now();
            let copy = diesel::insert_into(notes::table)
                .values(InsertNote {
                    title: source.title,
                    content: source.content,
                    author: source.author,
                    created_at: time_now,
                    updated_at: time_now,
                })
                .get_result::<Note>(connection)?;

            let links: Vec<_> = note_tags::table
                .filter(note_tags::note_id.eq(id))
                .select(note_tags::tag_id)
                .load::<i32>(connection)?
                .into_iter()
                .map(|tag_id| (note_tags::note_id.eq(copy.id), note_tags::tag_id.eq(tag_id)))
                .collect();
            if !links.is_empty() {
                diesel::insert_into(note_tags::table)
                    .values(links)
                    .execute(connection)?;
            }
            log::info!("note {id} copied to {}", copy.id);
            Ok(Some(copy))
        })
    }

    fn update_note(&self, id: i32, update: NoteUpdate) -> Result<Option<Note>, ServerError> {
        let mut connection = self.pool.get()?;
        connection.transaction::<_, ServerError, _>(|connection| {
            let current = match lock_note(connection, id)? {
                Some(note) => note,
                None => return Ok(None),
            };
            if update.is_empty() {
                return Ok(Some(current));
            }

            let time_now = Utc::now();
            if update.differs_from(&current) {
                record_version(connection, &current, time_now)?;
            }

            let note = diesel::update(notes::table.find(id))
                .set(update.into_changeset(time_now))
                .get_result::<Note>(connection)?;
            Ok(Some(note))
        })
    }

    fn delete_note(&self, id: i32) -> Result<bool, ServerError> {
        let mut connection = self.pool.get()?;
        let deleted = diesel::delete(notes::table.find(id)).execute(&mut connection)?;
        Ok(deleted > 0)
    }

    fn version_history(&self, note_id: i32) -> Result<Option<Vec<NoteVersion>>, ServerError> {
        let mut connection = self.pool.get()?;
        let note = match find_note(&mut connection, note_id)? {
            Some(note) => note,
            None => return Ok(None),
        };
        let stored = stored_versions(&mut connection, note_id)?;
        Ok(Some(version::history(&note, stored)))
    }

    fn version(&self, note_id: i32, version_number: i32) -> Result<Option<NoteVersion>, ServerError> {
        let mut connection = self.pool.get()?;
        let note = match find_note(&mut connection, note_id)? {
            Some(note) => note,
            None => return Ok(None),
        };
        let stored = stored_versions(&mut connection, note_id)?;
        Ok(version::find_version(&note, stored, version_number))
    }

    fn restore_version(&self, note_id: i32, version_number: i32) -> Result<Note, ServerError> {
        let mut connection = self.pool.get()?;
        connection.transaction::<_, ServerError, _>(|connection| {
            let current = lock_note(connection, note_id)?.ok_or(ServerError::NotFound("Note"))?;
            let target = note_versions::table
                .filter(note_versions::note_id.eq(note_id))
                .filter(note_versions::version_number.eq(version_number))
                .first::<StoredVersion>(connection)
                .optional()?
                .ok_or(ServerError::NotFound("Version"))?;

            let time_now = Utc::now();
            record_version(connection, &current, time_now)?;

            let note = diesel::update(notes::table.find(note_id))
                .set((
                    notes::title.eq(target.title),
                    notes::content.eq(target.content),
                    notes::updated_at.eq(time_now),
                ))
                .get_result::<Note>(connection)?;
            log::info!("note {note_id} restored to version {version_number}");
            Ok(note)
        })
    }

    fn all_folders(&self) -> Result<Vec<FolderSummary>, ServerError> {
        let mut connection = self.pool.get()?;
        let result = folders::table
            .order((lower(folders::name).asc(), folders::name.asc()))
            .load::<Folder>(&mut connection)?;
        Ok(result.iter().map(FolderSummary::from).collect())
    }

    fn create_folder(&self, name: String) -> Result<FolderSummary, ServerError> {
        let mut connection = self.pool.get()?;
        let folder = diesel::insert_into(folders::table)
            .values(InsertFolder::new(name, Utc::now()))
            .get_result::<Folder>(&mut connection)
            .map_err(|e| on_unique_violation(e, "Folder name already exists"))?;
        Ok(FolderSummary::from(&folder))
    }

    fn folder_detail(&self, id: i32) -> Result<Option<FolderDetail>, ServerError> {
        let mut connection = self.pool.get()?;
        let folder = match folders::table
            .find(id)
            .first::<Folder>(&mut connection)
            .optional()?
        {
            Some(folder) => folder,
            None => return Ok(None),
        };
        let note_ids = folder_notes::table
            .filter(folder_notes::folder_id.eq(id))
            .order(folder_notes::note_id.asc())
            .select(folder_notes::note_id)
            .load::<i32>(&mut connection)?;
        Ok(Some(FolderDetail::new(&folder, note_ids)))
    }

    fn delete_folder(&self, id: i32) -> Result<bool, ServerError> {
        let mut connection = self.pool.get()?;
        let deleted = diesel::delete(folders::table.find(id)).execute(&mut connection)?;
        Ok(deleted > 0)
    }

    fn add_note_to_folder(&self, folder_id: i32, note_id: i32) -> Result<(), ServerError> {
        let mut connection = self.pool.get()?;
        if !folder_exists(&mut connection, folder_id)? {
            return Err(ServerError::NotFound("Folder"));
        }
        if !note_exists(&mut connection, note_id)? {
            return Err(ServerError::NotFound("Note"));
        }
        diesel::insert_into(folder_notes::table)
            .values((
                folder_notes::folder_id.eq(folder_id),
                folder_notes::note_id.eq(note_id),
            ))
            .execute(&mut connection)
            .map_err(|e| on_unique_violation(e, "Note already in folder"))?;
        Ok(())
    }

    fn remove_note_from_folder(&self, folder_id: i32, note_id: i32) -> Result<(), ServerError> {
        let mut connection = self.pool.get()?;
        if !folder_exists(&mut connection, folder_id)? {
            return Err(ServerError::NotFound("Folder"));
        }
        diesel::delete(
            folder_notes::table
                .filter(folder_notes::folder_id.eq(folder_id))
                .filter(folder_notes::note_id.eq(note_id)),
        )
        .execute(&mut connection)?;
        Ok(())
    }

    fn tags(&self, filter: &TagFilter) -> Result<Vec<Tag>, ServerError> {
        let mut connection = self.pool.get()?;
        let result = match filter.like_pattern() {
            Some(pattern) => tags::table
                .filter(tags::name.ilike(pattern))
                .order((lower(tags::name).asc(), tags::name.asc()))
                .load::<Tag>(&mut connection)?,
            None => tags::table
                .order((lower(tags::name).asc(), tags::name.asc()))
                .limit(TAG_LIST_LIMIT)
                .load::<Tag>(&mut connection)?,
        };
        Ok(result)
    }

    fn create_tag(&self, name: String) -> Result<Tag, ServerError> {
        let mut connection = self.pool.get()?;
        diesel::insert_into(tags::table)
            .values(InsertTag {
                name,
                created_at: Utc::now(),
            })
            .get_result::<Tag>(&mut connection)
            .map_err(|e| on_unique_violation(e, "Tag already exists"))
    }

    fn note_tags(&self, note_id: i32) -> Result<Option<Vec<Tag>>, ServerError> {
        let mut connection = self.pool.get()?;
        if !note_exists(&mut connection, note_id)? {
            return Ok(None);
        }
        let result = tags::table
            .inner_join(note_tags::table)
            .filter(note_tags::note_id.eq(note_id))
            .order((lower(tags::name).asc(), tags::name.asc()))
            .select((tags::id, tags::name, tags::created_at))
            .load::<Tag>(&mut connection)?;
        Ok(Some(result))
    }

    fn tag_note(&self, note_id: i32, tag_id: i32) -> Result<(), ServerError> {
        let mut connection = self.pool.get()?;
        if !note_exists(&mut connection, note_id)? {
            return Err(ServerError::NotFound("Note"));
        }
        let tag_exists: bool =
            diesel::select(exists(tags::table.find(tag_id))).get_result(&mut connection)?;
        if !tag_exists {
            return Err(ServerError::NotFound("Tag"));
        }
        diesel::insert_into(note_tags::table)
            .values((note_tags::note_id.eq(note_id), note_tags::tag_id.eq(tag_id)))
            .execute(&mut connection)
            .map_err(|e| on_unique_violation(e, "Tag already attached to note"))?;
        Ok(())
    }

    fn untag_note(&self, note_id: i32, tag_id: i32) -> Result<(), ServerError> {
        let mut connection = self.pool.get()?;
        if !note_exists(&mut connection, note_id)? {
            return Err(ServerError::NotFound("Note"));
        }
        diesel::delete(
            note_tags::table
                .filter(note_tags::note_id.eq(note_id))
                .filter(note_tags::tag_id.eq(tag_id)),
        )
        .execute(&mut connection)?;
        Ok(())
    }
}
