use actix_web::{web, HttpResponse};
use serde_derive::Deserialize;

use super::{run, Store};
use crate::{errors::ServerError, models::version::VersionComparison, utils::parse_id};

pub async fn history(note_id: web::Path<String>, store: Store) -> Result<HttpResponse, ServerError> {
    let id = parse_id(&note_id, "note ID")?;

    match run(&store, move |store| store.version_history(id)).await? {
        Some(versions) => Ok(HttpResponse::Ok().json(versions)),
        None => Err(ServerError::NotFound("Note")),
    }
}

pub async fn get(
    path: web::Path<(String, String)>,
    store: Store,
) -> Result<HttpResponse, ServerError> {
    let (note_id, version_number) = path.into_inner();
    let note_id = parse_id(&note_id, "note ID")?;
    let version_number = parse_id(&version_number, "version number")?;

    match run(&store, move |store| store.version(note_id, version_number)).await? {
        Some(version) => Ok(HttpResponse::Ok().json(version)),
        None => Err(ServerError::NotFound("Version")),
    }
}

pub async fn restore(
    path: web::Path<(String, String)>,
    store: Store,
) -> Result<HttpResponse, ServerError> {
    let (note_id, version_number) = path.into_inner();
    let note_id = parse_id(&note_id, "note ID")?;
    let version_number = parse_id(&version_number, "version number")?;

    let note = run(&store, move |store| store.restore_version(note_id, version_number)).await?;
    Ok(HttpResponse::Ok().json(note))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompareQuery {
    pub old_version: Option<String>,
    pub new_version: Option<String>,
}

pub async fn compare(
    note_id: web::Path<String>,
    query: web::Query<CompareQuery>,
    store: Store,
) -> Result<HttpResponse, ServerError> {
    let id = parse_id(&note_id, "note ID")?;
    let query = query.into_inner();
    let (old_version, new_version) = match (query.old_version, query.new_version) {
        (Some(old), Some(new)) => (
            parse_id(&old, "version number")?,
            parse_id(&new, "version number")?,
        ),
        _ => {
            return Err(ServerError::Validation(
                "oldVersion and newVersion are required".to_string(),
            ))
        }
    };

    let (left, right) = run(&store, move |store| {
        if store.note_by_id(id)?.is_none() {
            return Err(ServerError::NotFound("Note"));
        }
        let left = store.version(id, old_version)?;
        let right = store.version(id, new_version)?;
        Ok((left, right))
    })
    .await?;

    match (left, right) {
        (Some(left), Some(right)) => {
            log::debug!("comparing versions {old_version} and {new_version} of note {id}");
            Ok(HttpResponse::Ok().json(VersionComparison::new(left, right)))
        }
        _ => Err(ServerError::NotFound("Version")),
    }
}
