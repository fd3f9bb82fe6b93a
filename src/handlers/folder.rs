use actix_web::{web, HttpResponse};

use super::{run, Store};
use crate::{
    errors::ServerError,
    models::{filter::IncomingNoteFilter, folder::IncomingFolder},
    utils::parse_id,
};

pub async fn list(store: Store) -> Result<HttpResponse, ServerError> {
    let folders = run(&store, |store| store.all_folders()).await?;
    Ok(HttpResponse::Ok().json(folders))
}

pub async fn create(
    input: web::Json<IncomingFolder>,
    store: Store,
) -> Result<HttpResponse, ServerError> {
    let name = input.into_inner().validate()?;
    let folder = run(&store, move |store| store.create_folder(name)).await?;
    Ok(HttpResponse::Created().json(folder))
}

pub async fn get(folder_id: web::Path<String>, store: Store) -> Result<HttpResponse, ServerError> {
    let id = parse_id(&folder_id, "folder ID")?;

    match run(&store, move |store| store.folder_detail(id)).await? {
        Some(folder) => Ok(HttpResponse::Ok().json(folder)),
        None => Err(ServerError::NotFound("Folder")),
    }
}

pub async fn delete(
    folder_id: web::Path<String>,
    store: Store,
) -> Result<HttpResponse, ServerError> {
    let id = parse_id(&folder_id, "folder ID")?;

    if run(&store, move |store| store.delete_folder(id)).await? {
        Ok(HttpResponse::NoContent().finish())
    } else {
        Err(ServerError::NotFound("Folder"))
    }
}

fn membership(path: (String, String)) -> Result<(i32, i32), ServerError> {
    let folder_id = parse_id(&path.0, "folder ID")?;
    let note_id = parse_id(&path.1, "note ID")?;
    Ok((folder_id, note_id))
}

pub async fn add_note(
    path: web::Path<(String, String)>,
    store: Store,
) -> Result<HttpResponse, ServerError> {
    let (folder_id, note_id) = membership(path.into_inner())?;
    run(&store, move |store| store.add_note_to_folder(folder_id, note_id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn remove_note(
    path: web::Path<(String, String)>,
    store: Store,
) -> Result<HttpResponse, ServerError> {
    let (folder_id, note_id) = membership(path.into_inner())?;
    run(&store, move |store| {
        store.remove_note_from_folder(folder_id, note_id)
    })
    .await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn search(
    folder_id: web::Path<String>,
    input: web::Query<IncomingNoteFilter>,
    store: Store,
) -> Result<HttpResponse, ServerError> {
    let id = parse_id(&folder_id, "folder ID")?;
    let filter = input.into_inner().validate()?.in_folder(id);

    let notes = run(&store, move |store| {
        if store.folder_detail(id)?.is_none() {
            return Err(ServerError::NotFound("Folder"));
        }
        store.filter_notes(&filter)
    })
    .await?;
    Ok(HttpResponse::Ok().json(notes))
}
