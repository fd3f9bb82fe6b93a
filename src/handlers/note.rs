use actix_web::{web, HttpResponse};
use serde_derive::Deserialize;
use serde_json::json;

use super::{run, Store};
use crate::{
    errors::ServerError,
    models::{
        filter::IncomingNoteFilter,
        note::{IncomingNote, IncomingNoteUpdate, NoteSearch},
    },
    utils::parse_id,
};

pub async fn list(store: Store) -> Result<HttpResponse, ServerError> {
    let notes = run(&store, |store| store.all_notes()).await?;
    Ok(HttpResponse::Ok().json(notes))
}

pub async fn create(
    input: web::Json<IncomingNote>,
    store: Store,
) -> Result<HttpResponse, ServerError> {
    let new_note = input.into_inner().validate()?;
    let note = run(&store, move |store| store.create_note(new_note)).await?;
    Ok(HttpResponse::Created().json(note))
}

pub async fn get(note_id: web::Path<String>, store: Store) -> Result<HttpResponse, ServerError> {
    let id = parse_id(&note_id, "note ID")?;

    match run(&store, move |store| store.note_by_id(id)).await? {
        Some(note) => Ok(HttpResponse::Ok().json(note)),
        None => Err(ServerError::NotFound("Note")),
    }
}

pub async fn update(
    note_id: web::Path<String>,
    input: web::Json<IncomingNoteUpdate>,
    store: Store,
) -> Result<HttpResponse, ServerError> {
    let id = parse_id(&note_id, "note ID")?;
    let update = input.into_inner().validate()?;

    match run(&store, move |store| store.update_note(id, update)).await? {
        Some(note) => Ok(HttpResponse::Ok().json(note)),
        None => Err(ServerError::NotFound("Note")),
    }
}

pub async fn delete(note_id: web::Path<String>, store: Store) -> Result<HttpResponse, ServerError> {
    let id = parse_id(&note_id, "note ID")?;

    if run(&store, move |store| store.delete_note(id)).await? {
        Ok(HttpResponse::Ok().json(json!({ "message": "Note deleted successfully" })))
    } else {
        Err(ServerError::NotFound("Note"))
    }
}

#[derive(Deserialize)]
pub struct SearchParameterQuery {
    pub q: Option<String>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

pub async fn search(
    input: web::Query<SearchParameterQuery>,
    store: Store,
) -> Result<HttpResponse, ServerError> {
    let input = input.into_inner();
    let search = NoteSearch::new(input.q, input.offset, input.limit)?;
    let notes = run(&store, move |store| store.search_notes(&search)).await?;
    Ok(HttpResponse::Ok().json(notes))
}

pub async fn advanced_search(
    input: web::Query<IncomingNoteFilter>,
    store: Store,
) -> Result<HttpResponse, ServerError> {
    let filter = input.into_inner().validate()?;
    log::debug!("advanced search {:?}", filter);
    let notes = run(&store, move |store| store.filter_notes(&filter)).await?;
    Ok(HttpResponse::Ok().json(notes))
}

pub async fn copy(note_id: web::Path<String>, store: Store) -> Result<HttpResponse, ServerError> {
    let id = parse_id(&note_id, "note ID")?;

    match run(&store, move |store| store.copy_note(id)).await? {
        Some(note) => Ok(HttpResponse::Created().json(note)),
        None => Err(ServerError::NotFound("Note")),
    }
}
