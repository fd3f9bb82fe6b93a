use actix_web::{web, HttpResponse};
use serde_derive::Deserialize;

use super::{run, Store};
use crate::{
    errors::ServerError,
    models::tag::{IncomingTag, TagFilter},
    utils::parse_id,
};

#[derive(Deserialize)]
pub struct TagQuery {
    pub q: Option<String>,
}

pub async fn list(query: web::Query<TagQuery>, store: Store) -> Result<HttpResponse, ServerError> {
    let filter = TagFilter::new(query.into_inner().q);
    let tags = run(&store, move |store| store.tags(&filter)).await?;
    Ok(HttpResponse::Ok().json(tags))
}

pub async fn create(
    input: web::Json<IncomingTag>,
    store: Store,
) -> Result<HttpResponse, ServerError> {
    let name = input.into_inner().validate()?;
    let tag = run(&store, move |store| store.create_tag(name)).await?;
    Ok(HttpResponse::Created().json(tag))
}

pub async fn for_note(note_id: web::Path<String>, store: Store) -> Result<HttpResponse, ServerError> {
    let id = parse_id(&note_id, "note ID")?;

    match run(&store, move |store| store.note_tags(id)).await? {
        Some(tags) => Ok(HttpResponse::Ok().json(tags)),
        None => Err(ServerError::NotFound("Note")),
    }
}

fn link(path: (String, String)) -> Result<(i32, i32), ServerError> {
    let note_id = parse_id(&path.0, "note ID")?;
    let tag_id = parse_id(&path.1, "tag ID")?;
    Ok((note_id, tag_id))
}

pub async fn attach(
    path: web::Path<(String, String)>,
    store: Store,
) -> Result<HttpResponse, ServerError> {
    let (note_id, tag_id) = link(path.into_inner())?;
    run(&store, move |store| store.tag_note(note_id, tag_id)).await?;
    Ok(HttpResponse::NoContent().finish())
}

pub async fn detach(
    path: web::Path<(String, String)>,
    store: Store,
) -> Result<HttpResponse, ServerError> {
    let (note_id, tag_id) = link(path.into_inner())?;
    run(&store, move |store| store.untag_note(note_id, tag_id)).await?;
    Ok(HttpResponse::NoContent().finish())
}
