use actix_web::{web, HttpResponse, Responder};

use crate::{errors::ServerError, store::NoteStore};

pub mod folder;
pub mod note;
pub mod tag;
pub mod version;

pub type Store = web::Data<dyn NoteStore>;

pub async fn index() -> impl Responder {
    HttpResponse::Ok().finish()
}

/// Runs a store call on the blocking thread pool.
pub(crate) async fn run<F, T>(store: &Store, f: F) -> Result<T, ServerError>
where
    F: FnOnce(&dyn NoteStore) -> Result<T, ServerError> + Send + 'static,
    T: Send + 'static,
{
    let store = store.clone().into_inner();
    web::block(move || f(store.as_ref())).await?
}
