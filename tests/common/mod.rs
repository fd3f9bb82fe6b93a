#![allow(dead_code)]

use std::sync::Arc;

use actix_web::web;
use notabene::{
    models::note::{IncomingNote, IncomingNoteUpdate, Note},
    store::{MemoryStore, NoteStore},
};

pub type Store = web::Data<dyn NoteStore>;

/// Builds the full application over `$store` and initializes it as a test service.
macro_rules! app {
    ($store:expr) => {
        actix_web::test::init_service(
            actix_web::App::new()
                .app_data($store.clone())
                .configure(notabene::configure),
        )
        .await
    };
}

pub fn store() -> Store {
    let store: Arc<dyn NoteStore> = Arc::new(MemoryStore::new());
    web::Data::from(store)
}

pub fn seed_note(store: &Store, title: &str, content: &str) -> Note {
    let note = IncomingNote {
        title: Some(title.to_string()),
        content: Some(content.to_string()),
        author: Some("ada".to_string()),
    }
    .validate()
    .unwrap();
    store.create_note(note).unwrap()
}

pub fn edit_note(store: &Store, id: i32, title: Option<&str>, content: Option<&str>) -> Note {
    let update = IncomingNoteUpdate {
        title: title.map(str::to_string),
        content: content.map(str::to_string),
    }
    .validate()
    .unwrap();
    store.update_note(id, update).unwrap().unwrap()
}
