#[macro_use]
extern crate diesel;

use actix_web::web;

pub mod config;
pub mod diff;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod schema;
pub mod store;
mod utils;

use errors::ServerError;

/// Registers every route. Extractor failures are reported as `{ "error": .. }`
/// like any other validation problem.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _| {
        ServerError::Validation(err.to_string()).into()
    }))
    .app_data(web::QueryConfig::default().error_handler(|err, _| {
        ServerError::Validation(err.to_string()).into()
    }))
    .app_data(web::PathConfig::default().error_handler(|err, _| {
        ServerError::Validation(err.to_string()).into()
    }))
    .route("/", web::get().to(handlers::index))
    .service(
        web::scope("/notes")
            .route("", web::get().to(handlers::note::list))
            .route("", web::post().to(handlers::note::create))
            .route("/search", web::get().to(handlers::note::search))
            .route(
                "/search/advanced",
                web::get().to(handlers::note::advanced_search),
            )
            .route("/{id}", web::get().to(handlers::note::get))
            .route("/{id}", web::put().to(handlers::note::update))
            .route("/{id}", web::delete().to(handlers::note::delete))
            .route("/{id}/copy", web::post().to(handlers::note::copy))
            .route("/{id}/versions", web::get().to(handlers::version::history))
            .route(
                "/{id}/versions/compare",
                web::get().to(handlers::version::compare),
            )
            .route(
                "/{id}/versions/{version}",
                web::get().to(handlers::version::get),
            )
            .route(
                "/{id}/versions/{version}/restore",
                web::post().to(handlers::version::restore),
            )
            .route("/{id}/tags", web::get().to(handlers::tag::for_note))
            .route("/{id}/tags/{tag_id}", web::post().to(handlers::tag::attach))
            .route(
                "/{id}/tags/{tag_id}",
                web::delete().to(handlers::tag::detach),
            ),
    )
    .service(
        web::scope("/folders")
            .route("", web::get().to(handlers::folder::list))
            .route("", web::post().to(handlers::folder::create))
            .route("/{id}", web::get().to(handlers::folder::get))
            .route("/{id}", web::delete().to(handlers::folder::delete))
            .route("/{id}/search", web::get().to(handlers::folder::search))
            .route(
                "/{id}/notes/{note_id}",
                web::post().to(handlers::folder::add_note),
            )
            .route(
                "/{id}/notes/{note_id}",
                web::delete().to(handlers::folder::remove_note),
            ),
    )
    .service(
        web::scope("/tags")
            .route("", web::get().to(handlers::tag::list))
            .route("", web::post().to(handlers::tag::create)),
    );
}
