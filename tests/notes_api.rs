#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use notabene::store::NoteStore;
use serde_json::{json, Value};

#[actix_web::test]
async fn health_check_answers_ok() {
    let store = common::store();
    let app = app!(store);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn create_returns_the_stored_note() {
    let store = common::store();
    let app = app!(store);

    let req = test::TestRequest::post()
        .uri("/notes")
        .set_json(json!({ "title": "T", "content": "C", "author": "a" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert!(body["id"].as_i64().is_some());
    assert_eq!(body["title"], "T");
    assert_eq!(body["content"], "C");
    assert_eq!(body["author"], "a");
    assert_eq!(body["createdAt"], body["updatedAt"]);
}

#[actix_web::test]
async fn create_rejects_invalid_input_without_storing() {
    let store = common::store();
    let app = app!(store);

    let req = test::TestRequest::post()
        .uri("/notes")
        .set_json(json!({ "title": "   ", "content": "x".repeat(281), "author": "a" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"],
        "Title is required, Content cannot exceed 280 characters"
    );

    assert!(store.all_notes().unwrap().is_empty());
}

#[actix_web::test]
async fn malformed_json_is_reported_as_error_body() {
    let store = common::store();
    let app = app!(store);

    let req = test::TestRequest::post()
        .uri("/notes")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert!(body["error"].is_string());
}

#[actix_web::test]
async fn list_is_newest_first() {
    let store = common::store();
    let first = common::seed_note(&store, "first", "one");
    let second = common::seed_note(&store, "second", "two");
    let app = app!(store);

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/notes").to_request())
            .await;
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![second.id as i64, first.id as i64]);
}

#[actix_web::test]
async fn get_handles_missing_and_malformed_ids() {
    let store = common::store();
    let note = common::seed_note(&store, "hello", "world");
    let app = app!(store);

    let req = test::TestRequest::get()
        .uri(&format!("/notes/{}", note.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["title"], "hello");

    let resp = test::call_service(&app, test::TestRequest::get().uri("/notes/999").to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Note not found" }));

    let resp = test::call_service(&app, test::TestRequest::get().uri("/notes/abc").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Invalid note ID" }));
}

#[actix_web::test]
async fn update_changes_only_supplied_fields() {
    let store = common::store();
    let note = common::seed_note(&store, "hello", "world");
    let app = app!(store);

    let req = test::TestRequest::put()
        .uri(&format!("/notes/{}", note.id))
        .set_json(json!({ "content": "there" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["title"], "hello");
    assert_eq!(body["content"], "there");
    assert_eq!(body["author"], "ada");

    let req = test::TestRequest::put()
        .uri(&format!("/notes/{}", note.id))
        .set_json(json!({ "title": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Title cannot be empty");

    let req = test::TestRequest::put()
        .uri("/notes/999")
        .set_json(json!({ "title": "x" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn delete_removes_once() {
    let store = common::store();
    let note = common::seed_note(&store, "hello", "world");
    let app = app!(store);

    let uri = format!("/notes/{}", note.id);
    let resp = test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "message": "Note deleted successfully" }));

    let resp = test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Note not found" }));
}

#[actix_web::test]
async fn search_matches_title_or_content() {
    let store = common::store();
    common::seed_note(&store, "Groceries", "milk and eggs");
    common::seed_note(&store, "Ideas", "buy more MILK");
    common::seed_note(&store, "Unrelated", "nothing here");
    common::seed_note(&store, "Discount", "100% off");
    let app = app!(store);

    let req = test::TestRequest::get().uri("/notes/search?q=milk").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Ideas", "Groceries"]);

    let req = test::TestRequest::get()
        .uri("/notes/search?q=milk&limit=1&offset=1")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Groceries");

    let req = test::TestRequest::get().uri("/notes/search?q=%25").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["title"], "Discount");

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/notes/search?q=").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Search query is required");
}

#[actix_web::test]
async fn advanced_search_combines_filters() {
    let store = common::store();
    let rust = common::seed_note(&store, "Rust tips", "ownership");
    let go = common::seed_note(&store, "Go tips", "channels");
    common::seed_note(&store, "Recipes", "pasta");
    let app = app!(store);

    let req = test::TestRequest::post()
        .uri("/tags")
        .set_json(json!({ "name": "Programming" }))
        .to_request();
    let tag: Value = test::call_and_read_body_json(&app, req).await;
    for id in [rust.id, go.id] {
        let req = test::TestRequest::post()
            .uri(&format!("/notes/{}/tags/{}", id, tag["id"]))
            .to_request();
        test::call_service(&app, req).await;
    }

    let req = test::TestRequest::get()
        .uri("/notes/search/advanced?tags=programming,tutorial&query=TIPS&author=ADA")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let titles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Go tips", "Rust tips"]);

    let req = test::TestRequest::get()
        .uri("/notes/search/advanced?createdAfter=2000-01-01&createdBefore=2000-01-02%2010:00:00")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!([]));

    let req = test::TestRequest::get().uri("/notes/search/advanced").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[actix_web::test]
async fn advanced_search_reports_bad_values() {
    let store = common::store();
    let app = app!(store);

    let req = test::TestRequest::get()
        .uri("/notes/search/advanced?updatedBefore=soon&folderId=abc")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Invalid updatedBefore, Invalid folder ID");
}

#[actix_web::test]
async fn copy_creates_a_fresh_note() {
    let store = common::store();
    let note = common::seed_note(&store, "hello", "abc");
    common::edit_note(&store, note.id, None, Some("abd"));
    let app = app!(store);

    let req = test::TestRequest::post()
        .uri(&format!("/notes/{}/copy", note.id))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let copy: Value = test::read_body_json(resp).await;
    assert_ne!(copy["id"], json!(note.id));
    assert_eq!(copy["title"], "hello");
    assert_eq!(copy["content"], "abd");
    assert_eq!(copy["createdAt"], copy["updatedAt"]);

    let req = test::TestRequest::get()
        .uri(&format!("/notes/{}/versions", copy["id"]))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let resp = test::call_service(
        &app,
        test::TestRequest::post().uri("/notes/999/copy").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Note not found" }));
}
