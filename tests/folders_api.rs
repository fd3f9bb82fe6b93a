#[macro_use]
mod common;

use actix_web::{http::StatusCode, test};
use serde_json::{json, Value};

#[actix_web::test]
async fn create_and_list_folders() {
    let store = common::store();
    let app = app!(store);

    for name in ["work", "archive"] {
        let req = test::TestRequest::post()
            .uri("/folders")
            .set_json(json!({ "name": name }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::post()
        .uri("/folders")
        .set_json(json!({ "name": "work" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Folder name already exists");

    let req = test::TestRequest::post()
        .uri("/folders")
        .set_json(json!({ "name": " " }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Name required");

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri("/folders").to_request())
            .await;
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["archive", "work"]);
}

#[actix_web::test]
async fn notes_move_in_and_out_of_folders() {
    let store = common::store();
    let note = common::seed_note(&store, "T", "C");
    let app = app!(store);

    let req = test::TestRequest::post()
        .uri("/folders")
        .set_json(json!({ "name": "work" }))
        .to_request();
    let folder: Value = test::call_and_read_body_json(&app, req).await;
    let folder_uri = format!("/folders/{}", folder["id"]);
    let member_uri = format!("{}/notes/{}", folder_uri, note.id);

    let resp = test::call_service(&app, test::TestRequest::post().uri(&member_uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test::call_service(&app, test::TestRequest::post().uri(&member_uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Note already in folder");

    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(&folder_uri).to_request())
            .await;
    assert_eq!(body["name"], "work");
    assert_eq!(body["notes"], json!([{ "id": note.id }]));

    let resp = test::call_service(&app, test::TestRequest::delete().uri(&member_uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = test::call_service(&app, test::TestRequest::delete().uri(&member_uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri(&format!("{}/notes/999", folder_uri))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Note not found");
}

#[actix_web::test]
async fn deleting_folders_and_notes_drops_memberships() {
    let store = common::store();
    let note = common::seed_note(&store, "T", "C");
    let app = app!(store);

    let req = test::TestRequest::post()
        .uri("/folders")
        .set_json(json!({ "name": "work" }))
        .to_request();
    let folder: Value = test::call_and_read_body_json(&app, req).await;
    let folder_uri = format!("/folders/{}", folder["id"]);
    let req = test::TestRequest::post()
        .uri(&format!("{}/notes/{}", folder_uri, note.id))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/notes/{}", note.id))
        .to_request();
    test::call_service(&app, req).await;
    let body: Value =
        test::call_and_read_body_json(&app, test::TestRequest::get().uri(&folder_uri).to_request())
            .await;
    assert_eq!(body["notes"], json!([]));

    let resp = test::call_service(&app, test::TestRequest::delete().uri(&folder_uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    let resp = test::call_service(&app, test::TestRequest::get().uri(&folder_uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Folder not found" }));

    let resp = test::call_service(&app, test::TestRequest::delete().uri(&folder_uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/folders/x").to_request()).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Invalid folder ID" }));
}

#[actix_web::test]
async fn search_is_scoped_to_the_folder() {
    let store = common::store();
    let inside = common::seed_note(&store, "Plan A", "draft");
    common::seed_note(&store, "Plan B", "draft");
    let app = app!(store);

    let req = test::TestRequest::post()
        .uri("/folders")
        .set_json(json!({ "name": "plans" }))
        .to_request();
    let folder: Value = test::call_and_read_body_json(&app, req).await;
    let req = test::TestRequest::post()
        .uri(&format!("/folders/{}/notes/{}", folder["id"], inside.id))
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get()
        .uri(&format!("/folders/{}/search?query=plan", folder["id"]))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|n| n["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![inside.id as i64]);

    let req = test::TestRequest::get()
        .uri(&format!("/notes/search/advanced?query=plan&folderId={}", folder["id"]))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/folders/999/search").to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "error": "Folder not found" }));
}
