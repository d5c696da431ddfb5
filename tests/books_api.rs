//! HTTP-level tests for the books endpoints, driven through the full router
//! without a TCP listener.

mod common;

use axum::http::StatusCode;
use common::{body_json, delete, get, patch_json, post_json, test_app};
use serde_json::json;

fn gatsby() -> serde_json::Value {
    json!({
        "title": "The Great Gatsby",
        "author": "F. Scott Fitzgerald",
        "year": 1925,
        "price": 10.99,
        "in_stock": true
    })
}

#[tokio::test]
async fn test_root_reports_api_identity() {
    let app = test_app().await;
    let response = get(app.router(), "/").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["title"], "BookStore API");
    assert_eq!(json["version"], "1.0.0");
    assert_eq!(json["root_path"], "/");
}

#[tokio::test]
async fn test_healthz_pings_the_store() {
    let app = test_app().await;
    let response = get(app.router(), "/healthz").await;
    assert_eq!(response.status(), StatusCode::OK);

    app.db.close().await;
    let response = get(app.router(), "/healthz").await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_gatsby_lifecycle() {
    let app = test_app().await;

    let response = post_json(app.router(), "/api/v1/books", gatsby()).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["id"], 1);
    assert_eq!(created["in_stock"], true);
    assert_eq!(created["description"], serde_json::Value::Null);
    assert!(created["created_at"].is_string());
    assert_eq!(created["created_at"], created["updated_at"]);

    let response = patch_json(
        app.router(),
        "/api/v1/books/1",
        json!({ "price": 15.99, "in_stock": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["price"], 15.99);
    assert_eq!(updated["in_stock"], false);
    assert_eq!(updated["title"], "The Great Gatsby");
    assert_eq!(updated["created_at"], created["created_at"]);
    let created_at: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(updated["created_at"].clone()).unwrap();
    let updated_at: chrono::DateTime<chrono::Utc> =
        serde_json::from_value(updated["updated_at"].clone()).unwrap();
    assert!(updated_at > created_at);

    let response = delete(app.router(), "/api/v1/books/1").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app.router(), "/api/v1/books/1").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "not_found");
    assert_eq!(json["error"]["message"], "Book not found");
}

#[tokio::test]
async fn test_unknown_book_is_not_found_for_every_verb() {
    let app = test_app().await;

    let response = get(app.router(), "/api/v1/books/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = patch_json(app.router(), "/api/v1/books/999", json!({ "price": 1.0 })).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = delete(app.router(), "/api/v1/books/999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_pagination_over_fifteen_books() {
    let app = test_app().await;
    for n in 0..15 {
        let response = post_json(
            app.router(),
            "/api/v1/books",
            json!({ "title": format!("Volume {n}"), "author": "Anonymous", "year": 2000, "price": 1.5 }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let first = body_json(get(app.router(), "/api/v1/books?offset=0&limit=10").await).await;
    assert_eq!(first.as_array().unwrap().len(), 10);
    assert_eq!(first[0]["title"], "Volume 0");

    let rest = body_json(get(app.router(), "/api/v1/books?offset=10&limit=10").await).await;
    assert_eq!(rest.as_array().unwrap().len(), 5);
    assert_eq!(rest[4]["title"], "Volume 14");

    let default_page = body_json(get(app.router(), "/api/v1/books").await).await;
    assert_eq!(default_page.as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn test_out_of_range_limit_is_rejected() {
    let app = test_app().await;

    let response = get(app.router(), "/api/v1/books?limit=0").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
    assert_eq!(json["error"]["details"][0]["field"], "limit");

    let response = get(app.router(), "/api/v1/books?limit=101").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let response = get(app.router(), "/api/v1/books?offset=abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_with_missing_field_is_rejected() {
    let app = test_app().await;
    let response = post_json(
        app.router(),
        "/api/v1/books",
        json!({ "title": "No Author", "year": 2001, "price": 3.0 }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["error"]["code"], "validation_error");
}

#[tokio::test]
async fn test_patch_can_clear_description() {
    let app = test_app().await;
    let mut payload = gatsby();
    payload["description"] = json!("Jazz age novel");
    let created = body_json(post_json(app.router(), "/api/v1/books", payload).await).await;
    assert_eq!(created["description"], "Jazz age novel");

    let untouched = body_json(
        patch_json(app.router(), "/api/v1/books/1", json!({ "year": 1926 })).await,
    )
    .await;
    assert_eq!(untouched["description"], "Jazz age novel");
    assert_eq!(untouched["year"], 1926);

    let cleared = body_json(
        patch_json(app.router(), "/api/v1/books/1", json!({ "description": null })).await,
    )
    .await;
    assert_eq!(cleared["description"], serde_json::Value::Null);
    assert_eq!(cleared["year"], 1926);
}

#[tokio::test]
async fn test_invalid_id_is_bad_request() {
    let app = test_app().await;
    let response = get(app.router(), "/api/v1/books/not-a-number").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_openapi_document_lists_book_paths() {
    let app = test_app().await;
    let doc = body_json(get(app.router(), "/docs/openapi.json").await).await;
    assert!(doc["paths"]["/api/v1/books"]["post"].is_object());
    assert!(doc["paths"]["/api/v1/books/{id}"]["patch"].is_object());
    assert!(doc["components"]["schemas"]["BookRead"].is_object());
    assert!(doc["components"]["schemas"]["ErrorResponse"].is_object());
}

#[tokio::test]
async fn test_responses_carry_request_id() {
    let app = test_app().await;
    let response = get(app.router(), "/api/v1/books").await;
    assert!(response.headers().contains_key("x-request-id"));
}
