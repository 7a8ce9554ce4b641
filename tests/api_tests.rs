// tests/api_tests.rs
mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::*;
use serde_json::{json, Value};

fn product(category_id: i64, brand_id: i64) -> Value {
    json!({
        "name": "Anvil",
        "description": "Drop-forged, cartoon grade",
        "price": 49.5,
        "cover_image": "https://x.test/anvil.png",
        "category_id": category_id,
        "brand_id": brand_id
    })
}

#[tokio::test]
async fn brand_then_product_with_unknown_category() {
    let app = test_app(&[]).await;

    let created = post(
        &app,
        "/api/v1/brands",
        &json!({ "name": "Acme", "cover_image": "https://x.test/a.png" }),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["status"], "success");
    assert_eq!(created.body["status_code"], 201);
    assert_eq!(created.body["message"], "Brand created successfully");
    assert_eq!(created.body["data"]["name"], "Acme");
    let brand_id = created.body["data"]["id"].as_i64().unwrap();
    assert!(brand_id > 0);

    let rejected = post(&app, "/api/v1/products", &product(9999, brand_id)).await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected.body["status"], "error");
    assert_eq!(rejected.body["message"], "Invalid CategoryID");
    assert!(rejected.body["data"].is_null());

    let listed = get(&app, "/api/v1/products").await;
    assert_eq!(listed.body["data"], json!([]));
}

#[tokio::test]
async fn unknown_brand_is_reported_after_a_valid_category() {
    let app = test_app(&[]).await;
    let (_, category_id) = seed_relations(&app).await;

    let rejected = post(&app, "/api/v1/products", &product(category_id, 4242)).await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected.body["message"], "Invalid BrandID");
}

#[tokio::test]
async fn created_product_reads_back_with_relations() {
    let app = test_app(&[]).await;
    let (brand_id, category_id) = seed_relations(&app).await;

    let created = post(&app, "/api/v1/products", &product(category_id, brand_id)).await;
    assert_eq!(created.status, StatusCode::CREATED);
    let id = created.body["data"]["id"].as_i64().unwrap();

    let fetched = get(&app, &format!("/api/v1/products/{id}")).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["message"], "Product fetched successfully");
    let data = &fetched.body["data"];
    assert_eq!(data["name"], "Anvil");
    assert_eq!(data["description"], "Drop-forged, cartoon grade");
    assert_eq!(data["price"], 49.5);
    assert_eq!(data["brand"]["id"], brand_id);
    assert_eq!(data["brand"]["name"], "Acme");
    assert_eq!(data["category"]["title"], "Anvils");
    assert!(data["created_at"].is_string());
}

async fn stored_product(app: &axum::Router) -> (i64, i64, i64) {
    let (brand_id, category_id) = seed_relations(app).await;
    let created = post(app, "/api/v1/products", &product(category_id, brand_id)).await;
    assert_eq!(created.status, StatusCode::CREATED);
    (created.body["data"]["id"].as_i64().unwrap(), brand_id, category_id)
}

async fn assert_product_unchanged(app: &axum::Router, id: i64, brand_id: i64, category_id: i64) {
    let current = get(app, &format!("/api/v1/products/{id}")).await;
    assert_eq!(current.status, StatusCode::OK);
    assert_eq!(current.body["data"]["name"], "Anvil");
    assert_eq!(current.body["data"]["brand_id"], brand_id);
    assert_eq!(current.body["data"]["category_id"], category_id);
}

#[tokio::test]
async fn updating_a_product_with_unknown_category_is_rejected() {
    let app = test_app(&[]).await;
    let (id, brand_id, category_id) = stored_product(&app).await;

    let mut payload = product(9999, brand_id);
    payload["name"] = json!("Renamed anvil");
    let rejected = put(&app, &format!("/api/v1/products/{id}"), &payload).await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected.body["message"], "Invalid CategoryID");
    assert!(rejected.body["data"].is_null());

    assert_product_unchanged(&app, id, brand_id, category_id).await;
}

#[tokio::test]
async fn updating_a_product_with_unknown_brand_is_rejected() {
    let app = test_app(&[]).await;
    let (id, brand_id, category_id) = stored_product(&app).await;

    let mut payload = product(category_id, 4242);
    payload["name"] = json!("Renamed anvil");
    let rejected = put(&app, &format!("/api/v1/products/{id}"), &payload).await;
    assert_eq!(rejected.status, StatusCode::BAD_REQUEST);
    assert_eq!(rejected.body["message"], "Invalid BrandID");

    assert_product_unchanged(&app, id, brand_id, category_id).await;
}

#[tokio::test]
async fn invalid_payloads_are_rejected_without_side_effects() {
    let app = test_app(&[]).await;
    let (brand_id, category_id) = seed_relations(&app).await;

    let mut zero_price = product(category_id, brand_id);
    zero_price["price"] = json!(0);
    let mut bad_url = product(category_id, brand_id);
    bad_url["cover_image"] = json!("anvil.png");
    let mut no_name = product(category_id, brand_id);
    no_name.as_object_mut().unwrap().remove("name");

    for payload in [zero_price, bad_url, no_name] {
        let response = post(&app, "/api/v1/products", &payload).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{payload}");
        assert!(!response.body["message"].as_str().unwrap().is_empty());
    }

    let listed = get(&app, "/api/v1/products").await;
    assert_eq!(listed.body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn malformed_json_gets_the_operation_specific_message() {
    let app = test_app(&[]).await;
    let (brand_id, _) = seed_relations(&app).await;

    let broken = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/brands")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = send(&app, broken).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Invalid request body");

    let broken = Request::builder()
        .method(Method::PUT)
        .uri(format!("/api/v1/brands/{brand_id}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("not json"))
        .unwrap();
    let response = send(&app, broken).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["message"], "Invalid input");
}

#[tokio::test]
async fn update_on_missing_id_is_not_found_regardless_of_payload() {
    let app = test_app(&[]).await;

    let valid = put(
        &app,
        "/api/v1/brands/9999",
        &json!({ "name": "Acme", "cover_image": "https://x.test/a.png" }),
    )
    .await;
    assert_eq!(valid.status, StatusCode::NOT_FOUND);
    assert_eq!(valid.body["message"], "Brand not found");

    let invalid = put(&app, "/api/v1/categories/9999", &json!({ "title": "" })).await;
    assert_eq!(invalid.status, StatusCode::NOT_FOUND);
    assert_eq!(invalid.body["message"], "Category not found");
}

#[tokio::test]
async fn update_replaces_fields_and_keeps_created_at() {
    let app = test_app(&[]).await;
    let (brand_id, _) = seed_relations(&app).await;
    let before = get(&app, &format!("/api/v1/brands/{brand_id}")).await;

    let updated = put(
        &app,
        &format!("/api/v1/brands/{brand_id}"),
        &json!({ "name": "Acme Corp", "cover_image": "https://x.test/b.png" }),
    )
    .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["message"], "Brand updated successfully");
    assert_eq!(updated.body["data"]["name"], "Acme Corp");
    assert_eq!(updated.body["data"]["id"], brand_id);
    assert_eq!(updated.body["data"]["created_at"], before.body["data"]["created_at"]);
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = test_app(&[]).await;
    let created = post(
        &app,
        "/api/v1/categories",
        &json!({ "title": "Rockets", "cover_image": "https://x.test/r.png" }),
    )
    .await;
    let id = created.body["data"]["id"].as_i64().unwrap();

    let deleted = delete(&app, &format!("/api/v1/categories/{id}")).await;
    assert_eq!(deleted.status, StatusCode::NO_CONTENT);
    assert!(deleted.body.is_null());

    let fetched = get(&app, &format!("/api/v1/categories/{id}")).await;
    assert_eq!(fetched.status, StatusCode::NOT_FOUND);
    assert_eq!(fetched.body["message"], "Category not found");

    let again = delete(&app, &format!("/api/v1/categories/{id}")).await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn deleting_a_referenced_brand_is_refused() {
    let app = test_app(&[]).await;
    let (brand_id, category_id) = seed_relations(&app).await;
    let created = post(&app, "/api/v1/products", &product(category_id, brand_id)).await;
    assert_eq!(created.status, StatusCode::CREATED);

    let refused = delete(&app, &format!("/api/v1/brands/{brand_id}")).await;
    assert_eq!(refused.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(refused.body["message"], "Failed to delete brand");

    let still_there = get(&app, &format!("/api/v1/brands/{brand_id}")).await;
    assert_eq!(still_there.status, StatusCode::OK);
}

#[tokio::test]
async fn non_numeric_ids_are_not_found() {
    let app = test_app(&[]).await;
    let response = get(&app, "/api/v1/products/abc").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["message"], "Product not found");
}

#[tokio::test]
async fn products_are_paginated_by_id() {
    let app = test_app(&[]).await;
    let (brand_id, category_id) = seed_relations(&app).await;

    let mut ids = Vec::new();
    for i in 0..12 {
        let mut payload = product(category_id, brand_id);
        payload["name"] = json!(format!("Anvil {i}"));
        let created = post(&app, "/api/v1/products", &payload).await;
        ids.push(created.body["data"]["id"].as_i64().unwrap());
    }

    let page = get(&app, "/api/v1/products?page=2&limit=5").await;
    assert_eq!(page.status, StatusCode::OK);
    assert_eq!(page.body["message"], "Products fetched successfully");
    let got: Vec<i64> = page.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(got, ids[5..10].to_vec());

    let defaults = get(&app, "/api/v1/products?page=zero&limit=-3").await;
    assert_eq!(defaults.body["data"].as_array().unwrap().len(), 10);

    let tail = get(&app, "/api/v1/products?page=3&limit=5").await;
    assert_eq!(tail.body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn collections_accept_a_trailing_slash() {
    let app = test_app(&[]).await;
    let (brand_id, category_id) = seed_relations(&app).await;

    let created = post(&app, "/api/v1/products/", &product(category_id, brand_id)).await;
    assert_eq!(created.status, StatusCode::CREATED);

    let listed = get(&app, "/api/v1/products/").await;
    assert_eq!(listed.status, StatusCode::OK);
    assert_eq!(listed.body["message"], "Products fetched successfully");
    assert_eq!(listed.body["data"].as_array().unwrap().len(), 1);

    let brands = get(&app, "/api/v1/brands/").await;
    assert_eq!(brands.body["data"][0]["id"], brand_id);
}

#[tokio::test]
async fn brands_are_not_paginated() {
    let app = test_app(&[]).await;
    for i in 0..12 {
        post(
            &app,
            "/api/v1/brands",
            &json!({ "name": format!("Brand {i}"), "cover_image": "https://x.test/a.png" }),
        )
        .await;
    }

    let listed = get(&app, "/api/v1/brands?limit=2").await;
    assert_eq!(listed.body["message"], "Brands retrieved successfully");
    assert_eq!(listed.body["data"].as_array().unwrap().len(), 12);
}

#[tokio::test]
async fn health_reports_runtime_and_database() {
    let app = test_app(&[]).await;
    let response = get(&app, "/health").await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert_eq!(data["status"], "ok");
    assert_eq!(data["database"], "up");
    assert_eq!(data["driver"], "sqlite");
    assert_eq!(data["version"], env!("CARGO_PKG_VERSION"));
    assert!(data["cpu_cores"].as_u64().unwrap() >= 1);
    assert!(data["uptime"].is_string());
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = test_app(&[]).await;
    let response = get(&app, "/swagger/openapi.json").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["openapi"].as_str().unwrap().starts_with("3."));
    assert!(response.body["paths"]["/api/v1/products/{id}"]["put"].is_object());
    assert!(response.body["components"]["schemas"]["Brand"].is_object());
}

#[tokio::test]
async fn interactive_docs_are_served() {
    let app = test_app(&[]).await;
    let (status, headers, html) = get_text(&app, "/swagger").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::CONTENT_TYPE].to_str().unwrap().starts_with("text/html"));
    assert!(html.contains("Catalog API"), "docs page embeds the document");
}

#[tokio::test]
async fn unknown_routes_get_the_not_found_envelope() {
    let app = test_app(&[]).await;
    let response = get(&app, "/api/v2/whatever").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(
        response.body,
        json!({
            "status": "error",
            "status_code": 404,
            "data": null,
            "message": "Route not found"
        })
    );
}
