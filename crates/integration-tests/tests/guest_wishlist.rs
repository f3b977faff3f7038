//! Guest wishlist through the storefront app.
//!
//! Guests keep their wishlist in the session record, so these run without a
//! database.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::{Value, json};

use optica_integration_tests::{TestClient, json_body};

fn frame(id: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Frame {id}"),
        "href": format!("/products/{id}"),
        "price": "$129.00",
        "imageSrc": format!("https://cdn.shopify.com/{id}.jpg"),
        "imageAlt": "Frame",
    })
}

fn ids(body: &Value) -> Vec<String> {
    body["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_new_visitor_has_empty_wishlist() {
    let mut client = TestClient::new();
    let body = json_body(client.get("/wishlist").await).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_add_remove_round_trip() {
    let mut client = TestClient::new();

    let added = json_body(client.post_json("/wishlist/add", &frame("aviator")).await).await;
    assert_eq!(added, json!({"changed": true, "count": 1}));

    let again = json_body(client.post_json("/wishlist/add", &frame("aviator")).await).await;
    assert_eq!(again, json!({"changed": false, "count": 1}));

    client.post_json("/wishlist/add", &frame("round")).await;
    let body = json_body(client.get("/wishlist").await).await;
    assert_eq!(ids(&body), vec!["aviator", "round"]);

    let present = json_body(client.get("/wishlist/contains/round").await).await;
    assert_eq!(present["present"], true);

    let removed =
        json_body(client.post_json("/wishlist/remove", &json!({"id": "aviator"})).await).await;
    assert_eq!(removed, json!({"changed": true, "count": 1}));

    let missing =
        json_body(client.post_json("/wishlist/remove", &json!({"id": "aviator"})).await).await;
    assert_eq!(missing["changed"], false);
}

#[tokio::test]
async fn test_wishlist_is_per_session() {
    let mut first = TestClient::new();
    first.post_json("/wishlist/add", &frame("aviator")).await;

    let mut second = TestClient::new();
    let body = json_body(second.get("/wishlist").await).await;
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn test_api_replace() {
    let mut client = TestClient::new();
    client.post_json("/wishlist/add", &frame("aviator")).await;

    let request = axum::http::Request::put("/api/wishlist")
        .header("content-type", "application/json")
        .body(axum::body::Body::from(
            json!({"items": [frame("cat-eye"), frame("round")]}).to_string(),
        ))
        .unwrap();
    let response = client.send(request).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = json_body(client.get("/api/wishlist").await).await;
    assert_eq!(body["authenticated"], false);
    assert_eq!(ids(&body), vec!["cat-eye", "round"]);
}

#[tokio::test]
async fn test_contains_rejects_blank_id() {
    let mut client = TestClient::new();
    let response = client.get("/wishlist/contains/%20").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
