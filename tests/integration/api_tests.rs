//! API integration tests
//!
//! Each test starts the router on an ephemeral port and drives it with reqwest.

use std::collections::HashSet;

use bookshelf_server::{
    api,
    config::{AppConfig, StoreMode},
    AppState,
};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

async fn start_server(mode: StoreMode) -> String {
    let mut config = AppConfig::default();
    config.store.mode = mode;

    let app = api::create_router(AppState::new(config));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/books")
}

fn new_book() -> Value {
    json!({
        "id": "999999",
        "isbn": "0441013597",
        "title": "Dune",
        "author": {"firstname": "Frank", "lastname": "Herbert"}
    })
}

async fn list(client: &Client, base: &str) -> Vec<Value> {
    let resp = client.get(base).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    resp.json().await.unwrap()
}

fn ids(books: &[Value]) -> Vec<&str> {
    books.iter().map(|b| b["id"].as_str().unwrap()).collect()
}

#[tokio::test]
async fn test_health_check() {
    let base = start_server(StoreMode::Strict).await;
    let url = base.replace("/api/books", "/health");

    let resp = Client::new().get(url).send().await.unwrap();
    assert!(resp.status().is_success());

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["books"], 2);
}

#[tokio::test]
async fn test_list_seeded_books() {
    let base = start_server(StoreMode::Strict).await;
    let client = Client::new();

    let resp = client.get(&base).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["content-type"], "application/json");

    let books: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(
        books,
        vec![
            json!({"id": "1", "isbn": "32442", "title": "Be good",
                   "author": {"firstname": "John", "lastname": "Doe"}}),
            json!({"id": "2", "isbn": "12442", "title": "Be bad",
                   "author": {"firstname": "Eric", "lastname": "Cartman"}}),
        ]
    );
}

#[tokio::test]
async fn test_get_book() {
    let base = start_server(StoreMode::Strict).await;
    let client = Client::new();

    let resp = client.get(format!("{base}/2")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["id"], "2");
    assert_eq!(body["title"], "Be bad");
}

#[tokio::test]
async fn test_get_missing_book_strict() {
    let base = start_server(StoreMode::Strict).await;

    let resp = Client::new().get(format!("{base}/42")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "NoSuchBook");
}

#[tokio::test]
async fn test_get_missing_book_legacy() {
    let base = start_server(StoreMode::Legacy).await;

    let resp = Client::new().get(format!("{base}/42")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, json!({"id": "", "isbn": "", "title": "", "author": null}));
}

#[tokio::test]
async fn test_create_book() {
    let base = start_server(StoreMode::Strict).await;
    let client = Client::new();

    let resp = client.post(&base).json(&new_book()).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let created: Value = resp.json().await.unwrap();
    let id: u32 = created["id"].as_str().unwrap().parse().unwrap();
    assert!(id < 100_000);
    assert_eq!(created["title"], "Dune");

    let books = list(&client, &base).await;
    assert_eq!(books.len(), 3);
    assert_eq!(books[2], created);
}

#[tokio::test]
async fn test_create_book_legacy_status() {
    let base = start_server(StoreMode::Legacy).await;

    let resp = Client::new().post(&base).json(&new_book()).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_replace_book() {
    let base = start_server(StoreMode::Strict).await;
    let client = Client::new();

    let resp = client.put(format!("{base}/1")).json(&new_book()).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let replaced: Value = resp.json().await.unwrap();
    assert_eq!(replaced["id"], "1");
    assert_eq!(replaced["title"], "Dune");

    let books = list(&client, &base).await;
    assert_eq!(ids(&books), ["2", "1"]);
    assert_eq!(books[1], replaced);
}

#[tokio::test]
async fn test_replace_missing_book() {
    let base = start_server(StoreMode::Strict).await;
    let client = Client::new();

    let resp = client.put(format!("{base}/42")).json(&new_book()).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(ids(&list(&client, &base).await), ["1", "2"]);
}

#[tokio::test]
async fn test_replace_missing_book_legacy_returns_list() {
    let base = start_server(StoreMode::Legacy).await;
    let client = Client::new();

    let resp = client.put(format!("{base}/42")).json(&new_book()).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(body, list(&client, &base).await);
    assert_eq!(ids(&body), ["1", "2"]);
}

#[tokio::test]
async fn test_delete_book() {
    let base = start_server(StoreMode::Strict).await;
    let client = Client::new();

    let resp = client.delete(format!("{base}/2")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let remaining: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(ids(&remaining), ["1"]);

    let resp = client.delete(format!("{base}/2")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_book_legacy_only_checks_first() {
    let base = start_server(StoreMode::Legacy).await;
    let client = Client::new();

    let resp = client.delete(format!("{base}/2")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let remaining: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(ids(&remaining), ["1", "2"]);

    let resp = client.delete(format!("{base}/1")).send().await.unwrap();
    let remaining: Vec<Value> = resp.json().await.unwrap();
    assert_eq!(ids(&remaining), ["2"]);
}

#[tokio::test]
async fn test_malformed_body_strict() {
    let base = start_server(StoreMode::Strict).await;
    let client = Client::new();

    let resp = client
        .post(&base)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "BadValue");

    assert_eq!(list(&client, &base).await.len(), 2);
}

#[tokio::test]
async fn test_malformed_body_legacy() {
    let base = start_server(StoreMode::Legacy).await;
    let client = Client::new();

    let resp = client.post(&base).body("{not json").send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["title"], "");
    assert_eq!(created["author"], Value::Null);

    assert_eq!(list(&client, &base).await.len(), 3);
}

#[tokio::test]
async fn test_legacy_body_decoding_is_forgiving() {
    let base = start_server(StoreMode::Legacy).await;
    let client = Client::new();

    let resp = client
        .post(&base)
        .body(r#"{"TITLE":"Dune","isbn":5,"Author":{"LastName":"Herbert"}}"#)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["title"], "Dune");
    assert_eq!(created["isbn"], "");
    assert_eq!(created["author"], json!({"firstname": "", "lastname": "Herbert"}));

    let resp = client
        .put(format!("{base}/1"))
        .body(r#"{"Title":"Be better","ISBN":"1"}"#)
        .send()
        .await
        .unwrap();
    let replaced: Value = resp.json().await.unwrap();
    assert_eq!(replaced["id"], "1");
    assert_eq!(replaced["title"], "Be better");
    assert_eq!(replaced["isbn"], "1");
}

#[tokio::test]
async fn test_strict_body_decoding_is_exact() {
    let base = start_server(StoreMode::Strict).await;
    let client = Client::new();

    let resp = client
        .post(&base)
        .json(&json!({"title": "Dune", "isbn": 5}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_concurrent_creates() {
    let base = start_server(StoreMode::Strict).await;
    let client = Client::new();

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let client = client.clone();
            let base = base.clone();
            tokio::spawn(async move {
                let resp = client.post(&base).json(&new_book()).send().await.unwrap();
                assert_eq!(resp.status(), StatusCode::CREATED);
                let created: Value = resp.json().await.unwrap();
                created["id"].as_str().unwrap().to_string()
            })
        })
        .collect();

    let mut created = HashSet::new();
    for handle in handles {
        created.insert(handle.await.unwrap());
    }
    assert_eq!(created.len(), 32);

    let books = list(&client, &base).await;
    assert_eq!(books.len(), 2 + 32);
}
