//! Provider clients against local stub HTTP servers

mod helpers;

use axum::{extract::Query, http::StatusCode, routing::get, Json, Router};
use helpers::*;
use libris_meta::config::PipelineConfig;
use libris_meta::cover_search::CoverSearch;
use libris_meta::orchestrator::compose;
use libris_meta::providers::{GoogleBooksClient, OpenLibraryClient};
use libris_meta::types::{BookProvider, ProviderError};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;

async fn open_library(reply: Value) -> OpenLibraryClient {
    let app = Router::new().route(
        "/api/books",
        get(move |Query(params): Query<HashMap<String, String>>| {
            let reply = reply.clone();
            async move {
                assert_eq!(params.get("format").map(String::as_str), Some("json"));
                assert_eq!(params.get("jscmd").map(String::as_str), Some("data"));
                Json(reply)
            }
        }),
    );
    let base = spawn_stub_server(app).await;
    let config = test_config().with_base_urls(format!("{}/api/books", base), base);
    OpenLibraryClient::new(&config).unwrap()
}

async fn google_books(app: Router) -> GoogleBooksClient {
    let base = spawn_stub_server(app).await;
    let config = test_config().with_base_urls(base.clone(), format!("{}/books/v1/volumes", base));
    GoogleBooksClient::new(&config).unwrap()
}

#[tokio::test]
async fn test_open_library_record_is_translated() {
    let client = open_library(json!({
        "ISBN:9780007119356": {
            "title": "Murder on the Orient Express",
            "authors": [{"name": "Christie, Agatha", "url": "https://openlibrary.org/a/1"}],
            "cover": {
                "small": "https://covers/s.jpg",
                "medium": "https://covers/m.jpg",
                "large": "https://covers/l.jpg"
            },
            "subjects": [{"name": "Detective and mystery stories"}, {"name": "Fiction"}]
        }
    }))
    .await;

    let metadata = client.lookup("9780007119356").await.unwrap();
    assert_eq!(metadata.title.as_deref(), Some("Murder on the Orient Express"));
    assert_eq!(metadata.cover_url.as_deref(), Some("https://covers/m.jpg"));

    let book = compose(&metadata);
    assert_eq!(book.author, "Agatha Christie");
    assert_eq!(book.cover_url.as_deref(), Some("https://covers/m.jpg"));
    assert_eq!(book.genre.as_deref(), Some("Crime"));
}

#[tokio::test]
async fn test_open_library_description_object_reaches_classifier() {
    let client = open_library(json!({
        "ISBN:1": {
            "title": "Untitled",
            "description": {"type": "/type/text", "value": "A philosophical treatise"}
        }
    }))
    .await;

    let metadata = client.lookup("1").await.unwrap();
    assert_eq!(metadata.description.as_deref(), Some("A philosophical treatise"));
    assert_eq!(compose(&metadata).genre.as_deref(), Some("Philosophy"));
}

#[tokio::test]
async fn test_open_library_odd_description_still_resolves() {
    let client = open_library(json!({
        "ISBN:9780441172719": {
            "title": "Dune",
            "authors": [{"name": "Herbert, Frank"}, 17],
            "subjects": [{"name": "Science fiction"}],
            "description": 42
        }
    }))
    .await;

    let metadata = client.lookup("9780441172719").await.unwrap();
    assert!(metadata.description.is_none());

    let book = compose(&metadata);
    assert_eq!(book.title, "Dune");
    assert_eq!(book.author, "Frank Herbert");
    assert_eq!(book.genre.as_deref(), Some("Science Fiction"));
}

#[tokio::test]
async fn test_open_library_empty_reply_is_not_found() {
    let client = open_library(json!({})).await;
    let err = client.lookup("0000000000").await.unwrap_err();
    assert!(err.is_not_found());
    assert!(client.lookup_optional("0000000000").await.is_none());
}

#[tokio::test]
async fn test_open_library_record_without_fields_is_not_found() {
    let client = open_library(json!({"ISBN:1": {"url": "https://openlibrary.org/b/1"}})).await;
    assert!(client.lookup("1").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_malformed_payload_is_parse_error() {
    let client = open_library(json!(["not", "an", "object"])).await;
    let err = client.lookup("1").await.unwrap_err();
    assert!(matches!(err, ProviderError::Parse(_)));
    assert!(client.lookup_optional("1").await.is_none());
}

#[tokio::test]
async fn test_server_error_is_api_error() {
    let client = google_books(Router::new().route(
        "/books/v1/volumes",
        get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
    ))
    .await;

    let err = client.lookup("1").await.unwrap_err();
    assert!(matches!(err, ProviderError::Api(503, _)));
}

#[tokio::test]
async fn test_slow_provider_times_out() {
    let app = Router::new().route(
        "/books/v1/volumes",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({"items": []}))
        }),
    );
    let base = spawn_stub_server(app).await;
    let config = PipelineConfig {
        request_timeout: Duration::from_millis(200),
        ..test_config()
    }
    .with_base_urls(base.clone(), format!("{}/books/v1/volumes", base));
    let client = GoogleBooksClient::new(&config).unwrap();

    let err = client.lookup("1").await.unwrap_err();
    assert!(matches!(err, ProviderError::Timeout));
}

#[tokio::test]
async fn test_unreachable_provider_is_network_error() {
    let config = test_config().with_base_urls(
        "http://127.0.0.1:9/api/books",
        "http://127.0.0.1:9/books/v1/volumes",
    );
    let client = OpenLibraryClient::new(&config).unwrap();

    let err = client.lookup("1").await.unwrap_err();
    assert!(!err.is_not_found());
}

#[tokio::test]
async fn test_google_books_isbn_lookup() {
    let client = google_books(Router::new().route(
        "/books/v1/volumes",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            assert_eq!(params.get("q").map(String::as_str), Some("isbn:9780441172719"));
            Json(json!({
                "totalItems": 1,
                "items": [{"volumeInfo": {
                    "title": "Dune",
                    "authors": ["Frank Herbert"],
                    "categories": ["Fiction"],
                    "description": "Desert planet politics and space travel",
                    "imageLinks": {"smallThumbnail": "st.jpg", "thumbnail": "t.jpg"}
                }}]
            }))
        }),
    ))
    .await;

    let metadata = client.lookup("9780441172719").await.unwrap();
    assert_eq!(metadata.authors, vec!["Frank Herbert"]);
    assert_eq!(metadata.subjects, vec!["Fiction"]);

    let book = compose(&metadata);
    assert_eq!(book.cover_url.as_deref(), Some("t.jpg"));
    assert_eq!(book.genre.as_deref(), Some("Science Fiction"));
}

#[tokio::test]
async fn test_google_books_null_categories_still_resolves() {
    let client = google_books(Router::new().route(
        "/books/v1/volumes",
        get(|| async {
            Json(json!({"items": [{"volumeInfo": {
                "title": "Dune",
                "authors": ["Frank Herbert"],
                "categories": null,
                "imageLinks": {"thumbnail": 5, "smallThumbnail": "st.jpg"}
            }}]}))
        }),
    ))
    .await;

    let metadata = client.lookup("9780441172719").await.unwrap();
    assert_eq!(metadata.title.as_deref(), Some("Dune"));
    assert_eq!(metadata.authors, vec!["Frank Herbert"]);
    assert!(metadata.subjects.is_empty());
    assert_eq!(metadata.cover_url.as_deref(), Some("st.jpg"));
}

#[tokio::test]
async fn test_google_books_no_items_is_not_found() {
    let client = google_books(Router::new().route(
        "/books/v1/volumes",
        get(|| async { Json(json!({"kind": "books#volumes", "totalItems": 0})) }),
    ))
    .await;

    assert!(client.lookup("0000000000").await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_cover_search_returns_first_image() {
    let client = google_books(Router::new().route(
        "/books/v1/volumes",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            assert_eq!(
                params.get("q").map(String::as_str),
                Some("intitle:Dune inauthor:Frank Herbert")
            );
            assert_eq!(params.get("maxResults").map(String::as_str), Some("5"));
            Json(json!({"items": [
                {"volumeInfo": {"title": "Dune"}},
                {"volumeInfo": {"title": "Dune", "imageLinks": {"smallThumbnail": "second.jpg"}}},
                {"volumeInfo": {"title": "Dune", "imageLinks": {"thumbnail": "third.jpg"}}}
            ]}))
        }),
    ))
    .await;

    let cover = client.find_cover("Dune", Some("Frank Herbert")).await;
    assert_eq!(cover.as_deref(), Some("second.jpg"));
}

#[tokio::test]
async fn test_cover_search_failure_is_absent() {
    let client = google_books(Router::new().route(
        "/books/v1/volumes",
        get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
    ))
    .await;

    assert!(client.find_cover("Dune", None).await.is_none());
}
