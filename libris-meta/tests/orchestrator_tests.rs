//! Resolution orchestrator tests against in-process stub providers

mod helpers;

use helpers::*;
use libris_common::db::CacheRecord;
use libris_meta::config::PipelineConfig;
use libris_meta::types::{BookMetadata, ResolutionSource, ResolvedBook};
use libris_meta::Orchestrator;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

fn cached_store(isbn: &str, record: CacheRecord) -> Arc<MapStore> {
    let mut map = HashMap::new();
    map.insert(isbn.to_string(), record);
    Arc::new(MapStore(map))
}

#[tokio::test]
async fn test_cache_hit_makes_no_provider_call() {
    let primary = StubProvider::new("primary", StubReply::Failing);
    let secondary = StubProvider::new("secondary", StubReply::Failing);
    let store = cached_store(
        "9780007119356",
        CacheRecord {
            title: Some("Murder on the Orient Express".to_string()),
            author: Some("Agatha Christie".to_string()),
            cover_url: None,
            genre: Some("Crime".to_string()),
        },
    );

    let orchestrator = orchestrator(
        store,
        chain(&[primary.clone(), secondary.clone()]),
        StubCovers::new(None),
    );
    let resolution = orchestrator.resolve("9780007119356").await;

    assert_eq!(resolution.source, ResolutionSource::Cache);
    assert_eq!(resolution.book.title, "Murder on the Orient Express");
    assert_eq!(resolution.book.author, "Agatha Christie");
    assert!(resolution.book.cover_url.is_none());
    assert_eq!(resolution.book.genre.as_deref(), Some("Crime"));
    assert_eq!(primary.calls(), 0);
    assert_eq!(secondary.calls(), 0);
}

#[tokio::test]
async fn test_cache_hit_substitutes_sentinels_for_missing_names() {
    let store = cached_store(
        "123",
        CacheRecord {
            title: None,
            author: None,
            cover_url: Some("c.jpg".to_string()),
            genre: None,
        },
    );

    let orchestrator = orchestrator(store, Vec::new(), StubCovers::new(None));
    let book = orchestrator.resolve("123").await.book;

    assert_eq!(book.title, "Unknown title");
    assert_eq!(book.author, "Unknown author");
    assert_eq!(book.cover_url.as_deref(), Some("c.jpg"));
    assert!(book.genre.is_none());
}

#[tokio::test]
async fn test_both_providers_absent_yields_unknown_book() {
    let primary = StubProvider::new("primary", StubReply::Missing);
    let secondary = StubProvider::new("secondary", StubReply::Failing);

    let orchestrator = orchestrator(
        Arc::new(MapStore::default()),
        chain(&[primary.clone(), secondary.clone()]),
        StubCovers::new(Some("ignored.jpg")),
    );
    let resolution = orchestrator.resolve("0000000000").await;

    assert_eq!(resolution.book, ResolvedBook::unknown());
    assert_eq!(resolution.source, ResolutionSource::Unresolved);
    assert!(resolution.store_error.is_none());
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn test_primary_result_stops_the_chain() {
    let primary = StubProvider::new(
        "primary",
        StubReply::Found(metadata("Dune", &["Herbert, Frank"])),
    );
    let secondary = StubProvider::new("secondary", StubReply::Found(metadata("Other", &[])));

    let orchestrator = orchestrator(
        Arc::new(MapStore::default()),
        chain(&[primary.clone(), secondary.clone()]),
        StubCovers::new(None),
    );
    let resolution = orchestrator.resolve("9780441172719").await;

    assert_eq!(resolution.source, ResolutionSource::Provider("primary"));
    assert_eq!(resolution.book.title, "Dune");
    assert_eq!(resolution.book.author, "Frank Herbert");
    assert_eq!(secondary.calls(), 0);
}

#[tokio::test]
async fn test_secondary_used_when_primary_fails() {
    let primary = StubProvider::new("primary", StubReply::Failing);
    let secondary = StubProvider::new(
        "secondary",
        StubReply::Found(BookMetadata {
            title: Some("The Hobbit".to_string()),
            authors: vec!["J. R. R. Tolkien".to_string()],
            cover_url: Some("t.jpg".to_string()),
            subjects: vec!["Juvenile Fiction".to_string()],
            description: Some("A dragon and a wizard".to_string()),
        }),
    );

    let orchestrator = orchestrator(
        Arc::new(MapStore::default()),
        chain(&[primary, secondary]),
        StubCovers::new(None),
    );
    let resolution = orchestrator.resolve(" 9780261103344 ").await;

    assert_eq!(resolution.source, ResolutionSource::Provider("secondary"));
    assert_eq!(resolution.book.cover_url.as_deref(), Some("t.jpg"));
    assert_eq!(resolution.book.genre.as_deref(), Some("Fantasy"));
}

#[tokio::test]
async fn test_resolve_never_runs_cover_search() {
    let covers = StubCovers::new(Some("found.jpg"));
    let primary = StubProvider::new(
        "primary",
        StubReply::Found(metadata("Dune", &["Frank Herbert"])),
    );

    let orchestrator = orchestrator(Arc::new(MapStore::default()), chain(&[primary]), covers.clone());
    let book = orchestrator.resolve("9780441172719").await.book;

    assert!(book.cover_url.is_none());
    assert_eq!(covers.calls(), 0);

    let cover = orchestrator.find_cover("Dune", Some("Frank Herbert")).await;
    assert_eq!(cover.as_deref(), Some("found.jpg"));
    assert_eq!(covers.calls(), 1);
}

#[tokio::test]
async fn test_store_failure_is_reported_and_chain_still_runs() {
    let primary = StubProvider::new("primary", StubReply::Found(metadata("Dune", &[])));

    let orchestrator = orchestrator(
        Arc::new(BrokenStore),
        chain(&[primary.clone()]),
        StubCovers::new(None),
    );
    let resolution = orchestrator.resolve("9780441172719").await;

    assert!(resolution.store_error.is_some());
    assert_eq!(resolution.source, ResolutionSource::Provider("primary"));
    assert_eq!(resolution.book.title, "Dune");
    assert_eq!(resolution.book.author, "Unknown author");
    assert_eq!(primary.calls(), 1);
}

#[tokio::test]
async fn test_blank_isbn_skips_everything() {
    let primary = StubProvider::new("primary", StubReply::Found(metadata("Dune", &[])));

    let orchestrator = orchestrator(
        Arc::new(BrokenStore),
        chain(&[primary.clone()]),
        StubCovers::new(None),
    );
    let resolution = orchestrator.resolve("   ").await;

    assert_eq!(resolution.book, ResolvedBook::unknown());
    assert!(resolution.store_error.is_none());
    assert_eq!(primary.calls(), 0);
}

fn concurrent(providers: &[Arc<StubProvider>]) -> Orchestrator {
    let config = PipelineConfig {
        concurrent_lookup: true,
        ..test_config()
    };
    Orchestrator::new(
        Arc::new(MapStore::default()),
        chain(providers),
        StubCovers::new(None),
        config,
    )
}

#[tokio::test]
async fn test_concurrent_lookup_keeps_primary_priority() {
    let primary = StubProvider::delayed(
        "primary",
        StubReply::Found(metadata("Primary", &[])),
        Duration::from_millis(100),
    );
    let secondary = StubProvider::new("secondary", StubReply::Found(metadata("Secondary", &[])));

    let orchestrator = concurrent(&[primary.clone(), secondary.clone()]);
    let resolution = orchestrator.resolve("1").await;

    assert_eq!(resolution.source, ResolutionSource::Provider("primary"));
    assert_eq!(resolution.book.title, "Primary");
    assert_eq!(primary.calls(), 1);
    assert_eq!(secondary.calls(), 1);
}

#[tokio::test]
async fn test_concurrent_lookup_falls_back_after_primary_miss() {
    let primary = StubProvider::delayed("primary", StubReply::Missing, Duration::from_millis(50));
    let secondary = StubProvider::new("secondary", StubReply::Found(metadata("Secondary", &[])));

    let orchestrator = concurrent(&[primary, secondary]);
    let resolution = orchestrator.resolve("1").await;

    assert_eq!(resolution.source, ResolutionSource::Provider("secondary"));
    assert_eq!(resolution.book.title, "Secondary");
}

#[tokio::test]
async fn test_concurrent_lookup_cancels_slow_loser() {
    let primary = StubProvider::new("primary", StubReply::Found(metadata("Primary", &[])));
    let secondary = StubProvider::delayed(
        "secondary",
        StubReply::Found(metadata("Secondary", &[])),
        Duration::from_secs(30),
    );

    let orchestrator = concurrent(&[primary, secondary]);
    let resolution = tokio::time::timeout(Duration::from_secs(5), orchestrator.resolve("1"))
        .await
        .expect("Primary result should not wait for the secondary");

    assert_eq!(resolution.source, ResolutionSource::Provider("primary"));
}

#[tokio::test]
async fn test_concurrent_lookup_all_missing() {
    let orchestrator = concurrent(&[
        StubProvider::new("primary", StubReply::Failing),
        StubProvider::new("secondary", StubReply::Missing),
    ]);
    let resolution = orchestrator.resolve("0000000000").await;

    assert_eq!(resolution.book, ResolvedBook::unknown());
    assert_eq!(resolution.source, ResolutionSource::Unresolved);
}
