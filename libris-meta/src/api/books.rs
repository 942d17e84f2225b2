//! Book metadata API handlers
//!
//! GET /api/preview_book, GET /api/cover_search, POST /api/books,
//! GET /api/genres

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use libris_common::db::UNCATEGORIZED;
use serde::{Deserialize, Serialize};

use crate::{
    classifier::Genre,
    error::{ApiError, ApiResult},
    services::intake::{self, IntakeRequest},
    types::ResolutionSource,
    AppState,
};

/// GET /api/preview_book query
#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    #[serde(default)]
    pub isbn: Option<String>,
}

/// GET /api/preview_book response
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub genre: Option<String>,
    pub source: ResolutionSource,
}

/// GET /api/cover_search query
#[derive(Debug, Deserialize)]
pub struct CoverSearchQuery {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
}

/// GET /api/cover_search response
#[derive(Debug, Serialize)]
pub struct CoverSearchResponse {
    pub cover_url: Option<String>,
}

/// Stored book as returned by POST /api/books
#[derive(Debug, Serialize)]
pub struct AddedBook {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub cover_url: Option<String>,
    pub genre: Option<String>,
}

/// POST /api/books response
#[derive(Debug, Serialize)]
pub struct AddBookResponse {
    pub ok: bool,
    pub book: AddedBook,
}

/// GET /api/genres response
#[derive(Debug, Serialize)]
pub struct GenresResponse {
    pub genres: Vec<&'static str>,
}

/// GET /api/preview_book?isbn=
///
/// Resolves without saving.
pub async fn preview_book(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
) -> ApiResult<Json<PreviewResponse>> {
    let isbn = query
        .isbn
        .as_deref()
        .map(str::trim)
        .filter(|isbn| !isbn.is_empty())
        .ok_or_else(|| ApiError::BadRequest("ISBN is required".to_string()))?
        .to_string();

    let resolution = state.orchestrator.resolve(&isbn).await;
    let book = resolution.book;

    Ok(Json(PreviewResponse {
        isbn,
        title: book.title,
        author: book.author,
        cover_url: book.cover_url,
        genre: book.genre,
        source: resolution.source,
    }))
}

/// GET /api/cover_search?title=&author=
pub async fn cover_search(
    State(state): State<AppState>,
    Query(query): Query<CoverSearchQuery>,
) -> ApiResult<Json<CoverSearchResponse>> {
    let title = query
        .title
        .as_deref()
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .ok_or_else(|| ApiError::BadRequest("title is required".to_string()))?;

    let author = query.author.as_deref().map(str::trim).filter(|a| !a.is_empty());
    let cover_url = state.orchestrator.find_cover(title, author).await;

    Ok(Json(CoverSearchResponse { cover_url }))
}

/// POST /api/books
///
/// 400 on a missing ISBN, 409 when the ISBN is already catalogued.
pub async fn add_book(
    State(state): State<AppState>,
    Json(request): Json<IntakeRequest>,
) -> ApiResult<Json<AddBookResponse>> {
    let outcome = intake::add_book(&state.db, &state.orchestrator, request).await?;
    let book = outcome.book;

    Ok(Json(AddBookResponse {
        ok: true,
        book: AddedBook {
            id: outcome.id,
            isbn: book.isbn,
            title: book.title,
            author: book.author,
            cover_url: book.cover_url,
            genre: book.genre,
        },
    }))
}

/// GET /api/genres
///
/// Taxonomy labels in rule priority order, then the fallback labels and
/// the "no genre" value edit forms offer.
pub async fn list_genres() -> Json<GenresResponse> {
    Json(GenresResponse {
        genres: Genre::all()
            .map(|g| g.as_str())
            .chain([UNCATEGORIZED])
            .collect(),
    })
}

/// Build book metadata routes
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/api/preview_book", get(preview_book))
        .route("/api/cover_search", get(cover_search))
        .route("/api/books", post(add_book))
        .route("/api/genres", get(list_genres))
}
