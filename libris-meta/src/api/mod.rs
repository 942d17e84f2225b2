//! HTTP API handlers for libris-meta

pub mod books;
pub mod health;

pub use books::book_routes;
pub use health::health_routes;
