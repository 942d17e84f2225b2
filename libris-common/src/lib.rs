//! # Libris Common Library
//!
//! Shared code for the libris catalog:
//! - Error type used by the storage and configuration layers
//! - Bootstrap configuration (TOML file, environment, compiled defaults)
//! - SQLite initialization and `books` table queries

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
