//! Calling-layer services built on the resolution pipeline
//!
//! The pipeline never writes to the store. These services do:
//! - **intake:** insertion-time field collection for a new book
//! - **backfill:** genre and cover repair over already-catalogued books

pub mod backfill;
pub mod intake;

pub use backfill::{backfill_covers, backfill_genres, BackfillReport};
pub use intake::{add_book, IntakeOutcome, IntakeRequest};
