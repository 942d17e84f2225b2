//! Database initialization and queries

pub mod books;
pub mod init;

pub use books::*;
pub use init::*;
