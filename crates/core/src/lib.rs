//! Domain types and pure logic for the socialmap content planner.
//!
//! Nothing in this crate touches the database or the network. The import
//! reconciliation engine is written against the [`transfer::ImportStore`]
//! trait; `socialmap-db` provides the PostgreSQL implementation.

pub mod content;
pub mod error;
pub mod transfer;
pub mod types;
