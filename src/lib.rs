//! gymscout - exercise library search
//!
//! Free-text search with `field:value` operators, search history and
//! suggestions over an exercise catalog.

pub mod catalog;
pub mod config;
pub mod db;
pub mod exercises;
pub mod search;
pub mod tui;

pub use catalog::{ExerciseSearch, LocalCatalog};
pub use config::SearchConfig;
pub use db::{Database, KeyValueStore, MemoryStore};
