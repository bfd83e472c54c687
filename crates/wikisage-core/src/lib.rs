//! # Wikisage Core
//! Shared foundation for the Wikisage workspace: configuration, the error
//! taxonomy, wire/domain types, and the capability traits the other crates
//! implement (`Completer`, `Embedder`, `Retriever`, `HistoryStore`,
//! `Channel`).

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use error::{Result, WikisageError};
