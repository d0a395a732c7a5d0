//! # tcestore Executor
//!
//! The public API for tcestore, a versioned store for JSON records with a
//! relational summary index.
//!
//! This is the only crate users need to import. It provides:
//! - [`TceStore`] - typed handle over a data directory
//! - [`Command`]/[`Output`] - low-level command interface
//! - [`Error`] - serializable errors with HTTP-style status codes
//!
//! ## Quick Start
//!
//! ```text
//! use tcestore_executor::TceStore;
//! use serde_json::json;
//!
//! let store = TceStore::open("/path/to/data")?;
//!
//! // First submission stores version 1
//! store.submit(json!({"idUnico": "A", "nomeEstagiario": "Maria"}))?;
//!
//! // Submitting the same content again stores nothing
//! store.submit(json!({"nomeEstagiario": "Maria", "idUnico": "A"}))?;
//!
//! let (version, document) = store.get_latest("A")?;
//! ```

#![warn(missing_docs)]

mod api;
mod command;
mod convert;
mod error;
mod executor;
mod output;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use api::{Submitted, TceStore};
pub use command::Command;
pub use error::{Error, Result};
pub use executor::Executor;
pub use output::Output;

pub use tcestore_engine::{Database, RepairReport, TceStoreConfig};
pub use tcestore_index::IndexRow;
pub use tcestore_security::{
    AccessMode, AllowAll, Authorizer, DenyAll, OpenOptions, SharedSecret, DELETE_SECRET_ENV,
};
