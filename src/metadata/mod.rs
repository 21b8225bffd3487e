//! Schema ingestion.
//!
//! Reverse-engineers a physical database schema into a domain graph:
//!
//! ```text
//! SQLite file ──► SqliteIntrospector ──► SchemaModel ──► ingest() ──► DomainRegistry
//! ```
//!
//! # Example
//!
//! ```ignore
//! use domainql::metadata::{ingest, IngestOptions, SqliteIntrospector};
//! use domainql::model::DomainRegistry;
//!
//! let schema = SqliteIntrospector::open("shop.sqlite")?.introspect()?;
//! let mut registry = DomainRegistry::new();
//! let changes = ingest(&schema, &mut registry, &IngestOptions::default())?;
//! ```

mod mapping;
mod schema;
mod sqlite;

pub use mapping::{ingest, IngestOptions, Naming};
pub use schema::{Column, ColumnPair, ForeignKey, SchemaModel, SqlType, Table};
pub use sqlite::SqliteIntrospector;

use crate::error::DomainError;

/// Errors that can occur while reading a catalog.
#[derive(Debug, thiserror::Error)]
pub enum MetadataError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type MetadataResult<T> = Result<T, MetadataError>;

/// Introspect a SQLite database and ingest it into a fresh registry.
pub fn load_sqlite(
    path: impl AsRef<std::path::Path>,
    options: &IngestOptions,
) -> MetadataResult<crate::model::DomainRegistry> {
    let schema = SqliteIntrospector::open(path)?.introspect()?;
    let mut registry = crate::model::DomainRegistry::new();
    ingest(&schema, &mut registry, options)?;
    Ok(registry)
}
