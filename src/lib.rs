//! # domainql
//!
//! A domain-modeling layer that compiles typed, path-navigating queries to SQL.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │      Domain graph (domains, attributes, references)      │
//! │      built by hand or by [metadata] schema ingestion     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [model::QueryBuilder / parser]
//! ┌─────────────────────────────────────────────────────────┐
//! │      Query (typed projections + filter over a domain)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql::generate_sql]
//! ┌─────────────────────────────────────────────────────────┐
//! │      SQL text (one JOIN per distinct navigation path)    │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use domainql::prelude::*;
//!
//! let mut registry = DomainRegistry::new();
//! registry.register(
//!     Domain::new("company")
//!         .with_attribute("id", ScalarType::Integer)
//!         .with_attribute("name", ScalarType::String),
//! );
//! registry.register(
//!     Domain::new("person")
//!         .with_attribute("first_name", ScalarType::String)
//!         .with_attribute("company_id", ScalarType::Integer),
//! );
//! registry.add_reference("person", "works_for", "company_id", "company", "id")?;
//!
//! let query = QueryBuilder::from(&registry, "employees", "person")
//!     .select_as("employee", "first_name")
//!     .select_as("employee_company_name", "works_for.name")
//!     .build()?;
//! let sql = generate_sql(&query)?;
//! ```

pub mod config;
pub mod error;
pub mod expr;
pub mod metadata;
pub mod model;
pub mod parser;
pub mod sql;
pub mod types;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::error::{DomainError, DomainResult, ErrorKind};
    pub use crate::expr::{ContextResolution, Expr, ExpressionBuilder, Literal};
    pub use crate::model::{
        Attribute, Domain, DomainRegistry, Query, QueryBuilder, Relation,
    };
    pub use crate::sql::generate_sql;
    pub use crate::types::{AggregateFunction, ExpressionType, Operator, ScalarType, SourceType};
}

pub use error::{DomainError, DomainResult};
pub use model::{Domain, DomainRegistry, Query, QueryBuilder};
pub use sql::generate_sql;
