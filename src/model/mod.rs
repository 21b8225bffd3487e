//! The domain graph: domains, attributes, relations, the registry and queries.
//!
//! Domains live in a [`DomainRegistry`] arena keyed by name. Attributes are
//! shared as `Arc<Attribute>` and refer to their owning domain by id, so the
//! graph has no ownership cycles.

mod attribute;
mod change_set;
mod domain;
mod query;
mod query_builder;
mod registry;
mod relation;

pub use attribute::{Attribute, AttributeId, AttributeKind, ReferenceAttribute};
pub use change_set::{DomainChange, DomainChangeSet};
pub use domain::Domain;
pub use query::{Projection, Query};
pub use query_builder::{resolve_path, QueryBuilder};
pub use registry::DomainRegistry;
pub use relation::Relation;
