//! The domain arena.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::{DomainError, DomainResult};

use super::attribute::Attribute;
use super::domain::Domain;
use super::relation::Relation;

/// Name-keyed store of domains plus registry-level relations.
///
/// Domains refer to each other by [`crate::types::DomainId`], so the registry
/// is the single owner of the graph.
#[derive(Debug, Clone, Default)]
pub struct DomainRegistry {
    domains: BTreeMap<String, Domain>,
    relations: Vec<Relation>,
}

impl DomainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a domain, replacing any domain with the same name.
    pub fn register(&mut self, domain: Domain) {
        log::trace!("registering domain '{}'", domain.name());
        self.domains.insert(domain.name().to_string(), domain);
    }

    pub fn domain(&self, name: &str) -> DomainResult<&Domain> {
        self.domains
            .get(name)
            .ok_or_else(|| DomainError::UnknownDomain(name.to_string()))
    }

    pub fn domain_mut(&mut self, name: &str) -> DomainResult<&mut Domain> {
        self.domains
            .get_mut(name)
            .ok_or_else(|| DomainError::UnknownDomain(name.to_string()))
    }

    pub fn has_domain(&self, name: &str) -> bool {
        self.domains.contains_key(name)
    }

    /// All domains, sorted by name.
    pub fn domains(&self) -> impl Iterator<Item = &Domain> {
        self.domains.values()
    }

    /// Add a reference on `domain` joining `domain.source_attr = target.target_attr`.
    pub fn add_reference(
        &mut self,
        domain: &str,
        name: &str,
        source_attr: &str,
        target: &str,
        target_attr: &str,
    ) -> DomainResult<Arc<Attribute>> {
        let (target_id, target_table, target_attribute) = {
            let target = self.domain(target)?;
            (
                target.id().clone(),
                target.table().to_string(),
                Arc::clone(target.attribute(target_attr)?),
            )
        };
        self.domain_mut(domain)?.link(
            name,
            source_attr,
            target_id,
            target_table,
            target_attribute,
        )
    }

    // =========================================================================
    // Relations
    // =========================================================================

    /// Record a relation. Both sides must be registered.
    pub fn register_relation(&mut self, relation: Relation) -> DomainResult<()> {
        self.domain(relation.left().as_str())?;
        self.domain(relation.right().as_str())?;
        self.relations.push(relation);
        Ok(())
    }

    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Relations touching `domain` on either side.
    pub fn relations_for_domain<'a>(&'a self, domain: &str) -> Vec<&'a Relation> {
        self.relations
            .iter()
            .filter(|relation| relation.involves(&domain.into()))
            .collect()
    }

    /// JSON description of every domain and relation.
    pub fn to_json(&self) -> Value {
        let domains: Vec<Value> = self.domains().map(Domain::to_json).collect();
        let relations: Vec<Value> = self
            .relations
            .iter()
            .map(|relation| {
                json!({
                    "left": relation.left().as_str(),
                    "right": relation.right().as_str(),
                })
            })
            .collect();
        json!({
            "domains": domains,
            "relations": relations,
        })
    }
}
