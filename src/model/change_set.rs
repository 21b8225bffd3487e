//! Ordered record of model modifications.

use serde::Serialize;

/// One modification of the domain graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "change", rename_all = "snake_case")]
pub enum DomainChange {
    AddDomain { domain: String, table: String },
    AddAttribute { domain: String, attribute: String },
    AddReference {
        domain: String,
        reference: String,
        target: String,
    },
    AddRelation { left: String, right: String },
}

impl DomainChange {
    /// Name of the domain the change applies to (the left side for relations).
    pub fn domain(&self) -> &str {
        match self {
            DomainChange::AddDomain { domain, .. }
            | DomainChange::AddAttribute { domain, .. }
            | DomainChange::AddReference { domain, .. } => domain,
            DomainChange::AddRelation { left, .. } => left,
        }
    }
}

/// Changes in the order they were applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct DomainChangeSet {
    changes: Vec<DomainChange>,
}

impl DomainChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, change: DomainChange) {
        self.changes.push(change);
    }

    pub fn changes(&self) -> &[DomainChange] {
        &self.changes
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Changes touching `domain`.
    pub fn for_domain<'a>(&'a self, domain: &'a str) -> impl Iterator<Item = &'a DomainChange> {
        self.changes.iter().filter(move |c| c.domain() == domain)
    }
}
