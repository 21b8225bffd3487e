//! Join identity and alias allocation for a single generation call.
//!
//! A [`DomainPath`] names "the domain reached by following exactly these
//! reference hops from the query root". Two independently built paths with the
//! same hops are equal, which is what deduplicates joins. The [`JoinContext`]
//! binds each distinct path to an alias in first-use order.

use std::collections::{HashMap, HashSet};
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::Arc;

use crate::error::{DomainError, DomainResult};
use crate::model::{Attribute, AttributeId, ReferenceAttribute};
use crate::types::DomainId;

// =============================================================================
// DomainPath
// =============================================================================

/// An immutable chain of reference hops ending at `domain`.
#[derive(Debug, Clone)]
pub struct DomainPath {
    domain: DomainId,
    table: String,
    parent: Option<Rc<DomainPath>>,
    reference: Option<Arc<Attribute>>,
}

impl DomainPath {
    /// The query root.
    pub fn root(domain: DomainId, table: impl Into<String>) -> Rc<Self> {
        Rc::new(Self {
            domain,
            table: table.into(),
            parent: None,
            reference: None,
        })
    }

    /// Follow `reference` one hop from `parent`.
    pub fn child(parent: &Rc<DomainPath>, reference: Arc<Attribute>) -> DomainResult<Rc<Self>> {
        let (domain, table) = match reference.as_reference() {
            Some(target) => (target.target().clone(), target.target_table().to_string()),
            None => {
                return Err(DomainError::NotAReference {
                    domain: reference.domain().to_string(),
                    attribute: reference.name().to_string(),
                })
            }
        };
        Ok(Rc::new(Self {
            domain,
            table,
            parent: Some(Rc::clone(parent)),
            reference: Some(reference),
        }))
    }

    pub fn domain(&self) -> &DomainId {
        &self.domain
    }

    /// Physical table of the domain at the end of the path.
    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn parent(&self) -> Option<&Rc<DomainPath>> {
        self.parent.as_ref()
    }

    /// The reference attribute of the last hop.
    pub fn reference(&self) -> Option<&Arc<Attribute>> {
        self.reference.as_ref()
    }

    pub(crate) fn reference_attribute(&self) -> Option<&ReferenceAttribute> {
        self.reference.as_ref().and_then(|r| r.as_reference())
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Number of hops from the root.
    pub fn depth(&self) -> usize {
        self.parent.as_ref().map_or(0, |p| 1 + p.depth())
    }

    /// Alias proposed before collision handling: the domain name for the
    /// root, the reference name otherwise.
    fn base_alias(&self) -> &str {
        match &self.reference {
            Some(reference) => reference.name(),
            None => self.domain.as_str(),
        }
    }

    fn reference_id(&self) -> Option<AttributeId> {
        self.reference.as_ref().map(|r| r.id())
    }
}

impl PartialEq for DomainPath {
    fn eq(&self, other: &Self) -> bool {
        self.domain == other.domain
            && self.reference_id() == other.reference_id()
            && self.parent == other.parent
    }
}

impl Eq for DomainPath {}

impl Hash for DomainPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.domain.hash(state);
        self.reference_id().hash(state);
        self.parent.hash(state);
    }
}

// =============================================================================
// JoinContext
// =============================================================================

/// Insertion-ordered path → alias bindings.
#[derive(Debug, Default)]
pub struct JoinContext {
    entries: Vec<(Rc<DomainPath>, String)>,
    index: HashMap<Rc<DomainPath>, usize>,
    taken: HashSet<String>,
    counter: usize,
}

impl JoinContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alias for `path`, allocating one on first use.
    ///
    /// Repeated calls with an equal path return the same alias and add no
    /// entry. A path whose base alias is already bound elsewhere gets `_N`
    /// appended, `N` taken from a counter shared by the whole context.
    pub fn get_or_create_alias(&mut self, path: &Rc<DomainPath>) -> String {
        if let Some(&position) = self.index.get(path) {
            return self.entries[position].1.clone();
        }

        let base = path.base_alias();
        let mut alias = base.to_string();
        while self.taken.contains(&alias) {
            self.counter += 1;
            alias = format!("{}_{}", base, self.counter);
        }
        log::debug!(
            "alias '{}' bound to {} (depth {})",
            alias,
            path.domain(),
            path.depth()
        );

        self.taken.insert(alias.clone());
        self.index.insert(Rc::clone(path), self.entries.len());
        self.entries.push((Rc::clone(path), alias.clone()));
        alias
    }

    /// Alias already bound to `path`, if any.
    pub fn alias(&self, path: &DomainPath) -> Option<&str> {
        self.index
            .get(path)
            .map(|&position| self.entries[position].1.as_str())
    }

    /// Entry at `position` in registration order.
    pub fn get(&self, position: usize) -> Option<(&Rc<DomainPath>, &str)> {
        self.entries
            .get(position)
            .map(|(path, alias)| (path, alias.as_str()))
    }

    /// Bindings in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&Rc<DomainPath>, &str)> {
        self.entries.iter().map(|(path, alias)| (path, alias.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
