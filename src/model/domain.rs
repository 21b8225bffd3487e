//! Domains: named entity types owning their attributes.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::error::{DomainError, DomainResult};
use crate::expr::{ContextResolution, Expr};
use crate::types::{DomainId, DomainType, ExpressionType, Operator, ScalarType};

use super::attribute::{Attribute, AttributeKind};

/// A named entity type.
///
/// Attribute names are unique within a domain; defining an attribute under an
/// existing name replaces the previous binding.
#[derive(Debug, Clone)]
pub struct Domain {
    id: DomainId,
    /// Physical table the domain reads from.
    table: String,
    attributes: BTreeMap<String, Arc<Attribute>>,
}

impl Domain {
    /// Create an empty domain whose table name equals its own name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            id: DomainId::new(name.clone()),
            table: name,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the physical table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Builder form of [`Domain::add_attribute`].
    pub fn with_attribute(mut self, name: impl Into<String>, ty: ScalarType) -> Self {
        self.add_attribute(name, ty);
        self
    }

    pub fn id(&self) -> &DomainId {
        &self.id
    }

    pub fn name(&self) -> &str {
        self.id.as_str()
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn domain_type(&self) -> DomainType {
        DomainType::new(self.id.clone())
    }

    // =========================================================================
    // Attributes
    // =========================================================================

    /// Add a plain attribute mapped to a same-named column.
    pub fn add_attribute(&mut self, name: impl Into<String>, ty: ScalarType) -> Arc<Attribute> {
        self.insert(Attribute::scalar(self.id.clone(), name, ty))
    }

    /// Add a plain attribute mapped to a differently-named column.
    pub fn add_mapped_attribute(
        &mut self,
        name: impl Into<String>,
        column: impl Into<String>,
        ty: ScalarType,
    ) -> Arc<Attribute> {
        self.insert(Attribute::mapped(
            self.id.clone(),
            name,
            column,
            ExpressionType::Scalar(ty),
        ))
    }

    /// Add an attribute defined by an expression over this domain.
    pub fn add_calculated_attribute(
        &mut self,
        name: impl Into<String>,
        definition: Expr,
    ) -> DomainResult<Arc<Attribute>> {
        let attribute = Attribute::calculated(self.id.clone(), name, definition)?;
        Ok(self.insert(attribute))
    }

    pub(crate) fn insert(&mut self, attribute: Attribute) -> Arc<Attribute> {
        let attribute = Arc::new(attribute);
        self.attributes
            .insert(attribute.name().to_string(), Arc::clone(&attribute));
        attribute
    }

    /// Look up an attribute by name.
    pub fn attribute(&self, name: &str) -> DomainResult<&Arc<Attribute>> {
        self.attributes
            .get(name)
            .ok_or_else(|| DomainError::unknown_attribute(self.name(), name))
    }

    pub fn has_attribute(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    /// Attributes ordered by name.
    pub fn attributes(&self) -> impl Iterator<Item = &Arc<Attribute>> {
        self.attributes.values()
    }

    // =========================================================================
    // References
    // =========================================================================

    /// Add a reference `name` joining `self.source_attr = target.target_attr`.
    ///
    /// When `target` is this same domain (by id) the condition operands are
    /// tagged LEFT and RIGHT so the two sides of the self-join stay apart.
    pub fn add_reference(
        &mut self,
        name: impl Into<String>,
        source_attr: &str,
        target: &Domain,
        target_attr: &str,
    ) -> DomainResult<Arc<Attribute>> {
        let target_attribute = if target.id == self.id {
            Arc::clone(self.attribute(target_attr)?)
        } else {
            Arc::clone(target.attribute(target_attr)?)
        };
        self.link(
            name,
            source_attr,
            target.id.clone(),
            target.table.clone(),
            target_attribute,
        )
    }

    /// Add a reference from this domain to itself.
    pub fn add_self_reference(
        &mut self,
        name: impl Into<String>,
        source_attr: &str,
        target_attr: &str,
    ) -> DomainResult<Arc<Attribute>> {
        let target_attribute = Arc::clone(self.attribute(target_attr)?);
        self.link(
            name,
            source_attr,
            self.id.clone(),
            self.table.clone(),
            target_attribute,
        )
    }

    /// Add a reference backed by an arbitrary join condition.
    pub fn add_reference_with_condition(
        &mut self,
        name: impl Into<String>,
        target: DomainId,
        target_table: impl Into<String>,
        condition: Expr,
    ) -> DomainResult<Arc<Attribute>> {
        let attribute =
            Attribute::reference(self.id.clone(), name, target, target_table, condition)?;
        Ok(self.insert(attribute))
    }

    pub(crate) fn link(
        &mut self,
        name: impl Into<String>,
        source_attr: &str,
        target: DomainId,
        target_table: String,
        target_attribute: Arc<Attribute>,
    ) -> DomainResult<Arc<Attribute>> {
        let source_attribute = Arc::clone(self.attribute(source_attr)?);
        let (left, right) = if target == self.id {
            (ContextResolution::Left, ContextResolution::Right)
        } else {
            (ContextResolution::Default, ContextResolution::Default)
        };
        let condition = Expr::binary(
            Expr::attribute_in(source_attribute, left),
            Operator::Equals,
            Expr::attribute_in(target_attribute, right),
        )?;
        self.add_reference_with_condition(name, target, target_table, condition)
    }

    /// JSON description of the domain, used by the CLI.
    pub fn to_json(&self) -> Value {
        let attributes: Vec<Value> = self
            .attributes()
            .map(|attr| match attr.kind() {
                AttributeKind::Plain { definition } => {
                    let mut value = json!({
                        "name": attr.name(),
                        "type": attr.expr_type().to_string(),
                    });
                    if let Expr::Mapping(mapping) = definition {
                        value["column"] = json!(mapping.name());
                    } else {
                        value["calculated"] = json!(true);
                    }
                    value
                }
                AttributeKind::Reference(reference) => json!({
                    "name": attr.name(),
                    "type": attr.expr_type().to_string(),
                    "target": reference.target().as_str(),
                }),
            })
            .collect();

        json!({
            "name": self.name(),
            "table": self.table,
            "attributes": attributes,
        })
    }
}
