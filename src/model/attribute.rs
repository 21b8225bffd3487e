//! Attributes: named, typed members of a domain.

use std::fmt;

use crate::error::{DomainError, DomainResult};
use crate::expr::Expr;
use crate::types::{DomainId, DomainType, ExpressionType, ScalarType, SourceType};

use super::relation::validate_join_condition;

/// Identity of an attribute: owning domain plus attribute name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AttributeId {
    pub domain: DomainId,
    pub name: String,
}

impl fmt::Display for AttributeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.domain, self.name)
    }
}

/// A named member of a domain.
///
/// The owning domain is referenced by id, never by pointer.
#[derive(Debug, Clone)]
pub struct Attribute {
    name: String,
    domain: DomainId,
    kind: AttributeKind,
}

/// What an attribute is.
#[derive(Debug, Clone)]
pub enum AttributeKind {
    /// A value attribute defined by an expression: usually a
    /// [`crate::expr::MappingReference`] to a column, or a calculation.
    Plain { definition: Expr },

    /// A navigable link to another domain.
    Reference(ReferenceAttribute),
}

/// Link to a target domain backed by a boolean join condition.
#[derive(Debug, Clone)]
pub struct ReferenceAttribute {
    target: DomainId,
    target_table: String,
    join_condition: Expr,
}

impl ReferenceAttribute {
    pub fn target(&self) -> &DomainId {
        &self.target
    }

    /// Physical table of the target domain.
    pub fn target_table(&self) -> &str {
        &self.target_table
    }

    pub fn join_condition(&self) -> &Expr {
        &self.join_condition
    }
}

impl Attribute {
    /// A plain attribute mapped to an external column.
    pub fn mapped(
        domain: DomainId,
        name: impl Into<String>,
        column: impl Into<String>,
        ty: ExpressionType,
    ) -> Self {
        let definition = Expr::mapping(domain.clone(), column, ty);
        Self {
            name: name.into(),
            domain,
            kind: AttributeKind::Plain { definition },
        }
    }

    /// A plain attribute mapped to a same-named column.
    pub fn scalar(domain: DomainId, name: impl Into<String>, ty: ScalarType) -> Self {
        let name = name.into();
        Self::mapped(domain, name.clone(), name, ExpressionType::Scalar(ty))
    }

    /// A plain attribute defined by an arbitrary expression.
    ///
    /// The definition must be a constant or scoped to `domain`.
    pub fn calculated(
        domain: DomainId,
        name: impl Into<String>,
        definition: Expr,
    ) -> DomainResult<Self> {
        let name = name.into();
        match definition.source() {
            None => {}
            Some(SourceType::Domain(source)) if source.domain() == &domain => {}
            Some(other) => {
                return Err(DomainError::IncompatibleSources(format!(
                    "definition of '{}.{}' must be scoped to {}, got {}",
                    domain,
                    name,
                    DomainType::new(domain.clone()),
                    other
                )))
            }
        }
        Ok(Self {
            name,
            domain,
            kind: AttributeKind::Plain { definition },
        })
    }

    /// A reference attribute from `domain` to `target`.
    ///
    /// The join condition must be BOOLEAN and scoped to exactly the two
    /// domains (or to the single domain, for a self-reference).
    pub fn reference(
        domain: DomainId,
        name: impl Into<String>,
        target: DomainId,
        target_table: impl Into<String>,
        join_condition: Expr,
    ) -> DomainResult<Self> {
        validate_join_condition(&domain, &target, &join_condition)?;
        Ok(Self {
            name: name.into(),
            domain,
            kind: AttributeKind::Reference(ReferenceAttribute {
                target,
                target_table: target_table.into(),
                join_condition,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The owning domain.
    pub fn domain(&self) -> &DomainId {
        &self.domain
    }

    pub fn id(&self) -> AttributeId {
        AttributeId {
            domain: self.domain.clone(),
            name: self.name.clone(),
        }
    }

    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    pub fn as_reference(&self) -> Option<&ReferenceAttribute> {
        match &self.kind {
            AttributeKind::Reference(reference) => Some(reference),
            AttributeKind::Plain { .. } => None,
        }
    }

    pub fn is_reference(&self) -> bool {
        self.as_reference().is_some()
    }

    /// Defining expression of a plain attribute.
    pub fn definition(&self) -> Option<&Expr> {
        match &self.kind {
            AttributeKind::Plain { definition } => Some(definition),
            AttributeKind::Reference(_) => None,
        }
    }

    /// Type of an access to this attribute. References evaluate to their
    /// target domain.
    pub fn expr_type(&self) -> ExpressionType {
        match &self.kind {
            AttributeKind::Plain { definition } => definition.expr_type(),
            AttributeKind::Reference(reference) => {
                ExpressionType::Domain(DomainType::new(reference.target.clone()))
            }
        }
    }
}
