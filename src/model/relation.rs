//! Registry-level relationships and join-condition validation.

use crate::error::{DomainError, DomainResult};
use crate::expr::Expr;
use crate::types::{DomainId, ExpressionType, SourceType};

/// Check that `condition` can join `owner` to `target`.
///
/// The condition must be BOOLEAN. Its source must pair exactly the two
/// domains, or for a self-reference be that single domain.
pub(crate) fn validate_join_condition(
    owner: &DomainId,
    target: &DomainId,
    condition: &Expr,
) -> DomainResult<()> {
    let ty = condition.expr_type();
    if ty != ExpressionType::BOOLEAN {
        return Err(DomainError::TypeMismatch(format!(
            "join condition from '{}' to '{}' must be BOOLEAN, got {}",
            owner, target, ty
        )));
    }

    match condition.source() {
        Some(SourceType::CrossDomain(cross)) if cross.pairs(owner, target) => Ok(()),
        Some(SourceType::Domain(single)) if owner == target && single.domain() == owner => Ok(()),
        Some(other) => Err(DomainError::invalid_join(
            owner.as_str(),
            target.as_str(),
            format!("condition is scoped to {}", other),
        )),
        None => Err(DomainError::invalid_join(
            owner.as_str(),
            target.as_str(),
            "condition is constant",
        )),
    }
}

/// An explicit (left, right, condition) relationship, independent of any
/// attribute name.
#[derive(Debug, Clone)]
pub struct Relation {
    left: DomainId,
    right: DomainId,
    condition: Expr,
}

impl Relation {
    pub fn new(left: DomainId, right: DomainId, condition: Expr) -> DomainResult<Self> {
        validate_join_condition(&left, &right, &condition)?;
        Ok(Self {
            left,
            right,
            condition,
        })
    }

    pub fn left(&self) -> &DomainId {
        &self.left
    }

    pub fn right(&self) -> &DomainId {
        &self.right
    }

    pub fn condition(&self) -> &Expr {
        &self.condition
    }

    /// Does this relation touch `domain` on either side?
    pub fn involves(&self, domain: &DomainId) -> bool {
        &self.left == domain || &self.right == domain
    }
}
