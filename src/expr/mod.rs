//! Expression AST - the typed core of the query language.
//!
//! [`Expr`] is a closed set of variants. Every variant knows its
//! [`ExpressionType`] and its [`SourceType`], and the validating variants
//! (compose, binary, aggregate) can only be built through fallible
//! constructors, so an `Expr` that exists is always well-typed.

mod builder;
mod literal;

pub use builder::ExpressionBuilder;
pub use literal::Literal;

use std::sync::Arc;

use crate::error::{DomainError, DomainResult};
use crate::model::{Attribute, Query};
use crate::types::{AggregateFunction, DomainId, ExpressionType, Operator, ScalarType, SourceType};

// =============================================================================
// Expression AST
// =============================================================================

/// An expression.
///
/// Every variant must be handled by type inference and by the SQL generator;
/// the compiler enforces this.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Constant value, scoped to no domain.
    Literal(Literal),

    /// Access to an attribute of a domain.
    Attribute(AttributeExpr),

    /// Navigate through a reference, then evaluate in the target domain.
    Compose(ComposeExpr),

    /// left op right
    Binary(BinaryExpr),

    /// FUNCTION(operand) or COUNT(*)
    Aggregate(AggregateExpr),

    /// External column-like identifier within a domain.
    Mapping(MappingReference),

    /// A nested query used as a sub-relation.
    Query(QueryExpr),
}

/// Which side of a join an attribute resolves to when rendered inside a join
/// condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContextResolution {
    /// Resolve by matching the attribute's domain against the joined sides.
    #[default]
    Default,
    /// The parent (already joined) side.
    Left,
    /// The side being joined.
    Right,
}

#[derive(Debug, Clone)]
pub struct AttributeExpr {
    attribute: Arc<Attribute>,
    context: ContextResolution,
}

impl AttributeExpr {
    pub fn attribute(&self) -> &Arc<Attribute> {
        &self.attribute
    }

    pub fn context(&self) -> ContextResolution {
        self.context
    }
}

#[derive(Debug, Clone)]
pub struct ComposeExpr {
    reference: Box<Expr>,
    composition: Box<Expr>,
}

impl ComposeExpr {
    pub fn reference(&self) -> &Expr {
        &self.reference
    }

    pub fn composition(&self) -> &Expr {
        &self.composition
    }
}

#[derive(Debug, Clone)]
pub struct BinaryExpr {
    left: Box<Expr>,
    op: Operator,
    right: Box<Expr>,
    ty: ExpressionType,
    source: Option<SourceType>,
}

impl BinaryExpr {
    pub fn left(&self) -> &Expr {
        &self.left
    }

    pub fn op(&self) -> Operator {
        self.op
    }

    pub fn right(&self) -> &Expr {
        &self.right
    }
}

#[derive(Debug, Clone)]
pub struct AggregateExpr {
    operand: Option<Box<Expr>>,
    function: AggregateFunction,
    result: ScalarType,
}

impl AggregateExpr {
    /// The aggregated operand; `None` for COUNT(*).
    pub fn operand(&self) -> Option<&Expr> {
        self.operand.as_deref()
    }

    pub fn function(&self) -> AggregateFunction {
        self.function
    }
}

/// Leaf naming an external identifier (usually a column) inside a domain.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingReference {
    domain: DomainId,
    name: String,
    ty: ExpressionType,
}

impl MappingReference {
    pub fn new(domain: DomainId, name: impl Into<String>, ty: ExpressionType) -> Self {
        Self {
            domain,
            name: name.into(),
            ty,
        }
    }

    pub fn domain(&self) -> &DomainId {
        &self.domain
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
pub struct QueryExpr(Arc<Query>);

impl QueryExpr {
    pub fn query(&self) -> &Query {
        &self.0
    }
}

// =============================================================================
// Constructors
// =============================================================================

impl Expr {
    /// Create a literal expression.
    pub fn literal(value: impl Into<Literal>) -> Self {
        Expr::Literal(value.into())
    }

    /// Create an attribute access with default context resolution.
    pub fn attribute(attribute: Arc<Attribute>) -> Self {
        Self::attribute_in(attribute, ContextResolution::Default)
    }

    /// Create an attribute access with an explicit context resolution.
    pub fn attribute_in(attribute: Arc<Attribute>, context: ContextResolution) -> Self {
        Expr::Attribute(AttributeExpr { attribute, context })
    }

    /// Create a mapping reference leaf.
    pub fn mapping(domain: DomainId, name: impl Into<String>, ty: ExpressionType) -> Self {
        Expr::Mapping(MappingReference::new(domain, name, ty))
    }

    /// Wrap a query for use as a nested sub-relation.
    pub fn query(query: impl Into<Arc<Query>>) -> Self {
        Expr::Query(QueryExpr(query.into()))
    }

    /// Create `reference` → `composition`.
    ///
    /// `reference` must evaluate to a domain, and `composition` must be scoped
    /// to exactly that domain. Navigation can therefore only continue through
    /// a declared reference.
    pub fn compose(reference: Expr, composition: Expr) -> DomainResult<Self> {
        let ty = reference.expr_type();
        let target = ty.as_domain().ok_or_else(|| {
            DomainError::InvalidComposition(format!(
                "reference expression must evaluate to a domain, got {}",
                ty
            ))
        })?;

        let expected = SourceType::Domain(target.clone());
        match composition.source() {
            Some(source) if source == expected => {}
            Some(source) => {
                return Err(DomainError::InvalidComposition(format!(
                    "composition must be scoped to {}, got {}",
                    expected, source
                )))
            }
            None => {
                return Err(DomainError::InvalidComposition(format!(
                    "composition must be scoped to {}, got a constant expression",
                    expected
                )))
            }
        }

        Ok(Expr::Compose(ComposeExpr {
            reference: Box::new(reference),
            composition: Box::new(composition),
        }))
    }

    /// Create a binary operation.
    pub fn binary(left: Expr, op: Operator, right: Expr) -> DomainResult<Self> {
        let source = SourceType::union(left.source().as_ref(), right.source().as_ref())?;
        let ty = op.result_type(&left.expr_type(), &right.expr_type())?;
        Ok(Expr::Binary(BinaryExpr {
            left: Box::new(left),
            op,
            right: Box::new(right),
            ty,
            source,
        }))
    }

    /// Create an aggregate. Only COUNT accepts a missing operand.
    pub fn aggregate(operand: Option<Expr>, function: AggregateFunction) -> DomainResult<Self> {
        let operand_type = match &operand {
            Some(expr) => {
                let ty = expr.expr_type();
                let scalar = ty.as_scalar().ok_or_else(|| {
                    DomainError::TypeMismatch(format!(
                        "{} can only be applied to scalar expressions, got {}",
                        function, ty
                    ))
                })?;
                Some(scalar)
            }
            None => None,
        };
        let result = function.result_type(operand_type)?;
        Ok(Expr::Aggregate(AggregateExpr {
            operand: operand.map(Box::new),
            function,
            result,
        }))
    }

    /// COUNT(*)
    pub fn count_all() -> Self {
        Expr::Aggregate(AggregateExpr {
            operand: None,
            function: AggregateFunction::Count,
            result: ScalarType::Integer,
        })
    }

    /// `self AND other`
    pub fn and(self, other: Expr) -> DomainResult<Self> {
        Expr::binary(self, Operator::And, other)
    }
}

// =============================================================================
// Type Inference
// =============================================================================

impl Expr {
    /// What this expression evaluates to.
    pub fn expr_type(&self) -> ExpressionType {
        match self {
            Expr::Literal(literal) => ExpressionType::Scalar(literal.scalar_type()),
            Expr::Attribute(attr) => attr.attribute.expr_type(),
            Expr::Compose(compose) => compose.composition.expr_type(),
            Expr::Binary(binary) => binary.ty.clone(),
            Expr::Aggregate(aggregate) => ExpressionType::Aggregate(aggregate.result),
            Expr::Mapping(mapping) => mapping.ty.clone(),
            Expr::Query(query) => ExpressionType::Domain(query.0.domain_type()),
        }
    }

    /// Which domain(s) this expression is scoped to; `None` for constants.
    ///
    /// A compose expression reports the source of its reference: navigation
    /// is transparent to the caller.
    pub fn source(&self) -> Option<SourceType> {
        match self {
            Expr::Literal(_) => None,
            Expr::Attribute(attr) => Some(SourceType::domain(attr.attribute.domain().clone())),
            Expr::Compose(compose) => compose.reference.source(),
            Expr::Binary(binary) => binary.source.clone(),
            Expr::Aggregate(aggregate) => aggregate.operand.as_ref().and_then(|op| op.source()),
            Expr::Mapping(mapping) => Some(SourceType::domain(mapping.domain.clone())),
            Expr::Query(query) => Some(SourceType::Domain(query.0.domain_type())),
        }
    }

    /// Number of reference hops in a compose chain (0 for anything else).
    pub fn navigation_depth(&self) -> usize {
        match self {
            Expr::Compose(compose) => 1 + compose.composition.navigation_depth(),
            _ => 0,
        }
    }

    /// The innermost non-compose expression of a navigation chain.
    pub fn terminal(&self) -> &Expr {
        match self {
            Expr::Compose(compose) => compose.composition.terminal(),
            other => other,
        }
    }
}
