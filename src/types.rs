//! The closed type system of the expression language.
//!
//! Every expression evaluates to an [`ExpressionType`] and is scoped to an
//! optional [`SourceType`]. Operators and aggregate functions derive their
//! result types from the tables in this module.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

// =============================================================================
// Scalar Types
// =============================================================================

/// Scalar value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScalarType {
    String,
    Integer,
    Decimal,
    Boolean,
    Date,
    Timestamp,
}

impl ScalarType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarType::String => "STRING",
            ScalarType::Integer => "INTEGER",
            ScalarType::Decimal => "DECIMAL",
            ScalarType::Boolean => "BOOLEAN",
            ScalarType::Date => "DATE",
            ScalarType::Timestamp => "TIMESTAMP",
        }
    }

    /// Numeric widening for arithmetic: DECIMAL wins, otherwise INTEGER.
    pub fn widen(left: ScalarType, right: ScalarType) -> ScalarType {
        if left == ScalarType::Decimal || right == ScalarType::Decimal {
            ScalarType::Decimal
        } else {
            ScalarType::Integer
        }
    }
}

impl fmt::Display for ScalarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Domain Identity
// =============================================================================

/// Stable identifier of a domain: its name.
///
/// Domains and attributes reference each other through ids rather than
/// pointers, so two ids are the same domain iff their names are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DomainId(String);

impl DomainId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DomainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DomainId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The type of a value that navigates to a domain, and the scope marker of
/// expressions evaluated inside that domain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainType(DomainId);

impl DomainType {
    pub fn new(domain: DomainId) -> Self {
        Self(domain)
    }

    pub fn domain(&self) -> &DomainId {
        &self.0
    }
}

impl fmt::Display for DomainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Domain{{{}}}", self.0)
    }
}

// =============================================================================
// Expression and Source Types
// =============================================================================

/// What an expression evaluates to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExpressionType {
    Scalar(ScalarType),
    Domain(DomainType),
    /// Result of an aggregate function, wrapping its scalar result.
    Aggregate(ScalarType),
}

impl ExpressionType {
    pub const BOOLEAN: ExpressionType = ExpressionType::Scalar(ScalarType::Boolean);

    pub fn is_scalar(&self) -> bool {
        matches!(self, ExpressionType::Scalar(_))
    }

    pub fn is_aggregate(&self) -> bool {
        matches!(self, ExpressionType::Aggregate(_))
    }

    pub fn is_domain(&self) -> bool {
        matches!(self, ExpressionType::Domain(_))
    }

    pub fn as_scalar(&self) -> Option<ScalarType> {
        match self {
            ExpressionType::Scalar(scalar) => Some(*scalar),
            _ => None,
        }
    }

    pub fn as_domain(&self) -> Option<&DomainType> {
        match self {
            ExpressionType::Domain(domain) => Some(domain),
            _ => None,
        }
    }
}

impl fmt::Display for ExpressionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpressionType::Scalar(scalar) => write!(f, "{}", scalar),
            ExpressionType::Domain(domain) => write!(f, "{}", domain),
            ExpressionType::Aggregate(scalar) => write!(f, "AGGREGATE({})", scalar),
        }
    }
}

/// A pair of distinct domains spanned by a join-condition expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CrossDomainType {
    left: DomainType,
    right: DomainType,
}

impl CrossDomainType {
    pub fn new(left: DomainType, right: DomainType) -> Self {
        Self { left, right }
    }

    pub fn left(&self) -> &DomainType {
        &self.left
    }

    pub fn right(&self) -> &DomainType {
        &self.right
    }

    /// Does this pair name exactly `a` and `b`, in either order?
    pub fn pairs(&self, a: &DomainId, b: &DomainId) -> bool {
        (self.left.domain() == a && self.right.domain() == b)
            || (self.left.domain() == b && self.right.domain() == a)
    }
}

/// Which domain(s) an expression is scoped to.
///
/// Domain-independent expressions (constants) have no source at all, which is
/// expressed as `Option<SourceType>` being `None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceType {
    Domain(DomainType),
    CrossDomain(CrossDomainType),
}

impl SourceType {
    pub fn domain(id: DomainId) -> Self {
        SourceType::Domain(DomainType::new(id))
    }

    /// Combine the sources of two operands.
    ///
    /// A missing side takes the other; equal sides are reused; two distinct
    /// domains become a [`CrossDomainType`]. Anything else cannot be combined.
    pub fn union(
        left: Option<&SourceType>,
        right: Option<&SourceType>,
    ) -> DomainResult<Option<SourceType>> {
        match (left, right) {
            (None, None) => Ok(None),
            (None, Some(source)) | (Some(source), None) => Ok(Some(source.clone())),
            (Some(l), Some(r)) if l == r => Ok(Some(l.clone())),
            (Some(SourceType::Domain(l)), Some(SourceType::Domain(r))) => Ok(Some(
                SourceType::CrossDomain(CrossDomainType::new(l.clone(), r.clone())),
            )),
            (Some(l), Some(r)) => Err(DomainError::IncompatibleSources(format!(
                "cannot combine {} with {}",
                l, r
            ))),
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceType::Domain(domain) => write!(f, "{}", domain),
            SourceType::CrossDomain(cross) => write!(f, "{} x {}", cross.left, cross.right),
        }
    }
}

// =============================================================================
// Operators
// =============================================================================

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operator {
    // Comparison
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
    Like,
    In,
    // Logical
    And,
    Or,
    // Arithmetic
    Plus,
    Minus,
    Multiply,
    Divide,
}

impl Operator {
    /// SQL spelling of the operator.
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equals => "=",
            Operator::NotEquals => "<>",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEquals => ">=",
            Operator::LessThan => "<",
            Operator::LessThanOrEquals => "<=",
            Operator::Like => "LIKE",
            Operator::In => "IN",
            Operator::And => "AND",
            Operator::Or => "OR",
            Operator::Plus => "+",
            Operator::Minus => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
        }
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Operator::Plus | Operator::Minus | Operator::Multiply | Operator::Divide
        )
    }

    /// Result type of `left <op> right`.
    ///
    /// Comparison and logical operators always yield BOOLEAN. Arithmetic
    /// operators require scalar operands and widen to DECIMAL if either side
    /// is DECIMAL, INTEGER otherwise.
    pub fn result_type(
        &self,
        left: &ExpressionType,
        right: &ExpressionType,
    ) -> DomainResult<ExpressionType> {
        if !self.is_arithmetic() {
            return Ok(ExpressionType::BOOLEAN);
        }
        match (left.as_scalar(), right.as_scalar()) {
            (Some(l), Some(r)) => Ok(ExpressionType::Scalar(ScalarType::widen(l, r))),
            _ => Err(DomainError::TypeMismatch(format!(
                "arithmetic operator {} requires scalar operands, got {} and {}",
                self.symbol(),
                left,
                right
            ))),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Aggregate functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AggregateFunction {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateFunction {
    pub fn name(&self) -> &'static str {
        match self {
            AggregateFunction::Count => "COUNT",
            AggregateFunction::Sum => "SUM",
            AggregateFunction::Avg => "AVG",
            AggregateFunction::Min => "MIN",
            AggregateFunction::Max => "MAX",
        }
    }

    /// Scalar result of the function. MIN/MAX pass the operand type through.
    ///
    /// `operand` is `None` only for COUNT(*).
    pub fn result_type(&self, operand: Option<ScalarType>) -> DomainResult<ScalarType> {
        match (self, operand) {
            (AggregateFunction::Count, _) => Ok(ScalarType::Integer),
            (AggregateFunction::Sum | AggregateFunction::Avg, Some(_)) => Ok(ScalarType::Decimal),
            (AggregateFunction::Min | AggregateFunction::Max, Some(scalar)) => Ok(scalar),
            (_, None) => Err(DomainError::TypeMismatch(format!(
                "{} requires an operand",
                self.name()
            ))),
        }
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
