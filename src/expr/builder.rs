//! Programmatic expression builder.
//!
//! An [`ExpressionBuilder`] is an unresolved expression tree: attribute paths
//! are kept as dotted strings until [`ExpressionBuilder::build`] resolves them
//! against a root domain.
//!
//! ```ignore
//! use domainql::expr::ExpressionBuilder as E;
//!
//! let filter = E::and(E::gt_value("salary", 50000), E::eq_value("works_for.name", "KMSF"));
//! let expr = filter.build(&registry, registry.domain("person")?)?;
//! ```

use crate::error::DomainResult;
use crate::model::{resolve_path, Domain, DomainRegistry};
use crate::types::{AggregateFunction, Operator};

use super::{Expr, Literal};

/// Unresolved expression tree.
#[derive(Debug, Clone)]
pub enum ExpressionBuilder {
    /// Dotted attribute path, e.g. `works_for.address.city`
    Attribute(String),
    Literal(Literal),
    Binary {
        left: Box<ExpressionBuilder>,
        op: Operator,
        right: Box<ExpressionBuilder>,
    },
    Aggregate {
        operand: Option<Box<ExpressionBuilder>>,
        function: AggregateFunction,
    },
    /// An already-resolved expression.
    Resolved(Expr),
}

impl ExpressionBuilder {
    pub fn attr(path: impl Into<String>) -> Self {
        ExpressionBuilder::Attribute(path.into())
    }

    pub fn literal(value: impl Into<Literal>) -> Self {
        ExpressionBuilder::Literal(value.into())
    }

    pub fn resolved(expr: Expr) -> Self {
        ExpressionBuilder::Resolved(expr)
    }

    pub fn binary(left: ExpressionBuilder, op: Operator, right: ExpressionBuilder) -> Self {
        ExpressionBuilder::Binary {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn aggregate(operand: ExpressionBuilder, function: AggregateFunction) -> Self {
        ExpressionBuilder::Aggregate {
            operand: Some(Box::new(operand)),
            function,
        }
    }

    // Comparison

    pub fn eq(left: ExpressionBuilder, right: ExpressionBuilder) -> Self {
        Self::binary(left, Operator::Equals, right)
    }

    pub fn ne(left: ExpressionBuilder, right: ExpressionBuilder) -> Self {
        Self::binary(left, Operator::NotEquals, right)
    }

    pub fn gt(left: ExpressionBuilder, right: ExpressionBuilder) -> Self {
        Self::binary(left, Operator::GreaterThan, right)
    }

    pub fn gte(left: ExpressionBuilder, right: ExpressionBuilder) -> Self {
        Self::binary(left, Operator::GreaterThanOrEquals, right)
    }

    pub fn lt(left: ExpressionBuilder, right: ExpressionBuilder) -> Self {
        Self::binary(left, Operator::LessThan, right)
    }

    pub fn lte(left: ExpressionBuilder, right: ExpressionBuilder) -> Self {
        Self::binary(left, Operator::LessThanOrEquals, right)
    }

    pub fn like(left: ExpressionBuilder, right: ExpressionBuilder) -> Self {
        Self::binary(left, Operator::Like, right)
    }

    pub fn in_(left: ExpressionBuilder, right: ExpressionBuilder) -> Self {
        Self::binary(left, Operator::In, right)
    }

    // Logical

    pub fn and(left: ExpressionBuilder, right: ExpressionBuilder) -> Self {
        Self::binary(left, Operator::And, right)
    }

    pub fn or(left: ExpressionBuilder, right: ExpressionBuilder) -> Self {
        Self::binary(left, Operator::Or, right)
    }

    // Arithmetic

    pub fn plus(left: ExpressionBuilder, right: ExpressionBuilder) -> Self {
        Self::binary(left, Operator::Plus, right)
    }

    pub fn minus(left: ExpressionBuilder, right: ExpressionBuilder) -> Self {
        Self::binary(left, Operator::Minus, right)
    }

    pub fn multiply(left: ExpressionBuilder, right: ExpressionBuilder) -> Self {
        Self::binary(left, Operator::Multiply, right)
    }

    pub fn divide(left: ExpressionBuilder, right: ExpressionBuilder) -> Self {
        Self::binary(left, Operator::Divide, right)
    }

    // Shorthands: path <op> value

    pub fn eq_value(path: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::eq(Self::attr(path), Self::literal(value))
    }

    pub fn gt_value(path: impl Into<String>, value: impl Into<Literal>) -> Self {
        Self::gt(Self::attr(path), Self::literal(value))
    }

    // Aggregates

    pub fn count(operand: ExpressionBuilder) -> Self {
        Self::aggregate(operand, AggregateFunction::Count)
    }

    /// COUNT(*)
    pub fn count_all() -> Self {
        ExpressionBuilder::Aggregate {
            operand: None,
            function: AggregateFunction::Count,
        }
    }

    pub fn sum(operand: ExpressionBuilder) -> Self {
        Self::aggregate(operand, AggregateFunction::Sum)
    }

    pub fn avg(operand: ExpressionBuilder) -> Self {
        Self::aggregate(operand, AggregateFunction::Avg)
    }

    pub fn min(operand: ExpressionBuilder) -> Self {
        Self::aggregate(operand, AggregateFunction::Min)
    }

    pub fn max(operand: ExpressionBuilder) -> Self {
        Self::aggregate(operand, AggregateFunction::Max)
    }

    /// Resolve this tree into a validated [`Expr`] scoped to `root`.
    pub fn build(&self, registry: &DomainRegistry, root: &Domain) -> DomainResult<Expr> {
        match self {
            ExpressionBuilder::Attribute(path) => resolve_path(registry, root, path),
            ExpressionBuilder::Literal(literal) => Ok(Expr::Literal(literal.clone())),
            ExpressionBuilder::Binary { left, op, right } => Expr::binary(
                left.build(registry, root)?,
                *op,
                right.build(registry, root)?,
            ),
            ExpressionBuilder::Aggregate { operand, function } => {
                let operand = match operand {
                    Some(builder) => Some(builder.build(registry, root)?),
                    None => None,
                };
                Expr::aggregate(operand, *function)
            }
            ExpressionBuilder::Resolved(expr) => Ok(expr.clone()),
        }
    }
}
