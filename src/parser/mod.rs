//! JSON query descriptors.
//!
//! A descriptor names a source domain, a list of aliased projections and an
//! optional filter:
//!
//! ```json
//! {
//!   "name": "wellPaid",
//!   "from": "person",
//!   "select": [
//!     { "alias": "employee", "expression": { "type": "attribute", "path": "first_name" } }
//!   ],
//!   "where": {
//!     "type": "binary",
//!     "operator": "GREATER_THAN",
//!     "left": { "type": "attribute", "path": "salary" },
//!     "right": { "type": "literal", "value": 50000 }
//!   }
//! }
//! ```
//!
//! Descriptors are turned into [`ExpressionBuilder`] trees and fed through
//! [`QueryBuilder`], so every model check applies.

use serde::Deserialize;
use serde_json::Value;

use crate::error::DomainError;
use crate::expr::{ExpressionBuilder, Literal};
use crate::model::{DomainRegistry, Query, QueryBuilder};
use crate::types::{AggregateFunction, Operator};

/// Error type for query descriptor parsing.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid query descriptor: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

pub type ParseResult<T> = Result<T, ParseError>;

/// Top-level query descriptor. Unknown fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryDescriptor {
    pub name: String,
    pub from: String,
    #[serde(default)]
    pub select: Vec<ProjectionDescriptor>,
    #[serde(default, rename = "where")]
    pub filter: Option<ExpressionDescriptor>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectionDescriptor {
    pub alias: String,
    pub expression: ExpressionDescriptor,
}

/// Expression descriptor, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ExpressionDescriptor {
    Attribute {
        path: String,
    },
    Literal {
        value: Value,
    },
    Binary {
        operator: Operator,
        left: Box<ExpressionDescriptor>,
        right: Box<ExpressionDescriptor>,
    },
    Aggregate {
        function: AggregateFunction,
        #[serde(default)]
        operand: Option<Box<ExpressionDescriptor>>,
    },
}

impl ExpressionDescriptor {
    /// Convert into an unresolved expression tree.
    pub fn to_builder(&self) -> ParseResult<ExpressionBuilder> {
        Ok(match self {
            ExpressionDescriptor::Attribute { path } => ExpressionBuilder::attr(path.clone()),
            ExpressionDescriptor::Literal { value } => {
                ExpressionBuilder::Literal(Literal::from_json(value)?)
            }
            ExpressionDescriptor::Binary {
                operator,
                left,
                right,
            } => ExpressionBuilder::binary(left.to_builder()?, *operator, right.to_builder()?),
            ExpressionDescriptor::Aggregate { function, operand } => {
                let operand = match operand {
                    Some(operand) => Some(Box::new(operand.to_builder()?)),
                    None => None,
                };
                ExpressionBuilder::Aggregate {
                    operand,
                    function: *function,
                }
            }
        })
    }
}

/// Parses JSON query descriptors against a registry.
pub struct QueryParser<'a> {
    registry: &'a DomainRegistry,
}

impl<'a> QueryParser<'a> {
    pub fn new(registry: &'a DomainRegistry) -> Self {
        Self { registry }
    }

    /// Parse a descriptor from JSON text and build the query.
    pub fn parse_query(&self, json: &str) -> ParseResult<Query> {
        let descriptor: QueryDescriptor = serde_json::from_str(json)?;
        self.build(&descriptor)
    }

    /// Parse a descriptor from an already-decoded JSON value.
    pub fn parse_value(&self, value: Value) -> ParseResult<Query> {
        let descriptor: QueryDescriptor = serde_json::from_value(value)?;
        self.build(&descriptor)
    }

    /// Build a query from a decoded descriptor.
    pub fn build(&self, descriptor: &QueryDescriptor) -> ParseResult<Query> {
        log::trace!(
            "building query '{}' over '{}'",
            descriptor.name,
            descriptor.from
        );
        let mut builder = QueryBuilder::from(self.registry, &descriptor.name, &descriptor.from);
        for projection in &descriptor.select {
            builder = builder.select_expr(
                projection.alias.clone(),
                projection.expression.to_builder()?,
            );
        }
        if let Some(filter) = &descriptor.filter {
            builder = builder.where_(filter.to_builder()?);
        }
        Ok(builder.build()?)
    }
}
