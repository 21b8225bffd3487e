//! Queries: projections and a filter over one source domain.
//!
//! A [`Query`] is itself a domain: every projection adds a matching synthetic
//! attribute, so a built query can be navigated or nested like any other
//! domain.

use crate::error::{DomainError, DomainResult};
use crate::expr::Expr;
use crate::types::{DomainId, DomainType, ExpressionType, SourceType};

use super::attribute::Attribute;
use super::domain::Domain;

/// An aliased output expression.
#[derive(Debug, Clone)]
pub struct Projection {
    alias: String,
    expr: Expr,
}

impl Projection {
    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// Does this projection compute an aggregate?
    pub fn is_aggregate(&self) -> bool {
        self.expr.expr_type().is_aggregate()
    }
}

#[derive(Debug, Clone)]
pub struct Query {
    /// Synthetic domain exposing one attribute per projection.
    domain: Domain,
    source: DomainId,
    source_table: String,
    projections: Vec<Projection>,
    filter: Option<Expr>,
}

impl Query {
    pub fn new(name: impl Into<String>, source: &Domain) -> Self {
        Self {
            domain: Domain::new(name),
            source: source.id().clone(),
            source_table: source.table().to_string(),
            projections: Vec::new(),
            filter: None,
        }
    }

    pub fn name(&self) -> &str {
        self.domain.name()
    }

    pub fn source_domain(&self) -> &DomainId {
        &self.source
    }

    /// Physical table of the source domain.
    pub fn source_table(&self) -> &str {
        &self.source_table
    }

    /// Projections in declaration order.
    pub fn projections(&self) -> &[Projection] {
        &self.projections
    }

    pub fn filter(&self) -> Option<&Expr> {
        self.filter.as_ref()
    }

    /// This query viewed as a domain.
    pub fn as_domain(&self) -> &Domain {
        &self.domain
    }

    pub fn domain_type(&self) -> DomainType {
        self.domain.domain_type()
    }

    /// Add a projection under `alias`.
    ///
    /// The expression must be constant or scoped to the source domain.
    /// Re-using an alias replaces the expression but keeps its column position.
    pub fn add_projection(&mut self, alias: impl Into<String>, expr: Expr) -> DomainResult<()> {
        let alias = alias.into();
        if let Err(reason) = self.check_scope(&expr) {
            return Err(DomainError::InvalidProjection {
                query: self.name().to_string(),
                alias,
                reason,
            });
        }

        self.domain.insert(Attribute::mapped(
            self.domain.id().clone(),
            alias.clone(),
            alias.clone(),
            expr.expr_type(),
        ));

        match self.projections.iter_mut().find(|p| p.alias == alias) {
            Some(existing) => existing.expr = expr,
            None => self.projections.push(Projection { alias, expr }),
        }
        Ok(())
    }

    /// Replace the filter.
    pub fn set_filter(&mut self, filter: Expr) -> DomainResult<()> {
        let ty = filter.expr_type();
        if ty != ExpressionType::BOOLEAN {
            return Err(DomainError::TypeMismatch(format!(
                "filter of query '{}' must be BOOLEAN, got {}",
                self.name(),
                ty
            )));
        }
        self.check_scope(&filter).map_err(|reason| {
            DomainError::IncompatibleSources(format!(
                "filter of query '{}': {}",
                self.name(),
                reason
            ))
        })?;
        self.filter = Some(filter);
        Ok(())
    }

    /// AND `filter` onto the current filter, or set it if there is none.
    pub fn and_filter(&mut self, filter: Expr) -> DomainResult<()> {
        let combined = match &self.filter {
            Some(existing) => existing.clone().and(filter)?,
            None => filter,
        };
        self.set_filter(combined)
    }

    fn check_scope(&self, expr: &Expr) -> Result<(), String> {
        let source = enclosing_source(expr).map_err(|err| err.to_string())?;
        match source {
            None => Ok(()),
            Some(SourceType::Domain(domain)) if domain.domain() == &self.source => Ok(()),
            Some(other) => Err(format!(
                "expression is scoped to {}, expected {}",
                other,
                DomainType::new(self.source.clone())
            )),
        }
    }
}

/// Source of `expr` as seen by the enclosing query.
///
/// A nested query is a closed sub-relation and contributes no scope.
fn enclosing_source(expr: &Expr) -> DomainResult<Option<SourceType>> {
    match expr {
        Expr::Query(_) => Ok(None),
        Expr::Binary(binary) => SourceType::union(
            enclosing_source(binary.left())?.as_ref(),
            enclosing_source(binary.right())?.as_ref(),
        ),
        Expr::Aggregate(aggregate) => match aggregate.operand() {
            Some(operand) => enclosing_source(operand),
            None => Ok(None),
        },
        other => Ok(other.source()),
    }
}
