//! Path resolution and the fluent query builder.

use crate::error::{DomainError, DomainResult};
use crate::expr::{Expr, ExpressionBuilder};

use super::domain::Domain;
use super::query::Query;
use super::registry::DomainRegistry;

/// Resolve a dotted attribute path against `root`.
///
/// `a.b.c` becomes `Compose(a, Compose(b, c))`: the outermost node is always
/// the first hop, so the generator can peel joins off from the outside in.
pub fn resolve_path(registry: &DomainRegistry, root: &Domain, path: &str) -> DomainResult<Expr> {
    let segments: Vec<&str> = path.split('.').collect();
    resolve_segments(registry, root, &segments)
}

fn resolve_segments(
    registry: &DomainRegistry,
    domain: &Domain,
    segments: &[&str],
) -> DomainResult<Expr> {
    let (name, rest) = match segments.split_first() {
        Some(split) => split,
        None => return Err(DomainError::unknown_attribute(domain.name(), "")),
    };

    let attribute = domain.attribute(name)?;
    log::trace!("resolved '{}' in domain '{}'", name, domain.name());
    let access = Expr::attribute(attribute.clone());
    if rest.is_empty() {
        return Ok(access);
    }

    let reference = attribute
        .as_reference()
        .ok_or_else(|| DomainError::NotAReference {
            domain: domain.name().to_string(),
            attribute: name.to_string(),
        })?;

    let composition = if reference.target() == domain.id() {
        resolve_segments(registry, domain, rest)?
    } else {
        let target = registry.domain(reference.target().as_str())?;
        resolve_segments(registry, target, rest)?
    };
    Expr::compose(access, composition)
}

/// Fluent builder for a [`Query`].
///
/// Every step validates eagerly; the first failure is kept and returned by
/// [`QueryBuilder::build`], later steps become no-ops.
///
/// ```ignore
/// let query = QueryBuilder::from(&registry, "employees", "person")
///     .select_as("employee", "first_name")
///     .select_as("employee_company_name", "works_for.name")
///     .where_(ExpressionBuilder::gt_value("salary", 50000))
///     .build()?;
/// ```
pub struct QueryBuilder<'a> {
    registry: &'a DomainRegistry,
    state: DomainResult<(&'a Domain, Query)>,
}

impl<'a> QueryBuilder<'a> {
    /// Start a query named `name` over the registered domain `domain`.
    pub fn from(registry: &'a DomainRegistry, name: &str, domain: &str) -> Self {
        let state = registry
            .domain(domain)
            .map(|source| (source, Query::new(name, source)));
        Self { registry, state }
    }

    /// Start a query over a domain that is not necessarily registered.
    pub fn over(registry: &'a DomainRegistry, name: &str, source: &'a Domain) -> Self {
        Self {
            registry,
            state: Ok((source, Query::new(name, source))),
        }
    }

    /// Select a path, aliased by its last segment.
    pub fn select(self, path: &str) -> Self {
        let alias = path.rsplit('.').next().unwrap_or(path).to_string();
        self.select_as(alias, path)
    }

    /// Select a path under an explicit alias.
    pub fn select_as(self, alias: impl Into<String>, path: &str) -> Self {
        let alias = alias.into();
        self.apply(|registry, source, query| {
            let expr = resolve_path(registry, source, path)?;
            query.add_projection(alias, expr)
        })
    }

    /// Select an expression under an explicit alias.
    pub fn select_expr(self, alias: impl Into<String>, builder: ExpressionBuilder) -> Self {
        let alias = alias.into();
        self.apply(|registry, source, query| {
            let expr = builder.build(registry, source)?;
            query.add_projection(alias, expr)
        })
    }

    /// AND a filter onto the query.
    pub fn where_(self, builder: ExpressionBuilder) -> Self {
        self.apply(|registry, source, query| {
            let expr = builder.build(registry, source)?;
            query.and_filter(expr)
        })
    }

    /// AND an already-resolved filter onto the query.
    pub fn where_expr(self, filter: Expr) -> Self {
        self.apply(|_, _, query| query.and_filter(filter))
    }

    pub fn build(self) -> DomainResult<Query> {
        self.state.map(|(_, query)| query)
    }

    fn apply<F>(mut self, step: F) -> Self
    where
        F: FnOnce(&DomainRegistry, &Domain, &mut Query) -> DomainResult<()>,
    {
        if let Ok((source, query)) = &mut self.state {
            if let Err(err) = step(self.registry, *source, query) {
                self.state = Err(err);
            }
        }
        self
    }
}
