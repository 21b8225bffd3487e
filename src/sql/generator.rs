//! Query → SQL text.
//!
//! Generation walks every projection and the filter, registering each
//! navigation path in a [`JoinContext`] the first time it is used. The
//! FROM/JOIN clause is emitted last, from the context, so join order follows
//! first textual use and each distinct path is joined exactly once.

use std::rc::Rc;
use std::sync::Arc;

use crate::error::{DomainError, DomainResult};
use crate::expr::{AttributeExpr, ContextResolution, Expr, Literal};
use crate::model::{Attribute, AttributeKind, Query};
use crate::types::DomainId;

use super::path::{DomainPath, JoinContext};

/// Generate SQL for `query`.
pub fn generate_sql(query: &Query) -> DomainResult<String> {
    let mut subqueries = 0;
    SqlGenerator::new(query, &mut subqueries).generate()
}

/// Where attribute accesses resolve to.
#[derive(Clone, Copy)]
enum PathScope<'p> {
    /// Everything resolves to one path.
    Scoped(&'p Rc<DomainPath>),
    /// Inside a join condition: LEFT is the parent, RIGHT the joined child.
    Join {
        parent: &'p Rc<DomainPath>,
        child: &'p Rc<DomainPath>,
    },
}

/// Single-statement SQL generator.
///
/// The join context is private to one generator. The subquery counter is
/// shared with nested generators so `sqN` aliases stay unique per statement.
pub struct SqlGenerator<'q, 'c> {
    query: &'q Query,
    joins: JoinContext,
    subqueries: &'c mut usize,
}

impl<'q, 'c> SqlGenerator<'q, 'c> {
    pub fn new(query: &'q Query, subqueries: &'c mut usize) -> Self {
        Self {
            query,
            joins: JoinContext::new(),
            subqueries,
        }
    }

    pub fn generate(mut self) -> DomainResult<String> {
        let query = self.query;
        let root = DomainPath::root(query.source_domain().clone(), query.source_table());
        self.joins.get_or_create_alias(&root);

        let select = if query.projections().is_empty() {
            "*".to_string()
        } else {
            let mut columns = Vec::with_capacity(query.projections().len());
            for projection in query.projections() {
                let rendered = self.render(projection.expr(), PathScope::Scoped(&root))?;
                columns.push(format!("{} AS {}", rendered, projection.alias()));
            }
            columns.join(", ")
        };

        let filter = match query.filter() {
            Some(filter) => Some(self.render(filter, PathScope::Scoped(&root))?),
            None => None,
        };

        let has_aggregate = query.projections().iter().any(|p| p.is_aggregate());
        let has_plain = query.projections().iter().any(|p| !p.is_aggregate());
        let group_by = if has_aggregate && has_plain {
            let mut terms = Vec::new();
            for projection in query.projections().iter().filter(|p| !p.is_aggregate()) {
                terms.push(self.render(projection.expr(), PathScope::Scoped(&root))?);
            }
            Some(terms.join(", "))
        } else {
            None
        };

        let from = self.render_from()?;

        let mut sql = format!("SELECT {}{}", select, from);
        if let Some(filter) = filter {
            sql.push_str(" WHERE ");
            sql.push_str(&filter);
        }
        if let Some(group_by) = group_by {
            sql.push_str(" GROUP BY ");
            sql.push_str(&group_by);
        }

        log::debug!(
            "generated query '{}' with {} join(s): {}",
            query.name(),
            self.joins.len().saturating_sub(1),
            sql
        );
        Ok(sql)
    }

    // =========================================================================
    // FROM / JOIN
    // =========================================================================

    /// Emit bindings in registration order. Rendering a join condition may
    /// register further paths; they are emitted after the current one.
    fn render_from(&mut self) -> DomainResult<String> {
        let mut from = String::new();
        let mut position = 0;
        while let Some((path, alias)) = self.joins.get(position) {
            let path = Rc::clone(path);
            let alias = alias.to_string();
            position += 1;

            match (path.parent(), path.reference_attribute()) {
                (Some(parent), Some(reference)) => {
                    let parent = Rc::clone(parent);
                    let condition = self.render(
                        reference.join_condition(),
                        PathScope::Join {
                            parent: &parent,
                            child: &path,
                        },
                    )?;
                    from.push_str(&format!(
                        " JOIN {} AS {} ON {}",
                        path.table(),
                        alias,
                        condition
                    ));
                }
                _ => {
                    from.push_str(" FROM ");
                    from.push_str(path.table());
                    if alias != path.table() {
                        from.push_str(" AS ");
                        from.push_str(&alias);
                    }
                }
            }
        }
        Ok(from)
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn render(&mut self, expr: &Expr, scope: PathScope<'_>) -> DomainResult<String> {
        match expr {
            Expr::Literal(literal) => render_literal(literal),
            Expr::Attribute(access) => {
                let path = resolve_access(access, scope)?;
                self.render_attribute(access.attribute(), &path)
            }
            Expr::Compose(compose) => {
                let path = self.navigate(compose.reference(), scope)?;
                self.render(compose.composition(), PathScope::Scoped(&path))
            }
            Expr::Binary(binary) => {
                let left = self.render(binary.left(), scope)?;
                let right = self.render(binary.right(), scope)?;
                Ok(format!("({} {} {})", left, binary.op().symbol(), right))
            }
            Expr::Aggregate(aggregate) => {
                let operand = match aggregate.operand() {
                    Some(operand) => self.render(operand, scope)?,
                    None => "*".to_string(),
                };
                Ok(format!("{}({})", aggregate.function().name(), operand))
            }
            Expr::Mapping(mapping) => {
                let path = resolve_domain(
                    mapping.domain(),
                    mapping.name(),
                    ContextResolution::Default,
                    scope,
                )?;
                let alias = self.joins.get_or_create_alias(&path);
                Ok(format!("{}.{}", alias, mapping.name()))
            }
            Expr::Query(nested) => {
                *self.subqueries += 1;
                let number = *self.subqueries;
                let sql = SqlGenerator::new(nested.query(), &mut *self.subqueries).generate()?;
                Ok(format!("({}) AS sq{}", sql, number))
            }
        }
    }

    /// Render a terminal attribute access at `path`.
    fn render_attribute(
        &mut self,
        attribute: &Attribute,
        path: &Rc<DomainPath>,
    ) -> DomainResult<String> {
        match attribute.kind() {
            AttributeKind::Plain {
                definition: Expr::Mapping(mapping),
            } => {
                let alias = self.joins.get_or_create_alias(path);
                Ok(format!("{}.{}", alias, mapping.name()))
            }
            // Calculated attributes are inlined at the access path.
            AttributeKind::Plain { definition } => self.render(definition, PathScope::Scoped(path)),
            AttributeKind::Reference(_) => Err(DomainError::Unsupported(format!(
                "reference attribute '{}.{}' cannot be rendered as a value",
                attribute.domain(),
                attribute.name()
            ))),
        }
    }

    /// Register the join for a navigation step and return the reached path.
    fn navigate(&mut self, reference: &Expr, scope: PathScope<'_>) -> DomainResult<Rc<DomainPath>> {
        match reference {
            Expr::Attribute(access) => {
                let base = resolve_access(access, scope)?;
                let path = DomainPath::child(&base, Arc::clone(access.attribute()))?;
                self.joins.get_or_create_alias(&path);
                Ok(path)
            }
            // (a → b) → c: reach b's target first, then follow c from there.
            Expr::Compose(compose) => {
                let inner = self.navigate(compose.reference(), scope)?;
                self.navigate(compose.composition(), PathScope::Scoped(&inner))
            }
            other => Err(DomainError::Unsupported(format!(
                "cannot navigate through {} expression",
                other.expr_type()
            ))),
        }
    }
}

/// Path an attribute access resolves to in `scope`.
fn resolve_access(access: &AttributeExpr, scope: PathScope<'_>) -> DomainResult<Rc<DomainPath>> {
    let attribute = access.attribute();
    resolve_domain(attribute.domain(), attribute.name(), access.context(), scope)
}

fn resolve_domain(
    domain: &DomainId,
    name: &str,
    context: ContextResolution,
    scope: PathScope<'_>,
) -> DomainResult<Rc<DomainPath>> {
    match scope {
        PathScope::Scoped(path) => Ok(Rc::clone(path)),
        PathScope::Join { parent, child } => match context {
            ContextResolution::Left => Ok(Rc::clone(parent)),
            ContextResolution::Right => Ok(Rc::clone(child)),
            ContextResolution::Default => {
                let left = parent.domain() == domain;
                let right = child.domain() == domain;
                match (left, right) {
                    (true, false) => Ok(Rc::clone(parent)),
                    (false, true) => Ok(Rc::clone(child)),
                    _ => Err(DomainError::AmbiguousContext {
                        attribute: name.to_string(),
                        domain: domain.to_string(),
                        left: parent.domain().to_string(),
                        right: child.domain().to_string(),
                    }),
                }
            }
        },
    }
}

fn render_literal(literal: &Literal) -> DomainResult<String> {
    Ok(match literal {
        Literal::String(s) => format!("'{}'", s.replace('\'', "''")),
        Literal::Integer(n) => n.to_string(),
        Literal::Decimal(f) => {
            if !f.is_finite() {
                return Err(DomainError::Unsupported(format!(
                    "non-finite decimal literal {}",
                    f
                )));
            }
            let mut buffer = ryu::Buffer::new();
            buffer.format(*f).to_string()
        }
        Literal::Boolean(b) => b.to_string(),
        Literal::Date(date) => format!("to_date('{}', 'YYYY-MM-DD')", date.format("%Y-%m-%d")),
        Literal::Timestamp(ts) => format!(
            "to_timestamp('{}', 'YYYY-MM-DD HH24:MI:SS')",
            ts.format("%Y-%m-%d %H:%M:%S")
        ),
    })
}
