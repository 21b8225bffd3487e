//! Schema → domain graph mapping.
//!
//! Every table becomes a domain, every column a mapped attribute and every
//! foreign key a reference attribute whose join condition ANDs one equality
//! per column pair.

use std::collections::HashMap;
use std::sync::Arc;

use inflector::Inflector;
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::expr::{ContextResolution, Expr};
use crate::model::{Attribute, Domain, DomainChange, DomainChangeSet, DomainRegistry, Relation};
use crate::types::{DomainId, Operator};

use super::schema::{ForeignKey, SchemaModel};

/// How physical names become model names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Naming {
    /// `order_items` → `orderItems`
    #[default]
    CamelCase,
    /// Keep the physical name.
    Preserve,
}

impl Naming {
    pub fn apply(&self, name: &str) -> String {
        match self {
            Naming::CamelCase => name.to_camel_case(),
            Naming::Preserve => name.to_string(),
        }
    }
}

/// Options for [`ingest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    pub domain_naming: Naming,
    pub attribute_naming: Naming,
    /// Also record a registry-level relation per foreign key.
    pub register_relations: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            domain_naming: Naming::CamelCase,
            attribute_naming: Naming::CamelCase,
            register_relations: true,
        }
    }
}

/// Physical table → (domain name, column → attribute name).
type NameMap = HashMap<String, (String, HashMap<String, String>)>;

/// Populate `registry` from `schema`, returning the applied changes in order.
///
/// Changes are staged on a copy of the registry. On error `registry` is left
/// exactly as it was.
pub fn ingest(
    schema: &SchemaModel,
    registry: &mut DomainRegistry,
    options: &IngestOptions,
) -> DomainResult<DomainChangeSet> {
    let mut staged = registry.clone();
    let changes = stage(schema, &mut staged, options)?;
    *registry = staged;
    Ok(changes)
}

fn stage(
    schema: &SchemaModel,
    registry: &mut DomainRegistry,
    options: &IngestOptions,
) -> DomainResult<DomainChangeSet> {
    let mut changes = DomainChangeSet::new();
    let mut names: NameMap = HashMap::new();

    for table in &schema.tables {
        let domain_name = options.domain_naming.apply(&table.name);
        let mut domain = Domain::new(domain_name.clone()).with_table(table.name.clone());
        changes.push(DomainChange::AddDomain {
            domain: domain_name.clone(),
            table: table.name.clone(),
        });

        let mut columns = HashMap::new();
        for column in &table.columns {
            let attribute = options.attribute_naming.apply(&column.name);
            domain.add_mapped_attribute(
                attribute.clone(),
                column.name.clone(),
                column.sql_type.scalar_type(),
            );
            changes.push(DomainChange::AddAttribute {
                domain: domain_name.clone(),
                attribute: attribute.clone(),
            });
            columns.insert(column.name.clone(), attribute);
        }

        registry.register(domain);
        names.insert(table.name.clone(), (domain_name, columns));
    }

    let mut references = 0;
    for foreign_key in &schema.foreign_keys {
        if foreign_key.column_pairs.is_empty() {
            log::warn!(
                "skipping foreign key {} -> {} without columns",
                foreign_key.source_table,
                foreign_key.target_table
            );
            continue;
        }
        let (Some(source), Some(target)) = (
            names.get(&foreign_key.source_table),
            names.get(&foreign_key.target_table),
        ) else {
            log::warn!(
                "skipping foreign key {} -> {}: table not in schema",
                foreign_key.source_table,
                foreign_key.target_table
            );
            continue;
        };

        let condition = join_condition(registry, foreign_key, source, target)?;
        let source_id = DomainId::new(source.0.clone());
        let target_id = DomainId::new(target.0.clone());
        let target_table = registry.domain(&target.0)?.table().to_string();

        let domain = registry.domain_mut(&source.0)?;
        let name = reference_name(domain, foreign_key, &target.0, options.attribute_naming);
        domain.add_reference_with_condition(
            name.clone(),
            target_id.clone(),
            target_table,
            condition.clone(),
        )?;
        changes.push(DomainChange::AddReference {
            domain: source.0.clone(),
            reference: name,
            target: target.0.clone(),
        });
        references += 1;

        if options.register_relations {
            registry.register_relation(Relation::new(source_id, target_id, condition)?)?;
            changes.push(DomainChange::AddRelation {
                left: source.0.clone(),
                right: target.0.clone(),
            });
        }
    }

    log::info!(
        "ingested {} table(s) and {} reference(s)",
        schema.tables.len(),
        references
    );
    Ok(changes)
}

/// `source.a = target.x AND source.b = target.y ...`
///
/// Self-referencing keys tag the two sides LEFT and RIGHT.
fn join_condition(
    registry: &DomainRegistry,
    foreign_key: &ForeignKey,
    source: &(String, HashMap<String, String>),
    target: &(String, HashMap<String, String>),
) -> DomainResult<Expr> {
    let (left_tag, right_tag) = if foreign_key.is_self_reference() {
        (ContextResolution::Left, ContextResolution::Right)
    } else {
        (ContextResolution::Default, ContextResolution::Default)
    };
    let source_domain = registry.domain(&source.0)?;
    let target_domain = registry.domain(&target.0)?;

    let mut condition: Option<Expr> = None;
    for (source_column, target_column) in &foreign_key.column_pairs {
        let left = column_attribute(
            source_domain,
            &source.1,
            &foreign_key.source_table,
            source_column,
        )?;
        let right = column_attribute(
            target_domain,
            &target.1,
            &foreign_key.target_table,
            target_column,
        )?;
        let equality = Expr::binary(
            Expr::attribute_in(left, left_tag),
            Operator::Equals,
            Expr::attribute_in(right, right_tag),
        )?;
        condition = Some(match condition {
            Some(existing) => existing.and(equality)?,
            None => equality,
        });
    }

    condition.ok_or_else(|| {
        DomainError::invalid_join(&source.0, &target.0, "foreign key has no columns")
    })
}

fn column_attribute(
    domain: &Domain,
    columns: &HashMap<String, String>,
    table: &str,
    column: &str,
) -> DomainResult<Arc<Attribute>> {
    let attribute = columns
        .get(column)
        .ok_or_else(|| DomainError::UnknownColumn {
            table: table.to_string(),
            column: column.to_string(),
        })?;
    Ok(Arc::clone(domain.attribute(attribute)?))
}

/// `manager_id` → `manager`; otherwise the target domain name. Names already
/// taken on the source domain get `Ref` appended.
fn reference_name(domain: &Domain, foreign_key: &ForeignKey, target: &str, naming: Naming) -> String {
    let stem = match foreign_key.column_pairs.as_slice() {
        [(column, _)] => column
            .strip_suffix("_id")
            .or_else(|| column.strip_suffix("_ID"))
            .filter(|stem| !stem.is_empty()),
        _ => None,
    };
    let mut name = match stem {
        Some(stem) => naming.apply(stem),
        None => target.to_string(),
    };
    while domain.has_attribute(&name) {
        name.push_str("Ref");
    }
    name
}
