//! Physical schema model: tables, columns and foreign keys.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::ScalarType;

/// Declared column type family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    Char,
    Varchar,
    LongVarchar,
    Text,
    SmallInt,
    Integer,
    BigInt,
    Decimal,
    Numeric,
    Real,
    Float,
    Double,
    Boolean,
    Date,
    Timestamp,
    DateTime,
    Other(String),
}

impl SqlType {
    /// Parse a declared type name such as `VARCHAR(255)` or `numeric(10, 2)`.
    pub fn parse(declared: &str) -> Self {
        let upper = declared.trim().to_ascii_uppercase();
        let base = upper
            .split(|c: char| c == '(' || c.is_whitespace())
            .next()
            .unwrap_or("");
        match base {
            "CHAR" | "CHARACTER" | "NCHAR" => SqlType::Char,
            "VARCHAR" | "NVARCHAR" | "VARCHAR2" => SqlType::Varchar,
            "LONGVARCHAR" | "CLOB" => SqlType::LongVarchar,
            "TEXT" => SqlType::Text,
            "SMALLINT" | "TINYINT" => SqlType::SmallInt,
            "INT" | "INTEGER" | "MEDIUMINT" => SqlType::Integer,
            "BIGINT" => SqlType::BigInt,
            "DECIMAL" => SqlType::Decimal,
            "NUMERIC" => SqlType::Numeric,
            "REAL" => SqlType::Real,
            "FLOAT" => SqlType::Float,
            "DOUBLE" => SqlType::Double,
            "BOOLEAN" | "BOOL" => SqlType::Boolean,
            "DATE" => SqlType::Date,
            "TIMESTAMP" => SqlType::Timestamp,
            "DATETIME" => SqlType::DateTime,
            _ => SqlType::Other(declared.trim().to_string()),
        }
    }

    /// Scalar type an attribute over this column gets. Unknown types map to
    /// STRING.
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            SqlType::Char | SqlType::Varchar | SqlType::LongVarchar | SqlType::Text => {
                ScalarType::String
            }
            SqlType::SmallInt | SqlType::Integer | SqlType::BigInt => ScalarType::Integer,
            SqlType::Decimal
            | SqlType::Numeric
            | SqlType::Real
            | SqlType::Float
            | SqlType::Double => ScalarType::Decimal,
            SqlType::Boolean => ScalarType::Boolean,
            SqlType::Date => ScalarType::Date,
            SqlType::Timestamp | SqlType::DateTime => ScalarType::Timestamp,
            SqlType::Other(_) => ScalarType::String,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlType::Other(name) => f.write_str(name),
            other => write!(f, "{:?}", other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub sql_type: SqlType,
}

impl Column {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    #[serde(default)]
    pub schema: Option<String>,
    pub name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
            columns: Vec::new(),
        }
    }

    pub fn with_column(mut self, name: impl Into<String>, sql_type: SqlType) -> Self {
        self.columns.push(Column::new(name, sql_type));
        self
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// `(source column, target column)`
pub type ColumnPair = (String, String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub source_table: String,
    pub target_table: String,
    pub column_pairs: Vec<ColumnPair>,
}

impl ForeignKey {
    pub fn new(source_table: impl Into<String>, target_table: impl Into<String>) -> Self {
        Self {
            source_table: source_table.into(),
            target_table: target_table.into(),
            column_pairs: Vec::new(),
        }
    }

    pub fn with_pair(mut self, source: impl Into<String>, target: impl Into<String>) -> Self {
        self.column_pairs.push((source.into(), target.into()));
        self
    }

    pub fn is_self_reference(&self) -> bool {
        self.source_table == self.target_table
    }
}

/// A database catalog snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaModel {
    pub tables: Vec<Table>,
    pub foreign_keys: Vec<ForeignKey>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }
}
