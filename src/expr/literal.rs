//! Literal values and their scalar type inference.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::error::{DomainError, DomainResult};
use crate::types::ScalarType;

/// A constant value.
///
/// The scalar type of a literal is inferred from the kind of value it holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
}

impl Literal {
    pub fn scalar_type(&self) -> ScalarType {
        match self {
            Literal::String(_) => ScalarType::String,
            Literal::Integer(_) => ScalarType::Integer,
            Literal::Decimal(_) => ScalarType::Decimal,
            Literal::Boolean(_) => ScalarType::Boolean,
            Literal::Date(_) => ScalarType::Date,
            Literal::Timestamp(_) => ScalarType::Timestamp,
        }
    }

    /// Convert a JSON value into a literal.
    ///
    /// Integral numbers become INTEGER, other numbers DECIMAL. `null`, arrays
    /// and objects have no scalar type and are rejected.
    pub fn from_json(value: &Value) -> DomainResult<Self> {
        match value {
            Value::String(s) => Ok(Literal::String(s.clone())),
            Value::Bool(b) => Ok(Literal::Boolean(*b)),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Ok(Literal::Integer(i))
                } else if let Some(f) = n.as_f64() {
                    Ok(Literal::Decimal(f))
                } else {
                    Err(DomainError::UnsupportedLiteral(n.to_string()))
                }
            }
            Value::Null | Value::Array(_) | Value::Object(_) => {
                Err(DomainError::UnsupportedLiteral(value.to_string()))
            }
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Literal::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Literal::String(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Literal::Integer(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Literal::Integer(value.into())
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Literal::Decimal(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Literal::Boolean(value)
    }
}

impl From<NaiveDate> for Literal {
    fn from(value: NaiveDate) -> Self {
        Literal::Date(value)
    }
}

impl From<NaiveDateTime> for Literal {
    fn from(value: NaiveDateTime) -> Self {
        Literal::Timestamp(value)
    }
}
