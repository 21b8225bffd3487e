//! SQL generation.
//!
//! - [`path`] - join identity ([`DomainPath`]) and alias allocation ([`JoinContext`])
//! - [`generator`] - query to SQL text
//!
//! The output is a single textual target: one space before `FROM`, `JOIN`,
//! `WHERE`, `GROUP BY`, `AS` and every binary operator, parenthesized binary
//! expressions, and `, `-separated lists.

pub mod generator;
pub mod path;


pub use generator::{generate_sql, SqlGenerator};
pub use path::{DomainPath, JoinContext};
