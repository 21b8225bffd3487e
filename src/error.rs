//! Error types for model construction, query building and SQL generation.
//!
//! Construction-time variants (everything except [`DomainError::AmbiguousContext`]
//! and [`DomainError::Unsupported`]) are raised eagerly while a model or query is
//! assembled. The two generation-time variants indicate that a construction
//! invariant was bypassed and should be treated as bugs.

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Broad classification of a [`DomainError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    TypeMismatch,
    StructuralInvalid,
    AmbiguousContext,
    UnsupportedConstruct,
}

/// Errors raised by the domain model, the query builders and the SQL generator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DomainError {
    /// Referenced a domain that is not registered.
    #[error("Domain '{0}' not found")]
    UnknownDomain(String),

    /// Referenced an attribute that doesn't exist on a domain.
    #[error("Attribute '{attribute}' not found in domain '{domain}'")]
    UnknownAttribute { domain: String, attribute: String },

    /// Referenced a column that doesn't exist in a physical table.
    #[error("Column '{column}' not found in table '{table}'")]
    UnknownColumn { table: String, column: String },

    /// An operand or condition has the wrong type.
    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    /// A literal value kind that has no scalar type.
    #[error("Unsupported literal value: {0}")]
    UnsupportedLiteral(String),

    /// A non-terminal path segment is not a reference attribute.
    #[error("Attribute '{attribute}' in domain '{domain}' must be a reference attribute")]
    NotAReference { domain: String, attribute: String },

    /// Compose expression whose reference and composition don't line up.
    #[error("Invalid composition: {0}")]
    InvalidComposition(String),

    /// Join condition that does not pair the declared domains.
    #[error("Invalid join condition from '{owner}' to '{target}': {reason}")]
    InvalidJoinCondition {
        owner: String,
        target: String,
        reason: String,
    },

    /// Two operand sources that cannot be combined.
    #[error("Incompatible expression sources: {0}")]
    IncompatibleSources(String),

    /// Projection scoped to a domain other than the query source.
    #[error("Invalid projection '{alias}' in query '{query}': {reason}")]
    InvalidProjection {
        query: String,
        alias: String,
        reason: String,
    },

    /// A DEFAULT-tagged attribute that does not match exactly one side of a join.
    #[error(
        "Attribute '{attribute}' of domain '{domain}' does not match exactly one side of the join ('{left}', '{right}')"
    )]
    AmbiguousContext {
        attribute: String,
        domain: String,
        left: String,
        right: String,
    },

    /// An expression shape the SQL generator cannot render.
    #[error("Unsupported construct: {0}")]
    Unsupported(String),
}

impl DomainError {
    /// Create an unknown-attribute error.
    pub fn unknown_attribute(domain: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self::UnknownAttribute {
            domain: domain.into(),
            attribute: attribute.into(),
        }
    }

    /// Create an invalid-join-condition error.
    pub fn invalid_join(
        owner: impl Into<String>,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidJoinCondition {
            owner: owner.into(),
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::UnknownDomain(_)
            | DomainError::UnknownAttribute { .. }
            | DomainError::UnknownColumn { .. } => ErrorKind::NotFound,
            DomainError::TypeMismatch(_) | DomainError::UnsupportedLiteral(_) => {
                ErrorKind::TypeMismatch
            }
            DomainError::NotAReference { .. }
            | DomainError::InvalidComposition(_)
            | DomainError::InvalidJoinCondition { .. }
            | DomainError::IncompatibleSources(_)
            | DomainError::InvalidProjection { .. } => ErrorKind::StructuralInvalid,
            DomainError::AmbiguousContext { .. } => ErrorKind::AmbiguousContext,
            DomainError::Unsupported(_) => ErrorKind::UnsupportedConstruct,
        }
    }

    /// Is this a generation-time error (a bypassed construction invariant)?
    pub fn is_internal(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::AmbiguousContext | ErrorKind::UnsupportedConstruct
        )
    }
}
