//! Error types for the dialect layer.
//!
//! [`QueryError`] is what every public operation returns. Failures raised by
//! the execution collaborator are carried as [`ExecutionError`] and surface
//! unchanged through [`QueryError::Execution`]; nothing in this crate retries.

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for dialect, templating and paging operations.
#[derive(Error, Debug)]
pub enum QueryError {
    /// The configured database is neither PostgreSQL nor MySQL.
    ///
    /// This is a configuration error; callers treat it as fatal.
    #[error("unsupported database dialect: {value}")]
    UnsupportedDialect { value: String },

    /// A collaborator could not resolve the referenced entity.
    #[error("{entity} not found: {id}")]
    EntityNotFound { entity: String, id: String },

    /// The execution collaborator failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),

    /// A template placeholder has no entry in the parameter map.
    #[error("template placeholder '{name}' has no bound parameter")]
    MalformedTemplate { name: String },

    /// Date bucket unit outside minute/hour/day/month/year.
    #[error("invalid date unit: {unit}")]
    InvalidDateUnit { unit: String },

    /// Sort column is not a plain (optionally qualified) identifier.
    #[error("invalid order by column: {column}")]
    InvalidOrderBy { column: String },

    /// The timezone could not be converted to a UTC offset.
    #[error("unknown timezone: {zone}")]
    UnknownTimezone { zone: String },

    /// Structured criteria reference something the entity does not have.
    #[error("invalid criteria: {message}")]
    InvalidCriteria { message: String },
}

/// Errors originating from the execution collaborator.
#[derive(Error, Debug)]
pub enum ExecutionError {
    /// Connection to the database failed.
    #[error("connection failed to {backend_name}: {message}")]
    ConnectionFailed {
        backend_name: String,
        message: String,
    },

    /// The statement was rejected or failed while running.
    #[error("query execution failed: {message}")]
    Query { message: String },

    /// A returned value could not be decoded.
    #[error("failed to decode column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Internal backend error.
    #[error("internal error in {backend_name}: {message}")]
    Internal {
        backend_name: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl QueryError {
    /// Creates an [`QueryError::EntityNotFound`] for a website id.
    pub fn website_not_found(id: impl ToString) -> Self {
        QueryError::EntityNotFound {
            entity: "website".to_string(),
            id: id.to_string(),
        }
    }

    /// Returns true if this error came from the execution collaborator.
    pub fn is_execution(&self) -> bool {
        matches!(self, QueryError::Execution(_))
    }
}

/// Result type alias for dialect operations.
pub type QueryResult<T> = Result<T, QueryError>;
