//! Error types for pgseal

use crate::statement::StatementType;
use thiserror::Error;

/// Result type alias for pgseal operations
pub type SealResult<T> = Result<T, SealError>;

/// Error types for sealed statement authoring and execution.
///
/// Every variant carries a stable [`SealError::code`] so callers can route
/// failures without matching on message text.
#[derive(Debug, Error)]
pub enum SealError {
    /// A sealed statement was constructed with a key other than the process key.
    #[error("invalid statement key")]
    StatementAuthority,

    /// A template arrived with interpolated values.
    #[error("you can not insert variables directly in sql templates (found {slots} interpolation slot(s))")]
    TemplateInjection { slots: usize },

    /// The statement text does not lexically belong to its declared category.
    #[error("the {kind} statement does not respect {kind} statement restrictions: {}", .violations.join(" "))]
    SanityCheck {
        kind: StatementType,
        violations: Vec<String>,
    },

    /// Named parameters do not match the statement placeholders one-to-one.
    #[error(
        "query has duplicate keys, unknown keys or missing keys (missing: {missing:?}, duplicate: {duplicate:?}, unknown: {unknown:?})"
    )]
    ParameterContract {
        missing: Vec<String>,
        duplicate: Vec<String>,
        unknown: Vec<String>,
    },

    /// An executor was bound to a sealed statement of another category.
    #[error("using non-{expected} sealed statement in {expected} query (was: {actual})")]
    CategoryMismatch {
        expected: StatementType,
        actual: StatementType,
    },

    /// The driver or the pool failed while executing a statement.
    #[error("failed to execute query:\n{query}")]
    QueryExecution {
        /// Pretty-printed statement text. Bound values are never included.
        query: String,
        #[source]
        source: Box<SealError>,
    },

    /// Observed row count outside the declared expectation.
    #[error("{message}")]
    RangeViolation { message: String, query: String },

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// No process-wide default database was configured.
    #[error("no default database configured")]
    NoDefaultDatabase,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Driver error
    #[error("Driver error: {0}")]
    Driver(#[from] tokio_postgres::Error),

    /// Pool error
    #[error("Pool error: {0}")]
    Pool(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),
}

impl SealError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            Self::StatementAuthority => "SQL_USAGE_ERROR",
            Self::TemplateInjection { .. } | Self::SanityCheck { .. } => "INVALID_SQL",
            Self::CategoryMismatch { .. } => "INVALID_SQL",
            Self::ParameterContract { .. } => "INVALID_QUERY",
            Self::QueryExecution { .. } => "QUERY_ERROR",
            Self::RangeViolation { .. } => "SQL_RANGE_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::NoDefaultDatabase => "INVALID_DB",
            Self::Config(_) => "DB_INIT_ERROR",
            Self::Driver(_) => "DRIVER_ERROR",
            Self::Pool(_) => "POOL_ERROR",
            Self::Decode { .. } => "DECODE_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
        }
    }

    /// Longer explanation for the failures that signal misuse at the call site.
    pub fn description(&self) -> Option<&'static str> {
        match self {
            Self::StatementAuthority => Some(
                "Sealed statements can only be created by the dedicated authoring macros and \
                 functions of this crate. Constructing one through other means is invalid code.",
            ),
            Self::TemplateInjection { .. } => Some(
                "Use @name placeholders in the statement and bind values with `with_params`.",
            ),
            Self::SanityCheck { .. } => Some(
                "Each statement category has its own authoring macro; use sql_insert!, \
                 sql_update! or sql_delete! for mutating statements.",
            ),
            Self::ParameterContract { .. } => Some(
                "Parameter keys must match the statement placeholders exactly and each \
                 placeholder name may only be used once per statement.",
            ),
            Self::NoDefaultDatabase => Some(
                "Call `pgseal::settings::set_default_database` during application start-up \
                 or pass a database handle explicitly.",
            ),
            _ => None,
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a range violation
    pub fn is_range_violation(&self) -> bool {
        matches!(self, Self::RangeViolation { .. })
    }

    /// Check if this is a sanity check failure
    pub fn is_sanity_check(&self) -> bool {
        matches!(self, Self::SanityCheck { .. })
    }

    /// Check if this is a query execution failure
    pub fn is_query_execution(&self) -> bool {
        matches!(self, Self::QueryExecution { .. })
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for SealError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}
