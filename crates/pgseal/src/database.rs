//! The database handle: statement authoring and executor construction.
//!
//! A [`Database`] owns a [`ConnectionProvider`] and a [`SanityChecker`]. It is
//! the only public path that turns a literal [`SqlTemplate`] into a
//! [`SealedStatement`], and every executor borrows the database it runs on.
//!
//! ```ignore
//! let db = Database::from_env("PGSEAL_")?;
//! let count: i64 = sql!(&db, "SELECT COUNT(*) AS data FROM users")?.data().await?;
//! ```

use crate::check::{DefaultSanityChecker, SanityChecker};
use crate::client::ConnectionProvider;
use crate::error::{SealError, SealResult};
use crate::query::{DeleteQuery, InsertQuery, SelectQuery, UpdateQuery};
use crate::range::RangePolicy;
use crate::statement::{SealKey, SealedStatement, StatementType};
use crate::template::SqlTemplate;
use std::fmt;
use std::sync::Arc;

/// A connection provider plus the rules applied to statements authored for it.
pub struct Database<P> {
    provider: P,
    checker: Arc<dyn SanityChecker>,
    range_policy: Option<RangePolicy>,
}

impl<P> Database<P> {
    /// Wrap a provider with the default sanity checker.
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            checker: Arc::new(DefaultSanityChecker),
            range_policy: None,
        }
    }

    /// Replace the sanity checker used when authoring statements.
    pub fn with_checker(mut self, checker: impl SanityChecker + 'static) -> Self {
        self.checker = Arc::new(checker);
        self
    }

    /// Fix the range violation policy for this database instead of following
    /// [`settings::throw_on_range_errors`](crate::settings::throw_on_range_errors).
    pub fn with_range_policy(mut self, policy: RangePolicy) -> Self {
        self.range_policy = Some(policy);
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// The range policy in effect for executions on this database.
    pub fn range_policy(&self) -> RangePolicy {
        self.range_policy.unwrap_or_else(RangePolicy::current)
    }

    /// Check `template` as `kind` and seal it.
    ///
    /// Fails with [`SealError::TemplateInjection`] if the template carries
    /// interpolation, or [`SealError::SanityCheck`] with the checker's violations.
    pub fn seal(&self, kind: StatementType, template: SqlTemplate) -> SealResult<SealedStatement> {
        let raw = template.into_raw()?;
        let violations = self.checker.check(kind, raw);
        if !violations.is_empty() {
            tracing::debug!(
                target: "pgseal.sql",
                %kind,
                violations = violations.len(),
                "statement rejected by sanity check"
            );
            return Err(SealError::SanityCheck { kind, violations });
        }
        SealedStatement::new(kind, raw, SealKey::process())
    }
}

impl<P: ConnectionProvider> Database<P> {
    pub fn select(&self, template: SqlTemplate) -> SealResult<SelectQuery<'_, P>> {
        SelectQuery::new(self, self.seal(StatementType::Select, template)?)
    }

    pub fn insert(&self, template: SqlTemplate) -> SealResult<InsertQuery<'_, P>> {
        InsertQuery::new(self, self.seal(StatementType::Insert, template)?)
    }

    pub fn update(&self, template: SqlTemplate) -> SealResult<UpdateQuery<'_, P>> {
        UpdateQuery::new(self, self.seal(StatementType::Update, template)?)
    }

    pub fn delete(&self, template: SqlTemplate) -> SealResult<DeleteQuery<'_, P>> {
        DeleteQuery::new(self, self.seal(StatementType::Delete, template)?)
    }
}

#[cfg(feature = "pool")]
mod pooled {
    use super::Database;
    use crate::config::DatabaseConfig;
    use crate::error::SealResult;
    use crate::pool::{create_pool, create_pool_from_config};
    use deadpool_postgres::Pool;

    impl Database<Pool> {
        /// Build a pooled database from explicit settings. No connection is
        /// opened until the first execution.
        pub fn connect(config: &DatabaseConfig) -> SealResult<Self> {
            tracing::info!(
                target: "pgseal.sql",
                host = %config.host,
                port = config.port,
                database = %config.database,
                connection_limit = config.connection_limit,
                "creating connection pool"
            );
            Ok(Self::new(create_pool_from_config(config)?))
        }

        /// Build a pooled database from `{prefix}DB`, `{prefix}HOST`, ...
        pub fn from_env(prefix: &str) -> SealResult<Self> {
            Self::connect(&DatabaseConfig::from_env(prefix)?)
        }

        /// Build a pooled database from a connection URL.
        pub fn from_url(url: &str) -> SealResult<Self> {
            Ok(Self::new(create_pool(url)?))
        }
    }
}

impl<P> fmt::Debug for Database<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Database")
            .field("range_policy", &self.range_policy)
            .finish_non_exhaustive()
    }
}

/// Author a `SELECT` for the default database.
///
/// Template injection is reported before the default database is looked up.
#[cfg(feature = "pool")]
pub fn select(template: SqlTemplate) -> SealResult<SelectQuery<'static, deadpool_postgres::Pool>> {
    template.into_raw()?;
    crate::settings::default_database()?.select(template)
}

/// Author an `INSERT` for the default database.
#[cfg(feature = "pool")]
pub fn insert(template: SqlTemplate) -> SealResult<InsertQuery<'static, deadpool_postgres::Pool>> {
    template.into_raw()?;
    crate::settings::default_database()?.insert(template)
}

/// Author an `UPDATE` for the default database.
#[cfg(feature = "pool")]
pub fn update(template: SqlTemplate) -> SealResult<UpdateQuery<'static, deadpool_postgres::Pool>> {
    template.into_raw()?;
    crate::settings::default_database()?.update(template)
}

/// Author a `DELETE` for the default database.
#[cfg(feature = "pool")]
pub fn delete(template: SqlTemplate) -> SealResult<DeleteQuery<'static, deadpool_postgres::Pool>> {
    template.into_raw()?;
    crate::settings::default_database()?.delete(template)
}
