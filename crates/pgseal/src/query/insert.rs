use super::{QueryCore, RowOf, map_rows, single_row};
use crate::alias::TableAliases;
use crate::bind::NamedParams;
use crate::client::ConnectionProvider;
use crate::config::StatementOptions;
use crate::database::Database;
use crate::error::SealResult;
use crate::range::ExpectedRange;
use crate::row::FromRow;
use crate::statement::{SealedStatement, StatementType};

/// Outcome of an `INSERT` without a `RETURNING` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertResult {
    pub affected_rows: u64,
}

/// Executor for sealed `INSERT` statements.
pub struct InsertQuery<'a, P> {
    core: QueryCore<'a, P>,
}

impl<'a, P: ConnectionProvider> InsertQuery<'a, P> {
    /// Bind a sealed statement to a database. Fails with
    /// [`SealError::CategoryMismatch`](crate::SealError::CategoryMismatch)
    /// unless the statement is an `INSERT`.
    pub fn new(db: &'a Database<P>, stmt: SealedStatement) -> SealResult<Self> {
        Ok(Self {
            core: QueryCore::new(db, stmt, StatementType::Insert)?,
        })
    }

    /// Run against another database. Statement, parameters and options are kept.
    pub fn with_database<'b, Q: ConnectionProvider>(self, db: &'b Database<Q>) -> InsertQuery<'b, Q> {
        InsertQuery {
            core: self.core.with_database(db),
        }
    }

    /// Rewrite `FROM`/`JOIN` table references per the given pairs.
    pub fn with_table_alias(self, aliases: impl Into<TableAliases>) -> SealResult<Self> {
        Ok(Self {
            core: self.core.with_table_alias(&aliases.into())?,
        })
    }

    /// Replace the execution options.
    pub fn with_config(mut self, options: StatementOptions) -> Self {
        self.core.options = options;
        self
    }

    /// Bind named parameters now. Missing, duplicate or unknown names fail here.
    pub fn with_params(self, params: NamedParams) -> SealResult<Self> {
        Ok(Self {
            core: self.core.with_params(&params)?,
        })
    }

    /// The statement this executor will run.
    pub fn statement(&self) -> &SealedStatement {
        &self.core.stmt
    }

    /// Run the insert and report the affected row count.
    pub async fn insert(&self) -> SealResult<InsertResult> {
        let affected_rows = self.core.execute_in(None).await?;
        Ok(InsertResult { affected_rows })
    }

    /// Run the insert, checking the affected row count against `range`.
    pub async fn insert_in(&self, range: impl Into<ExpectedRange>) -> SealResult<InsertResult> {
        let affected_rows = self.core.execute_in(Some(range.into())).await?;
        Ok(InsertResult { affected_rows })
    }

    /// Run an `INSERT ... RETURNING` that must produce exactly one row.
    pub async fn insert_returning<T: FromRow<RowOf<P>>>(&self) -> SealResult<T> {
        let rows = self
            .core
            .fetch_in(Some(ExpectedRange::Exactly(1)))
            .await?;
        T::from_row(&single_row(rows)?)
    }

    /// Run an `INSERT ... RETURNING` and map every returned row.
    pub async fn insert_returning_all<T: FromRow<RowOf<P>>>(&self) -> SealResult<Vec<T>> {
        let rows = self.core.fetch_in(None).await?;
        map_rows(&rows)
    }
}

impl<P> std::fmt::Debug for InsertQuery<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InsertQuery")
            .field("statement", &self.core.stmt)
            .field("params", &self.core.params)
            .finish()
    }
}
