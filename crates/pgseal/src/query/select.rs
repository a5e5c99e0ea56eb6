use super::{QueryCore, RowOf, map_rows, single_row};
use crate::alias::TableAliases;
use crate::bind::NamedParams;
use crate::client::ConnectionProvider;
use crate::config::StatementOptions;
use crate::database::Database;
use crate::error::SealResult;
use crate::range::ExpectedRange;
use crate::row::{FromColumn, FromRow};
use crate::statement::{SealedStatement, StatementType};

/// Column read by [`SelectQuery::data`].
pub const DATA_COLUMN: &str = "data";

/// Executor for sealed `SELECT` statements.
///
/// # Example
///
/// ```ignore
/// let users: Vec<User> = db
///     .select(SqlTemplate::literal("SELECT id, name FROM users WHERE team = @team"))?
///     .with_params(named_params! { "team" => 4_i64 })?
///     .entries_in([1_u64, 50])
///     .await?;
/// ```
pub struct SelectQuery<'a, P> {
    core: QueryCore<'a, P>,
}

impl<'a, P: ConnectionProvider> SelectQuery<'a, P> {
    /// Bind a sealed statement to a database. Fails with
    /// [`SealError::CategoryMismatch`](crate::SealError::CategoryMismatch)
    /// unless the statement is a `SELECT`.
    pub fn new(db: &'a Database<P>, stmt: SealedStatement) -> SealResult<Self> {
        Ok(Self {
            core: QueryCore::new(db, stmt, StatementType::Select)?,
        })
    }

    /// Run against another database. Statement, parameters and options are kept.
    pub fn with_database<'b, Q: ConnectionProvider>(self, db: &'b Database<Q>) -> SelectQuery<'b, Q> {
        SelectQuery {
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

    /// All rows, mapped to `T`.
    pub async fn entries<T: FromRow<RowOf<P>>>(&self) -> SealResult<Vec<T>> {
        let rows = self.core.fetch_in(None).await?;
        map_rows(&rows)
    }

    /// All rows, mapped to `T`, after checking the row count against `range`.
    pub async fn entries_in<T: FromRow<RowOf<P>>>(
        &self,
        range: impl Into<ExpectedRange>,
    ) -> SealResult<Vec<T>> {
        let rows = self.core.fetch_in(Some(range.into())).await?;
        map_rows(&rows)
    }

    /// The first row, or `None` when the result is empty.
    pub async fn maybe_entry<T: FromRow<RowOf<P>>>(&self) -> SealResult<Option<T>> {
        let rows = self.core.fetch_in(None).await?;
        rows.first().map(T::from_row).transpose()
    }

    /// Exactly one row.
    ///
    /// Any other count is a range violation. When range violations only warn,
    /// an empty result still fails with [`SealError::NotFound`](crate::SealError::NotFound).
    pub async fn entry<T: FromRow<RowOf<P>>>(&self) -> SealResult<T> {
        let rows = self
            .core
            .fetch_in(Some(ExpectedRange::Exactly(1)))
            .await?;
        T::from_row(&single_row(rows)?)
    }

    /// Column `key` of the single row.
    pub async fn scalar<T: FromColumn<RowOf<P>>>(&self, key: &str) -> SealResult<T> {
        let rows = self
            .core
            .fetch_in(Some(ExpectedRange::Exactly(1)))
            .await?;
        T::from_column(&single_row(rows)?, key)
    }

    /// The `data` column of the single row.
    pub async fn data<T: FromColumn<RowOf<P>>>(&self) -> SealResult<T> {
        self.scalar(DATA_COLUMN).await
    }
}

impl<P> std::fmt::Debug for SelectQuery<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectQuery")
            .field("statement", &self.core.stmt)
            .field("params", &self.core.params)
            .finish()
    }
}
