use super::QueryCore;
use crate::alias::TableAliases;
use crate::bind::NamedParams;
use crate::client::ConnectionProvider;
use crate::config::StatementOptions;
use crate::database::Database;
use crate::error::SealResult;
use crate::range::ExpectedRange;
use crate::statement::{SealedStatement, StatementType};

/// Outcome of an `UPDATE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateResult {
    pub affected_rows: u64,
}

/// Executor for sealed `UPDATE` statements.
///
/// Use [`UpdateQuery::update_in`] to bound how many rows a statement may touch.
pub struct UpdateQuery<'a, P> {
    core: QueryCore<'a, P>,
}

impl<'a, P: ConnectionProvider> UpdateQuery<'a, P> {
    /// Bind a sealed statement to a database. Fails with
    /// [`SealError::CategoryMismatch`](crate::SealError::CategoryMismatch)
    /// unless the statement is an `UPDATE`.
    pub fn new(db: &'a Database<P>, stmt: SealedStatement) -> SealResult<Self> {
        Ok(Self {
            core: QueryCore::new(db, stmt, StatementType::Update)?,
        })
    }

    /// Run against another database. Statement, parameters and options are kept.
    pub fn with_database<'b, Q: ConnectionProvider>(self, db: &'b Database<Q>) -> UpdateQuery<'b, Q> {
        UpdateQuery {
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

    /// Run the update and report the affected row count.
    pub async fn update(&self) -> SealResult<UpdateResult> {
        let affected_rows = self.core.execute_in(None).await?;
        Ok(UpdateResult { affected_rows })
    }

    /// Run the update, checking the affected row count against `range`.
    pub async fn update_in(&self, range: impl Into<ExpectedRange>) -> SealResult<UpdateResult> {
        let affected_rows = self.core.execute_in(Some(range.into())).await?;
        Ok(UpdateResult { affected_rows })
    }
}

impl<P> std::fmt::Debug for UpdateQuery<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdateQuery")
            .field("statement", &self.core.stmt)
            .field("params", &self.core.params)
            .finish()
    }
}
