use super::QueryCore;
use crate::alias::TableAliases;
use crate::bind::NamedParams;
use crate::client::ConnectionProvider;
use crate::config::StatementOptions;
use crate::database::Database;
use crate::error::SealResult;
use crate::range::ExpectedRange;
use crate::statement::{SealedStatement, StatementType};

/// Outcome of a `DELETE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteResult {
    pub affected_rows: u64,
}

/// Executor for sealed `DELETE` statements.
pub struct DeleteQuery<'a, P> {
    core: QueryCore<'a, P>,
}

impl<'a, P: ConnectionProvider> DeleteQuery<'a, P> {
    /// Bind a sealed statement to a database. Fails with
    /// [`SealError::CategoryMismatch`](crate::SealError::CategoryMismatch)
    /// unless the statement is a `DELETE`.
    pub fn new(db: &'a Database<P>, stmt: SealedStatement) -> SealResult<Self> {
        Ok(Self {
            core: QueryCore::new(db, stmt, StatementType::Delete)?,
        })
    }

    /// Run against another database. Statement, parameters and options are kept.
    pub fn with_database<'b, Q: ConnectionProvider>(self, db: &'b Database<Q>) -> DeleteQuery<'b, Q> {
        DeleteQuery {
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

    /// Run the delete and report the affected row count.
    pub async fn delete(&self) -> SealResult<DeleteResult> {
        let affected_rows = self.core.execute_in(None).await?;
        Ok(DeleteResult { affected_rows })
    }

    /// Run the delete, checking the affected row count against `range`.
    pub async fn delete_in(&self, range: impl Into<ExpectedRange>) -> SealResult<DeleteResult> {
        let affected_rows = self.core.execute_in(Some(range.into())).await?;
        Ok(DeleteResult { affected_rows })
    }
}

impl<P> std::fmt::Debug for DeleteQuery<'_, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeleteQuery")
            .field("statement", &self.core.stmt)
            .field("params", &self.core.params)
            .finish()
    }
}
