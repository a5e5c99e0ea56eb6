//! Query executors.
//!
//! One executor per statement category, each bound to a [`Database`] and a
//! [`SealedStatement`] of its own category. Every execution:
//!
//! 1. binds the named parameters (an executor without parameters binds an empty
//!    set, so a statement with placeholders fails here);
//! 2. acquires one connection from the provider;
//! 3. runs the statement, prepared or plain per [`StatementOptions`];
//! 4. releases the connection;
//! 5. checks the row count against the expected range, if any.
//!
//! Acquisition and driver failures are wrapped in
//! [`SealError::QueryExecution`] carrying the pretty-printed statement. Bound
//! values never appear in errors or logs.

mod delete;
mod insert;
mod select;
mod update;


pub use delete::{DeleteQuery, DeleteResult};
pub use insert::{InsertQuery, InsertResult};
pub use select::{DATA_COLUMN, SelectQuery};
pub use update::{UpdateQuery, UpdateResult};

use crate::alias::{TableAliases, apply_table_alias};
use crate::bind::{BoundParams, NamedParams, bind_params, positional_sql};
use crate::client::{Connection, ConnectionProvider};
use crate::config::StatementOptions;
use crate::database::Database;
use crate::error::{SealError, SealResult};
use crate::format::format_sql;
use crate::range::{ExpectedRange, enforce_range};
use crate::statement::{SealedStatement, StatementType};
use std::ops::Deref;

/// Row type produced by provider `P`.
pub type RowOf<P> = <<P as ConnectionProvider>::Conn as Connection>::Row;

const MAX_LOGGED_SQL: usize = 200;

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Shorten SQL for log output.
pub(crate) fn truncate_sql(sql: &str) -> String {
    if sql.len() > MAX_LOGGED_SQL {
        format!("{}...", truncate_sql_bytes(sql, MAX_LOGGED_SQL))
    } else {
        sql.to_string()
    }
}

/// Holds an acquired connection; dropping it releases the connection.
struct ConnectionGuard<C> {
    conn: C,
}

impl<C: Connection> ConnectionGuard<C> {
    async fn acquire<P>(provider: &P) -> SealResult<Self>
    where
        P: ConnectionProvider<Conn = C>,
    {
        let conn = provider.acquire().await?;
        tracing::debug!(target: "pgseal.sql", "connection acquired");
        Ok(Self { conn })
    }
}

impl<C> Deref for ConnectionGuard<C> {
    type Target = C;

    fn deref(&self) -> &C {
        &self.conn
    }
}

impl<C> Drop for ConnectionGuard<C> {
    fn drop(&mut self) {
        tracing::debug!(target: "pgseal.sql", "connection released");
    }
}

/// State and execution steps shared by all executors.
struct QueryCore<'a, P> {
    db: &'a Database<P>,
    stmt: SealedStatement,
    params: Option<BoundParams>,
    options: StatementOptions,
}

impl<'a, P: ConnectionProvider> QueryCore<'a, P> {
    fn new(db: &'a Database<P>, stmt: SealedStatement, expected: StatementType) -> SealResult<Self> {
        let actual = stmt.statement_type();
        if actual != expected {
            return Err(SealError::CategoryMismatch { expected, actual });
        }
        Ok(Self {
            db,
            stmt,
            params: None,
            options: StatementOptions::default(),
        })
    }

    fn with_database<'b, Q: ConnectionProvider>(self, db: &'b Database<Q>) -> QueryCore<'b, Q> {
        QueryCore {
            db,
            stmt: self.stmt,
            params: self.params,
            options: self.options,
        }
    }

    fn with_table_alias(mut self, aliases: &TableAliases) -> SealResult<Self> {
        self.stmt = apply_table_alias(&self.stmt, aliases)?;
        Ok(self)
    }

    fn with_params(mut self, params: &NamedParams) -> SealResult<Self> {
        self.params = Some(bind_params(self.stmt.statement(), params)?);
        Ok(self)
    }

    fn bound_params(&self) -> SealResult<BoundParams> {
        match &self.params {
            Some(bound) => Ok(bound.clone()),
            None => bind_params(self.stmt.statement(), &NamedParams::new()),
        }
    }

    fn trace(&self, sql: &str, param_count: usize) {
        tracing::debug!(
            target: "pgseal.sql",
            kind = %self.stmt.statement_type(),
            param_count,
            prepared = self.options.prepare_statement,
            sql = %truncate_sql(sql),
            "executing sealed statement"
        );
    }

    fn execution_error(&self, source: SealError) -> SealError {
        SealError::QueryExecution {
            query: format_sql(self.stmt.statement()),
            source: Box::new(source),
        }
    }

    /// Run the statement and return its rows.
    async fn fetch(&self) -> SealResult<Vec<RowOf<P>>> {
        let bound = self.bound_params()?;
        let sql = positional_sql(self.stmt.statement());
        let params = bound.params_ref();
        self.trace(&sql, params.len());

        let result: SealResult<Vec<RowOf<P>>> = async {
            let conn = ConnectionGuard::acquire(self.db.provider()).await?;
            if self.options.prepare_statement {
                conn.query_prepared(&sql, &params).await
            } else {
                conn.query(&sql, &params).await
            }
        }
        .await;

        result.map_err(|e| self.execution_error(e))
    }

    /// Run the statement and return the affected row count.
    async fn execute(&self) -> SealResult<u64> {
        let bound = self.bound_params()?;
        let sql = positional_sql(self.stmt.statement());
        let params = bound.params_ref();
        self.trace(&sql, params.len());

        let result: SealResult<u64> = async {
            let conn = ConnectionGuard::acquire(self.db.provider()).await?;
            if self.options.prepare_statement {
                conn.execute_prepared(&sql, &params).await
            } else {
                conn.execute(&sql, &params).await
            }
        }
        .await;

        result.map_err(|e| self.execution_error(e))
    }

    fn enforce(&self, range: Option<ExpectedRange>, observed: u64) -> SealResult<()> {
        enforce_range(&self.stmt, range, observed, self.db.range_policy())
    }

    /// Run the statement, check the row count and return the rows.
    async fn fetch_in(&self, range: Option<ExpectedRange>) -> SealResult<Vec<RowOf<P>>> {
        let rows = self.fetch().await?;
        self.enforce(range, rows.len() as u64)?;
        Ok(rows)
    }

    /// Run the statement, check the affected row count and return it.
    async fn execute_in(&self, range: Option<ExpectedRange>) -> SealResult<u64> {
        let affected = self.execute().await?;
        self.enforce(range, affected)?;
        Ok(affected)
    }
}

/// Map driver rows to `T`.
fn map_rows<R, T: crate::row::FromRow<R>>(rows: &[R]) -> SealResult<Vec<T>> {
    rows.iter().map(T::from_row).collect()
}

/// Take the first row of a result that was required to hold exactly one row.
fn single_row<R>(rows: Vec<R>) -> SealResult<R> {
    rows.into_iter()
        .next()
        .ok_or_else(|| SealError::not_found("expected 1 row, got 0"))
}
