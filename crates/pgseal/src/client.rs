//! Connection seams used by the query executors.
//!
//! Executors never talk to a driver directly. They ask a [`ConnectionProvider`]
//! for one [`Connection`], run exactly one statement on it and drop it. Dropping
//! the connection is the release: for a pooled connection it goes back to the
//! pool.
//!
//! Implementations are provided for `tokio_postgres::Client` and, with the
//! `pool` feature, for `deadpool_postgres::Pool` / `deadpool_postgres::Client`.

use crate::error::SealResult;
use std::future::Future;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A single connection able to run positional statements.
pub trait Connection: Send + Sync {
    /// Row type produced by this connection.
    type Row: Send;

    /// Run a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = SealResult<Vec<Self::Row>>> + Send;

    /// Run a query through a prepared statement and return all rows.
    ///
    /// The default implementation calls [`Connection::query`].
    fn query_prepared(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = SealResult<Vec<Self::Row>>> + Send {
        self.query(sql, params)
    }

    /// Run a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = SealResult<u64>> + Send;

    /// Run a statement through a prepared statement and return the number of
    /// affected rows.
    ///
    /// The default implementation calls [`Connection::execute`].
    fn execute_prepared(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> impl Future<Output = SealResult<u64>> + Send {
        self.execute(sql, params)
    }
}

/// Source of connections, typically a pool.
pub trait ConnectionProvider: Send + Sync {
    type Conn: Connection;

    /// Acquire one connection for exclusive use. Dropping it releases it.
    fn acquire(&self) -> impl Future<Output = SealResult<Self::Conn>> + Send;
}

impl<P: ConnectionProvider> ConnectionProvider for Arc<P> {
    type Conn = P::Conn;

    fn acquire(&self) -> impl Future<Output = SealResult<Self::Conn>> + Send {
        P::acquire(self)
    }
}

impl Connection for tokio_postgres::Client {
    type Row = tokio_postgres::Row;

    async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> SealResult<Vec<tokio_postgres::Row>> {
        Ok(tokio_postgres::Client::query(self, sql, params).await?)
    }

    async fn query_prepared(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> SealResult<Vec<tokio_postgres::Row>> {
        let stmt = tokio_postgres::Client::prepare(self, sql).await?;
        Ok(tokio_postgres::Client::query(self, &stmt, params).await?)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SealResult<u64> {
        Ok(tokio_postgres::Client::execute(self, sql, params).await?)
    }

    async fn execute_prepared(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> SealResult<u64> {
        let stmt = tokio_postgres::Client::prepare(self, sql).await?;
        Ok(tokio_postgres::Client::execute(self, &stmt, params).await?)
    }
}

// ===== deadpool-postgres support =====

/// Pooled connection; prepared statements go through the per-connection cache.
#[cfg(feature = "pool")]
impl Connection for deadpool_postgres::Client {
    type Row = tokio_postgres::Row;

    async fn query(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> SealResult<Vec<tokio_postgres::Row>> {
        Connection::query(&***self, sql, params).await
    }

    async fn query_prepared(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> SealResult<Vec<tokio_postgres::Row>> {
        let stmt = self.prepare_cached(sql).await?;
        Ok(tokio_postgres::Client::query(&***self, &stmt, params).await?)
    }

    async fn execute(&self, sql: &str, params: &[&(dyn ToSql + Sync)]) -> SealResult<u64> {
        Connection::execute(&***self, sql, params).await
    }

    async fn execute_prepared(
        &self,
        sql: &str,
        params: &[&(dyn ToSql + Sync)],
    ) -> SealResult<u64> {
        let stmt = self.prepare_cached(sql).await?;
        Ok(tokio_postgres::Client::execute(&***self, &stmt, params).await?)
    }
}

#[cfg(feature = "pool")]
impl ConnectionProvider for deadpool_postgres::Pool {
    type Conn = deadpool_postgres::Client;

    async fn acquire(&self) -> SealResult<deadpool_postgres::Client> {
        Ok(self.get().await?)
    }
}
