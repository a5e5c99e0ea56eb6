//! Row mapping traits and utilities

use crate::error::{SealError, SealResult};
use serde::de::DeserializeOwned;
use tokio_postgres::Row;
use tokio_postgres::types::FromSql;

/// Trait for converting a database row into a Rust value.
///
/// `R` is the row type of the [`Connection`](crate::client::Connection) in use:
/// `tokio_postgres::Row` for Postgres, `serde_json::Value` for JSON-backed
/// providers (covered by a blanket impl over `DeserializeOwned`).
///
/// # Example
///
/// ```ignore
/// use pgseal::{FromRow, RowExt, SealResult};
///
/// struct User {
///     id: i64,
///     username: String,
/// }
///
/// impl FromRow for User {
///     fn from_row(row: &tokio_postgres::Row) -> SealResult<Self> {
///         Ok(Self {
///             id: row.try_get_column("id")?,
///             username: row.try_get_column("username")?,
///         })
///     }
/// }
/// ```
pub trait FromRow<R = Row>: Sized {
    /// Convert a database row into Self
    fn from_row(row: &R) -> SealResult<Self>;
}

impl<T: DeserializeOwned> FromRow<serde_json::Value> for T {
    fn from_row(row: &serde_json::Value) -> SealResult<Self> {
        serde_json::from_value(row.clone()).map_err(|e| SealError::decode("<row>", e.to_string()))
    }
}

/// A single column value readable from row type `R`.
pub trait FromColumn<R>: Sized {
    fn from_column(row: &R, column: &str) -> SealResult<Self>;
}

impl<T> FromColumn<Row> for T
where
    T: for<'a> FromSql<'a>,
{
    fn from_column(row: &Row, column: &str) -> SealResult<Self> {
        row.try_get(column)
            .map_err(|e| SealError::decode(column, e.to_string()))
    }
}

impl<T: DeserializeOwned> FromColumn<serde_json::Value> for T {
    fn from_column(row: &serde_json::Value, column: &str) -> SealResult<Self> {
        let value = row
            .get(column)
            .ok_or_else(|| SealError::decode(column, "column not found"))?;
        serde_json::from_value(value.clone()).map_err(|e| SealError::decode(column, e.to_string()))
    }
}

/// Extension trait for rows to provide typed access
pub trait RowExt: Sized {
    /// Try to get a column value, returning SealError::Decode on failure
    fn try_get_column<T: FromColumn<Self>>(&self, column: &str) -> SealResult<T> {
        T::from_column(self, column)
    }
}

impl RowExt for Row {}

impl RowExt for serde_json::Value {}
