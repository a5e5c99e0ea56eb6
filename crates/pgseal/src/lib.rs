//! # pgseal
//!
//! Sealed, category-checked SQL statements for PostgreSQL.
//!
//! ## Features
//!
//! - **Literal-only SQL**: statements are authored from string literals through
//!   [`sql!`], [`sql_insert!`], [`sql_update!`] and [`sql_delete!`]; interpolated
//!   values are rejected
//! - **Sealed statements**: a [`SealedStatement`] can only be minted inside this
//!   crate, after the statement passed the sanity check for its category
//! - **Category executors**: a `SELECT` only runs on a [`SelectQuery`], a `DELETE`
//!   only on a [`DeleteQuery`], and so on
//! - **Exact named parameters**: `@name` placeholders must match the supplied
//!   [`NamedParams`] one-to-one
//! - **Row-count ranges**: executions can state how many rows they expect
//! - **Table aliases**: rewrite `FROM`/`JOIN` targets of a sealed statement
//!
//! ## Example
//!
//! ```ignore
//! use pgseal::{Database, named_params, sql, sql_delete};
//!
//! let db = Database::from_env("PGSEAL_")?;
//!
//! let users: Vec<User> = sql!(&db, "SELECT id, name FROM users WHERE team = @team")?
//!     .with_params(named_params! { "team" => 4_i64 })?
//!     .entries_in(1_u64..)
//!     .await?;
//!
//! sql_delete!(&db, "DELETE FROM sessions WHERE user_id = @id")?
//!     .with_params(named_params! { "id" => users[0].id })?
//!     .delete()
//!     .await?;
//! ```

pub mod alias;
pub mod bind;
pub mod check;
pub mod client;
pub mod config;
pub mod database;
pub mod error;
pub mod format;
pub mod ident;
mod macros;
pub mod query;
pub mod range;
pub mod row;
pub mod settings;
pub mod statement;
pub mod template;

#[cfg(feature = "pool")]
pub mod pool;

pub use alias::{TableAliases, apply_table_alias};
pub use bind::{BoundParams, NamedParams, Param, bind_params, placeholder_names, positional_sql};
pub use check::{
    DefaultSanityChecker, MULTIPLE_STATEMENTS, SanityChecker, check_delete, check_insert,
    check_select, check_update, sanity_check,
};
pub use client::{Connection, ConnectionProvider};
pub use config::{DEFAULT_ENV_PREFIX, DatabaseConfig, StatementOptions};
pub use database::Database;
pub use error::{SealError, SealResult};
pub use format::format_sql;
pub use ident::Ident;
pub use query::{
    DATA_COLUMN, DeleteQuery, DeleteResult, InsertQuery, InsertResult, RowOf, SelectQuery,
    UpdateQuery, UpdateResult,
};
pub use range::{ExpectedRange, RangePolicy, RangeViolation, validate_range};
pub use row::{FromColumn, FromRow, RowExt};
pub use statement::{SealedStatement, StatementType};
pub use template::SqlTemplate;

#[cfg(feature = "pool")]
pub use pool::{
    create_pool, create_pool_from_config, create_pool_from_config_with_tls,
    create_pool_with_manager_config,
};
