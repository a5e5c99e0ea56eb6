//! Named parameter binding.
//!
//! Statements reference parameters as `@name`. [`bind_params`] turns a map of
//! named values into the positional list the driver expects, enforcing an exact
//! one-to-one correspondence:
//!
//! - every placeholder must have a value (otherwise: *missing*);
//! - every value must be referenced (otherwise: *unknown*);
//! - a name may appear only once per statement (otherwise: *duplicate*).
//!
//! All three lists are collected in one pass and reported together.
//!
//! # Example
//!
//! ```ignore
//! use pgseal::{bind_params, named_params};
//!
//! let bound = bind_params(
//!     "SELECT * FROM users WHERE id = @id AND status = @status",
//!     &named_params! { "id" => 42_i64, "status" => "active" },
//! )?;
//! assert_eq!(bound.names(), ["id", "status"]);
//! ```

use crate::error::{SealError, SealResult};
use regex::Regex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tokio_postgres::types::ToSql;

/// A bindable parameter value.
pub type Param = Arc<dyn ToSql + Sync + Send>;

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| {
        Regex::new(r"@([A-Za-z0-9_]+)").expect("invalid built-in placeholder regex")
    })
}

/// Placeholder names in order of appearance, repeats included.
pub fn placeholder_names(sql: &str) -> Vec<&str> {
    placeholder_regex()
        .captures_iter(sql)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Rewrite every `@name` placeholder to `$1, $2, ...` in order of appearance.
pub fn positional_sql(sql: &str) -> String {
    let mut index = 0usize;
    placeholder_regex()
        .replace_all(sql, |_: &regex::Captures<'_>| {
            index += 1;
            format!("${index}")
        })
        .into_owned()
}

/// Caller-supplied named parameter values.
///
/// `Debug` prints the keys only; values are never rendered.
#[derive(Clone, Default)]
pub struct NamedParams {
    values: BTreeMap<String, Param>,
}

impl NamedParams {
    /// Create an empty parameter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter (consuming version, for chaining).
    pub fn set<T>(mut self, name: impl Into<String>, value: T) -> Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.insert(name, value);
        self
    }

    /// Set a parameter in place.
    pub fn insert<T>(&mut self, name: impl Into<String>, value: T) -> &mut Self
    where
        T: ToSql + Sync + Send + 'static,
    {
        self.values.insert(name.into(), Arc::new(value));
        self
    }

    /// Whether a parameter with this name is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Parameter names, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl fmt::Debug for NamedParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

/// Build a [`NamedParams`] map.
///
/// ```ignore
/// let params = named_params! { "id" => 42_i64, "name" => "alice" };
/// ```
#[macro_export]
macro_rules! named_params {
    () => {
        $crate::NamedParams::new()
    };
    ($($name:literal => $value:expr),+ $(,)?) => {{
        let mut params = $crate::NamedParams::new();
        $( params.insert($name, $value); )+
        params
    }};
}

/// The positional parameter list produced by [`bind_params`].
#[derive(Clone, Default)]
pub struct BoundParams {
    names: Vec<String>,
    values: Vec<Param>,
}

impl BoundParams {
    /// Placeholder names, in binding order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Values, in binding order.
    pub fn values(&self) -> &[Param] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Parameter refs compatible with `tokio-postgres`.
    pub fn params_ref(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.values
            .iter()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect()
    }
}

impl fmt::Debug for BoundParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoundParams")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}

/// Bind `params` to the `@name` placeholders of `sql`.
///
/// Fails with [`SealError::ParameterContract`] listing every missing,
/// duplicate and unknown key.
pub fn bind_params(sql: &str, params: &NamedParams) -> SealResult<BoundParams> {
    let mut missing = Vec::new();
    let mut duplicate = Vec::new();
    let mut bound = BoundParams::default();

    for name in placeholder_names(sql) {
        if bound.names.iter().any(|used| used == name) {
            duplicate.push(name.to_string());
        } else if let Some(value) = params.values.get(name) {
            bound.names.push(name.to_string());
            bound.values.push(Arc::clone(value));
        } else if !missing.iter().any(|m: &String| m == name) {
            missing.push(name.to_string());
        }
    }

    let unknown: Vec<String> = params
        .keys()
        .filter(|key| !bound.names.iter().any(|used| used == key))
        .map(str::to_string)
        .collect();

    if !missing.is_empty() || !duplicate.is_empty() || !unknown.is_empty() {
        return Err(SealError::ParameterContract {
            missing,
            duplicate,
            unknown,
        });
    }

    Ok(bound)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contract(err: SealError) -> (Vec<String>, Vec<String>, Vec<String>) {
        match err {
            SealError::ParameterContract {
                missing,
                duplicate,
                unknown,
            } => (missing, duplicate, unknown),
            other => panic!("expected ParameterContract, got {other:?}"),
        }
    }

    #[test]
    fn binds_in_declaration_order() {
        let params = NamedParams::new().set("b", 2_i32).set("a", 1_i32);
        let bound = bind_params("SELECT * FROM t WHERE a = @a AND b = @b", &params).unwrap();
        assert_eq!(bound.names(), ["a", "b"]);
        assert_eq!(bound.len(), 2);
        assert_eq!(bound.params_ref().len(), 2);
    }

    #[test]
    fn single_placeholder() {
        let bound = bind_params(
            "SELECT *\n  FROM table\n WHERE userId = @id\n",
            &named_params! { "id" => 42_i64 },
        )
        .unwrap();
        assert_eq!(bound.names(), ["id"]);
    }

    #[test]
    fn unknown_key_is_reported() {
        let params = named_params! { "a" => 1_i32, "b" => 2_i32, "c" => 3_i32 };
        let err = bind_params("SELECT @a, @b", &params).unwrap_err();
        assert_eq!(err.code(), "INVALID_QUERY");
        let (missing, duplicate, unknown) = contract(err);
        assert!(missing.is_empty());
        assert!(duplicate.is_empty());
        assert_eq!(unknown, ["c"]);
    }

    #[test]
    fn missing_key_is_reported() {
        let params = named_params! { "a" => 1_i32 };
        let (missing, duplicate, unknown) =
            contract(bind_params("SELECT @a, @b", &params).unwrap_err());
        assert_eq!(missing, ["b"]);
        assert!(duplicate.is_empty());
        assert!(unknown.is_empty());
    }

    #[test]
    fn repeated_unsupplied_key_is_only_missing() {
        let (missing, duplicate, unknown) =
            contract(bind_params("SELECT @b, @b", &NamedParams::new()).unwrap_err());
        assert_eq!(missing, ["b"]);
        assert!(duplicate.is_empty());
        assert!(unknown.is_empty());
    }

    #[test]
    fn duplicate_key_is_reported() {
        let params = named_params! { "a" => 1_i32 };
        let (missing, duplicate, unknown) = contract(
            bind_params("SELECT * FROM t WHERE id = @a AND user_id = @a", &params).unwrap_err(),
        );
        assert!(missing.is_empty());
        assert_eq!(duplicate, ["a"]);
        assert!(unknown.is_empty());
    }

    #[test]
    fn all_violations_are_collected_together() {
        let params = named_params! { "a" => 1_i32, "z" => 0_i32 };
        let (missing, duplicate, unknown) =
            contract(bind_params("SELECT @a, @a, @b", &params).unwrap_err());
        assert_eq!(missing, ["b"]);
        assert_eq!(duplicate, ["a"]);
        assert_eq!(unknown, ["z"]);
    }

    #[test]
    fn no_placeholders_and_no_params() {
        let bound = bind_params("SELECT * FROM example", &NamedParams::new()).unwrap();
        assert!(bound.is_empty());
    }

    #[test]
    fn positional_sql_numbers_every_placeholder() {
        assert_eq!(
            positional_sql("UPDATE t SET a = @a, b = @b WHERE id = @id"),
            "UPDATE t SET a = $1, b = $2 WHERE id = $3"
        );
        assert_eq!(positional_sql("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn operators_are_not_placeholders() {
        assert!(placeholder_names("SELECT * FROM docs WHERE tags @> @tags AND tsv @@ q").len() == 1);
    }

    #[test]
    fn debug_never_prints_values() {
        let params = named_params! { "password" => "hunter2" };
        let rendered = format!("{params:?}");
        assert!(rendered.contains("password"));
        assert!(!rendered.contains("hunter2"));
    }
}
