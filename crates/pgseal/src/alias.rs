//! Table alias rewriting.
//!
//! Rewrites `FROM {table}` and `JOIN {table}` references of a sealed statement
//! so the same statement can run against a renamed, versioned or sharded table.
//! Only those two positions are touched; column references, string literals and
//! other clauses are left as written.
//!
//! ```ignore
//! let stmt = apply_table_alias(&stmt, &TableAliases::new().alias("users", "users_v2"))?;
//! assert_eq!(stmt.statement(), "SELECT * FROM users_v2");
//! ```

use crate::error::{SealError, SealResult};
use crate::ident::{Ident, IdentPart};
use crate::statement::{SealKey, SealedStatement};
use regex::{Captures, Regex};

/// Ordered `table -> replacement` pairs.
///
/// Pairs are applied in insertion order, so a later pair sees the result of the
/// earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableAliases {
    pairs: Vec<(String, String)>,
}

impl TableAliases {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pair (consuming version, for chaining).
    pub fn alias(mut self, table: impl Into<String>, alias: impl Into<String>) -> Self {
        self.insert(table, alias);
        self
    }

    /// Add a pair in place.
    pub fn insert(&mut self, table: impl Into<String>, alias: impl Into<String>) -> &mut Self {
        self.pairs.push((table.into(), alias.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(t, a)| (t.as_str(), a.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl<T, A> FromIterator<(T, A)> for TableAliases
where
    T: Into<String>,
    A: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (T, A)>>(iter: I) -> Self {
        let mut aliases = Self::new();
        for (table, alias) in iter {
            aliases.insert(table, alias);
        }
        aliases
    }
}

impl<T, A, const N: usize> From<[(T, A); N]> for TableAliases
where
    T: Into<String>,
    A: Into<String>,
{
    fn from(pairs: [(T, A); N]) -> Self {
        pairs.into_iter().collect()
    }
}

fn table_reference_regex(table: &Ident) -> SealResult<Regex> {
    // Bare parts fold case, quoted parts match exactly.
    let name = table
        .parts()
        .iter()
        .map(|part| match part {
            IdentPart::Bare(s) => format!("(?i:{})", regex::escape(s)),
            IdentPart::Quoted(s) => regex::escape(&format!("\"{}\"", s.replace('"', "\"\""))),
        })
        .collect::<Vec<_>>()
        .join(r"\.");
    // The trailing group stands in for a word boundary that also works after a
    // closing quote.
    let pattern = format!(r#"\b(?i:(from|join))(\s+){name}([^A-Za-z0-9_$."]|$)"#);
    Regex::new(&pattern).map_err(|e| SealError::validation(e.to_string()))
}

/// Rewrite table references of `stmt` and mint a new sealed statement of the
/// same category.
///
/// Both sides of every pair must be valid identifiers (see [`Ident`]). Alias
/// targets may not contain `@`, which would read as a parameter placeholder.
pub fn apply_table_alias(
    stmt: &SealedStatement,
    aliases: &TableAliases,
) -> SealResult<SealedStatement> {
    let mut text = stmt.statement().to_string();

    for (table, alias) in aliases.iter() {
        let table = Ident::parse(table)?;
        let alias = Ident::parse(alias)?;
        if alias.contains('@') {
            return Err(SealError::validation(format!(
                "table alias {alias} must not contain '@'"
            )));
        }

        let replacement = alias.to_sql();
        text = table_reference_regex(&table)?
            .replace_all(&text, |caps: &Captures<'_>| {
                format!(
                    "{}{}{}{}",
                    caps[1].to_ascii_uppercase(),
                    &caps[2],
                    replacement,
                    &caps[3]
                )
            })
            .into_owned();
    }

    SealedStatement::new(stmt.statement_type(), text, SealKey::process())
}
