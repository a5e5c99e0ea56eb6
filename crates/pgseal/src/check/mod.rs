//! Lexical sanity checks per statement category.
//!
//! These checks confirm that a statement *lexically* belongs to the category it
//! is authored as: a single statement, no keyword from another category or from
//! the administrative class, and the category's own keyword present.
//!
//! This is not a SQL parser. It guards against misuse by otherwise well-meaning
//! code and does not try to validate against external attackers. Nesting depth is
//! not considered, so `INSERT ... SELECT` and `UPDATE ... (SELECT ...)` pass simply
//! because SELECT is not in those categories' forbidden sets.

use crate::statement::StatementType;
use regex::Regex;
use std::sync::OnceLock;


/// Administrative keywords forbidden for every category.
const ADMIN_KEYWORDS: &[&str] = &[
    "CREATE",
    "PROCEDURE",
    "DELIMITER",
    "CALL",
    "DO",
    "HANDLER",
    "IMPORT",
    "INTERSECT",
    "LOAD",
    "REPLACE",
    "ALTER",
    "DROP",
    "RENAME",
];

/// Violation reported when more than one statement is submitted.
pub const MULTIPLE_STATEMENTS: &str = "Usage of more than one statement per query or query delimiters of any kind is not allowed (multiple statements not allowed).";

/// Keywords (besides [`ADMIN_KEYWORDS`]) forbidden for a category.
pub fn category_forbidden_keywords(kind: StatementType) -> &'static [&'static str] {
    match kind {
        StatementType::Select => &["INSERT", "UPDATE", "DELETE", "INTO"],
        StatementType::Insert => &["UPDATE", "DELETE"],
        StatementType::Update => &["INSERT", "DELETE"],
        StatementType::Delete => &["SELECT", "INSERT", "UPDATE", "INTO"],
    }
}

/// Full forbidden keyword set for a category.
pub fn forbidden_keywords(kind: StatementType) -> Vec<&'static str> {
    let mut keywords = category_forbidden_keywords(kind).to_vec();
    keywords.extend_from_slice(ADMIN_KEYWORDS);
    keywords
}

fn whole_word_pattern(words: &[&str]) -> Regex {
    let pattern = format!(r"(?i)\b(?:{})\b", words.join("|"));
    Regex::new(&pattern).expect("invalid built-in keyword regex")
}

fn forbidden_regex(kind: StatementType) -> &'static Regex {
    static SELECT: OnceLock<Regex> = OnceLock::new();
    static INSERT: OnceLock<Regex> = OnceLock::new();
    static UPDATE: OnceLock<Regex> = OnceLock::new();
    static DELETE: OnceLock<Regex> = OnceLock::new();

    let cell = match kind {
        StatementType::Select => &SELECT,
        StatementType::Insert => &INSERT,
        StatementType::Update => &UPDATE,
        StatementType::Delete => &DELETE,
    };
    cell.get_or_init(|| whole_word_pattern(&forbidden_keywords(kind)))
}

fn defining_regex(kind: StatementType) -> &'static Regex {
    static SELECT: OnceLock<Regex> = OnceLock::new();
    static INSERT: OnceLock<Regex> = OnceLock::new();
    static UPDATE: OnceLock<Regex> = OnceLock::new();
    static DELETE: OnceLock<Regex> = OnceLock::new();

    let cell = match kind {
        StatementType::Select => &SELECT,
        StatementType::Insert => &INSERT,
        StatementType::Update => &UPDATE,
        StatementType::Delete => &DELETE,
    };
    cell.get_or_init(|| whole_word_pattern(&[kind.keyword()]))
}

/// Strip trailing statement delimiters and surrounding whitespace.
///
/// A trailing `;` is a common way to write a single statement and is of no
/// concern.
pub fn strip_trailing_delimiters(sql: &str) -> &str {
    sql.trim_end_matches(|c: char| c == ';' || c.is_whitespace())
        .trim_start()
}

/// Check `sql` against the rules of `kind`.
///
/// Returns an empty list when the statement passes. At most one violation is
/// reported: scanning stops at the first problem found.
pub fn sanity_check(kind: StatementType, sql: &str) -> Vec<String> {
    let sql = strip_trailing_delimiters(sql);

    if sql.contains(';') {
        return vec![MULTIPLE_STATEMENTS.to_string()];
    }

    if let Some(found) = forbidden_regex(kind).find(sql) {
        return vec![format!(
            "Usage of forbidden keyword within {kind}-only query (was: {}).",
            found.as_str().to_ascii_uppercase()
        )];
    }

    if !defining_regex(kind).is_match(sql) {
        return vec![format!("Not a recognizable {kind} query.")];
    }

    Vec::new()
}

/// Check a SELECT-only statement.
pub fn check_select(sql: &str) -> Vec<String> {
    sanity_check(StatementType::Select, sql)
}

/// Check an INSERT-only statement.
pub fn check_insert(sql: &str) -> Vec<String> {
    sanity_check(StatementType::Insert, sql)
}

/// Check an UPDATE-only statement.
pub fn check_update(sql: &str) -> Vec<String> {
    sanity_check(StatementType::Update, sql)
}

/// Check a DELETE-only statement.
pub fn check_delete(sql: &str) -> Vec<String> {
    sanity_check(StatementType::Delete, sql)
}

/// Sanity checking seam used by [`crate::Database`].
///
/// Implementors can add database-specific rules on top of the defaults by
/// calling [`sanity_check`] first and appending their own violations.
///
/// # Example
///
/// ```ignore
/// struct NoStarSelect;
///
/// impl SanityChecker for NoStarSelect {
///     fn check(&self, kind: StatementType, sql: &str) -> Vec<String> {
///         let mut violations = sanity_check(kind, sql);
///         if violations.is_empty() && kind == StatementType::Select && sql.contains('*') {
///             violations.push("SELECT * is not allowed.".to_string());
///         }
///         violations
///     }
/// }
/// ```
pub trait SanityChecker: Send + Sync {
    /// Return the list of violations for `sql` authored as `kind`.
    fn check(&self, kind: StatementType, sql: &str) -> Vec<String> {
        sanity_check(kind, sql)
    }
}

/// The default rules, with no additions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSanityChecker;

impl SanityChecker for DefaultSanityChecker {}
