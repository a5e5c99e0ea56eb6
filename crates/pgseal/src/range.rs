//! Row-count expectations.
//!
//! Executors accept an optional [`ExpectedRange`] and compare it with the number
//! of rows returned or affected. What happens on a mismatch is decided by the
//! [`RangePolicy`]: fail with [`SealError::RangeViolation`] (the default) or log
//! a warning and hand the result back unchanged.

use crate::error::{SealError, SealResult};
use crate::format::format_sql;
use crate::settings;
use crate::statement::SealedStatement;
use std::fmt;
use std::ops::{RangeFrom, RangeInclusive};

/// Expected number of rows.
///
/// Conversions mirror the shorthand callers usually write:
///
/// | value | range |
/// |---|---|
/// | `3_u64` | `Exactly(3)` |
/// | `[1_u64]` / `1_u64..` | `AtLeast(1)` |
/// | `[1_u64, 5]` / `1_u64..=5` | `Between(1, 5)` |
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedRange {
    Exactly(u64),
    AtLeast(u64),
    /// Inclusive on both ends.
    Between(u64, u64),
}

impl ExpectedRange {
    /// Whether `count` satisfies this expectation.
    pub fn contains(self, count: u64) -> bool {
        match self {
            Self::Exactly(n) => count == n,
            Self::AtLeast(n) => count >= n,
            Self::Between(lo, hi) => lo <= count && count <= hi,
        }
    }
}

impl From<u64> for ExpectedRange {
    fn from(n: u64) -> Self {
        Self::Exactly(n)
    }
}

impl From<[u64; 1]> for ExpectedRange {
    fn from([n]: [u64; 1]) -> Self {
        Self::AtLeast(n)
    }
}

impl From<[u64; 2]> for ExpectedRange {
    fn from([lo, hi]: [u64; 2]) -> Self {
        Self::Between(lo, hi)
    }
}

impl From<RangeInclusive<u64>> for ExpectedRange {
    fn from(range: RangeInclusive<u64>) -> Self {
        Self::Between(*range.start(), *range.end())
    }
}

impl From<RangeFrom<u64>> for ExpectedRange {
    fn from(range: RangeFrom<u64>) -> Self {
        Self::AtLeast(range.start)
    }
}

/// A count that fell outside its [`ExpectedRange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RangeViolation {
    pub expected: ExpectedRange,
    pub observed: u64,
}

impl fmt::Display for RangeViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let observed = self.observed;
        match self.expected {
            ExpectedRange::Exactly(n) => {
                write!(f, "expected exactly {n} rows but got {observed}")
            }
            ExpectedRange::AtLeast(n) => {
                write!(f, "expected at least {n} rows but got {observed}")
            }
            ExpectedRange::Between(lo, hi) => {
                write!(f, "expected between {lo} and {hi} rows but got {observed}")
            }
        }
    }
}

/// Compare `observed` with `range`. No range always passes.
pub fn validate_range(range: Option<ExpectedRange>, observed: u64) -> Result<(), RangeViolation> {
    match range {
        Some(expected) if !expected.contains(observed) => Err(RangeViolation { expected, observed }),
        _ => Ok(()),
    }
}

/// What to do with a [`RangeViolation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangePolicy {
    /// Fail the execution with [`SealError::RangeViolation`].
    Error,
    /// Log a warning and return the result.
    Warn,
}

impl RangePolicy {
    /// The process-wide policy, see [`settings::set_throw_on_range_errors`].
    pub fn current() -> Self {
        if settings::throw_on_range_errors() {
            Self::Error
        } else {
            Self::Warn
        }
    }
}

/// Validate `observed` and apply `policy` to a violation.
pub fn enforce_range(
    stmt: &SealedStatement,
    range: Option<ExpectedRange>,
    observed: u64,
    policy: RangePolicy,
) -> SealResult<()> {
    let Err(violation) = validate_range(range, observed) else {
        return Ok(());
    };

    match policy {
        RangePolicy::Error => Err(SealError::RangeViolation {
            message: violation.to_string(),
            query: format_sql(stmt.statement()),
        }),
        RangePolicy::Warn => {
            tracing::warn!(
                target: "pgseal.sql",
                kind = %stmt.statement_type(),
                expected = ?violation.expected,
                observed,
                sql = %crate::query::truncate_sql(stmt.statement()),
                "{violation}"
            );
            Ok(())
        }
    }
}
