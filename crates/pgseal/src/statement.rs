//! Sealed statements.
//!
//! A [`SealedStatement`] is an immutable `(category, text)` pair that can only be
//! minted by code holding the process seal key. The key never leaves this crate:
//! it is created lazily once per process and handed out only to the authoring
//! paths in [`crate::database`] and [`crate::alias`].
//!
//! This protects against *accidental* construction of unchecked statements by
//! well-meaning callers. It does not protect against code that deliberately
//! works around the type system.

use crate::error::{SealError, SealResult};
use std::fmt;
use std::sync::OnceLock;

/// The category a statement was authored and checked as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementType {
    /// SELECT query (read-only)
    Select,
    /// INSERT statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
}

impl StatementType {
    /// The keyword that defines this category.
    pub fn keyword(self) -> &'static str {
        match self {
            StatementType::Select => "SELECT",
            StatementType::Insert => "INSERT",
            StatementType::Update => "UPDATE",
            StatementType::Delete => "DELETE",
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// Process-lifetime capability required to mint a [`SealedStatement`].
///
/// Not exported. Comparable for equality only.
#[derive(Clone, PartialEq, Eq)]
pub(crate) struct SealKey([u8; 32]);

impl SealKey {
    /// The process key, generated on first use.
    pub(crate) fn process() -> &'static SealKey {
        static KEY: OnceLock<SealKey> = OnceLock::new();
        KEY.get_or_init(SealKey::random)
    }

    fn random() -> SealKey {
        let mut bytes = [0u8; 32];
        bytes[..16].copy_from_slice(uuid::Uuid::new_v4().as_bytes());
        bytes[16..].copy_from_slice(uuid::Uuid::new_v4().as_bytes());
        SealKey(bytes)
    }

    /// A fresh key that is guaranteed not to be the process key.
    #[cfg(test)]
    pub(crate) fn forged() -> SealKey {
        loop {
            let key = SealKey::random();
            if &key != SealKey::process() {
                return key;
            }
        }
    }
}

impl fmt::Debug for SealKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SealKey(..)")
    }
}

/// An authenticated, immutable SQL statement tagged with its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedStatement {
    kind: StatementType,
    stmt: String,
}

impl SealedStatement {
    /// Mint a sealed statement.
    ///
    /// Fails with [`SealError::StatementAuthority`] unless `key` is the process key.
    pub(crate) fn new(
        kind: StatementType,
        stmt: impl Into<String>,
        key: &SealKey,
    ) -> SealResult<Self> {
        if key != SealKey::process() {
            return Err(SealError::StatementAuthority);
        }
        Ok(Self {
            kind,
            stmt: stmt.into(),
        })
    }

    /// The raw statement text.
    pub fn statement(&self) -> &str {
        &self.stmt
    }

    /// The category this statement was sealed as.
    pub fn statement_type(&self) -> StatementType {
        self.kind
    }
}

impl fmt::Display for SealedStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.stmt)
    }
}
