//! Process-wide settings.
//!
//! Two knobs live here: the range violation policy and an optional default
//! database used by the single-argument forms of the authoring macros. Both are
//! meant to be set once during start-up.

use std::sync::atomic::{AtomicBool, Ordering};

static THROW_ON_RANGE_ERRORS: AtomicBool = AtomicBool::new(true);

/// Whether range violations fail the execution (`true`, the default) or are
/// only logged.
pub fn throw_on_range_errors() -> bool {
    THROW_ON_RANGE_ERRORS.load(Ordering::Relaxed)
}

/// Set the process-wide range violation policy.
///
/// A [`Database`](crate::Database) configured with
/// [`with_range_policy`](crate::Database::with_range_policy) ignores this.
pub fn set_throw_on_range_errors(throw: bool) {
    THROW_ON_RANGE_ERRORS.store(throw, Ordering::Relaxed);
}

#[cfg(feature = "pool")]
mod default_db {
    use crate::database::Database;
    use crate::error::{SealError, SealResult};
    use deadpool_postgres::Pool;
    use std::sync::OnceLock;

    static DEFAULT_DATABASE: OnceLock<Database<Pool>> = OnceLock::new();

    /// Install the process-wide default database.
    ///
    /// Can be called once; later calls fail with [`SealError::Config`].
    pub fn set_default_database(db: Database<Pool>) -> SealResult<()> {
        DEFAULT_DATABASE
            .set(db)
            .map_err(|_| SealError::config("default database already set"))
    }

    /// The process-wide default database.
    pub fn default_database() -> SealResult<&'static Database<Pool>> {
        DEFAULT_DATABASE.get().ok_or(SealError::NoDefaultDatabase)
    }
}

#[cfg(feature = "pool")]
pub use default_db::{default_database, set_default_database};
