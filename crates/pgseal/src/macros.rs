//! Statement authoring macros.
//!
//! Each macro takes a string literal and seals it as one category. With a
//! database handle as first argument the statement is authored for that
//! database; without one the process default database is used (see
//! [`settings::set_default_database`](crate::settings::set_default_database)).
//!
//! ```ignore
//! let users: Vec<User> = pgseal::sql!(&db, "SELECT id, name FROM users")?
//!     .entries()
//!     .await?;
//!
//! pgseal::sql_update!(&db, "UPDATE users SET name = @name WHERE id = @id")?
//!     .with_params(pgseal::named_params! { "id" => 1_i64, "name" => "bob" })?
//!     .update_in(1_u64)
//!     .await?;
//! ```
//!
//! Any argument after the literal is an interpolation attempt. It is never
//! evaluated and the macro returns [`SealError::TemplateInjection`](crate::SealError::TemplateInjection).

#[doc(hidden)]
#[macro_export]
macro_rules! __count {
    (@unit $arg:expr) => {
        ()
    };
    ($($arg:expr),* $(,)?) => {
        <[()]>::len(&[$($crate::__count!(@unit $arg)),*])
    };
}

/// Author a sealed `SELECT`.
#[macro_export]
macro_rules! sql {
    ($sql:literal $(,)?) => {
        $crate::database::select($crate::SqlTemplate::literal($sql))
    };
    ($sql:literal, $($arg:expr),+ $(,)?) => {
        $crate::database::select($crate::SqlTemplate::interpolated(
            $sql,
            $crate::__count!($($arg),+),
        ))
    };
    ($db:expr, $sql:literal $(,)?) => {
        ($db).select($crate::SqlTemplate::literal($sql))
    };
    ($db:expr, $sql:literal, $($arg:expr),+ $(,)?) => {
        ($db).select($crate::SqlTemplate::interpolated(
            $sql,
            $crate::__count!($($arg),+),
        ))
    };
}

/// Author a sealed `INSERT`.
#[macro_export]
macro_rules! sql_insert {
    ($sql:literal $(,)?) => {
        $crate::database::insert($crate::SqlTemplate::literal($sql))
    };
    ($sql:literal, $($arg:expr),+ $(,)?) => {
        $crate::database::insert($crate::SqlTemplate::interpolated(
            $sql,
            $crate::__count!($($arg),+),
        ))
    };
    ($db:expr, $sql:literal $(,)?) => {
        ($db).insert($crate::SqlTemplate::literal($sql))
    };
    ($db:expr, $sql:literal, $($arg:expr),+ $(,)?) => {
        ($db).insert($crate::SqlTemplate::interpolated(
            $sql,
            $crate::__count!($($arg),+),
        ))
    };
}

/// Author a sealed `UPDATE`.
#[macro_export]
macro_rules! sql_update {
    ($sql:literal $(,)?) => {
        $crate::database::update($crate::SqlTemplate::literal($sql))
    };
    ($sql:literal, $($arg:expr),+ $(,)?) => {
        $crate::database::update($crate::SqlTemplate::interpolated(
            $sql,
            $crate::__count!($($arg),+),
        ))
    };
    ($db:expr, $sql:literal $(,)?) => {
        ($db).update($crate::SqlTemplate::literal($sql))
    };
    ($db:expr, $sql:literal, $($arg:expr),+ $(,)?) => {
        ($db).update($crate::SqlTemplate::interpolated(
            $sql,
            $crate::__count!($($arg),+),
        ))
    };
}

/// Author a sealed `DELETE`.
#[macro_export]
macro_rules! sql_delete {
    ($sql:literal $(,)?) => {
        $crate::database::delete($crate::SqlTemplate::literal($sql))
    };
    ($sql:literal, $($arg:expr),+ $(,)?) => {
        $crate::database::delete($crate::SqlTemplate::interpolated(
            $sql,
            $crate::__count!($($arg),+),
        ))
    };
    ($db:expr, $sql:literal $(,)?) => {
        ($db).delete($crate::SqlTemplate::literal($sql))
    };
    ($db:expr, $sql:literal, $($arg:expr),+ $(,)?) => {
        ($db).delete($crate::SqlTemplate::interpolated(
            $sql,
            $crate::__count!($($arg),+),
        ))
    };
}
