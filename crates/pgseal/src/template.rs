//! Literal statement templates.
//!
//! Statements enter the crate only as `&'static str` literals through the
//! [`sql!`](crate::sql!) family of macros. A template must not carry any
//! interpolated runtime value: values are always supplied through named
//! parameters (`@name`) and bound separately.
//!
//! Two kinds of interpolation slot are detected:
//! - extra macro arguments (`sql!("... {}", id)`), counted at expansion time;
//! - inline format captures (`{id}`) outside single-quoted string literals, which
//!   would otherwise read as if the value were substituted.

use crate::error::{SealError, SealResult};

/// A literal statement source with its interpolation slot count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlTemplate {
    text: &'static str,
    slots: usize,
}

impl SqlTemplate {
    /// Template from a string literal.
    pub fn literal(text: &'static str) -> Self {
        Self {
            text,
            slots: count_inline_captures(text),
        }
    }

    /// Template from a string literal followed by `args` interpolated values.
    ///
    /// Always rejected by [`SqlTemplate::into_raw`] when `args > 0`; exists so the
    /// macros can report the misuse as an error instead of silently dropping values.
    #[doc(hidden)]
    pub fn interpolated(text: &'static str, args: usize) -> Self {
        Self {
            text,
            slots: count_inline_captures(text) + args,
        }
    }

    /// Number of interpolation slots found.
    pub fn slots(&self) -> usize {
        self.slots
    }

    /// The raw statement text, if the template carries no interpolation.
    pub fn into_raw(self) -> SealResult<&'static str> {
        if self.slots > 0 {
            return Err(SealError::TemplateInjection { slots: self.slots });
        }
        Ok(self.text)
    }
}

/// Count `{identifier}` captures that sit outside single-quoted literals.
///
/// Postgres array and JSON literals (`'{1,2}'`, `'{"a": 1}'`) live inside quotes
/// and are not counted.
fn count_inline_captures(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut count = 0;
    let mut in_quote = false;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'\'' => in_quote = !in_quote,
            b'{' if !in_quote => {
                let start = i + 1;
                let mut end = start;
                while end < bytes.len() && (bytes[end] == b'_' || bytes[end].is_ascii_alphanumeric())
                {
                    end += 1;
                }
                let ident = &bytes[start..end];
                let starts_ok = ident
                    .first()
                    .is_some_and(|c| *c == b'_' || c.is_ascii_alphabetic());
                let closed = end < bytes.len() && bytes[end] == b'}';
                // `{}` is an empty positional slot.
                if (ident.is_empty() || starts_ok) && closed {
                    count += 1;
                    i = end;
                }
            }
            _ => {}
        }
        i += 1;
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_literal_has_no_slots() {
        let t = SqlTemplate::literal("SELECT * FROM users WHERE id = @id");
        assert_eq!(t.slots(), 0);
        assert_eq!(t.into_raw().unwrap(), "SELECT * FROM users WHERE id = @id");
    }

    #[test]
    fn inline_captures_are_slots() {
        let t = SqlTemplate::literal("SELECT * FROM users WHERE id = {id} AND a = {}");
        assert_eq!(t.slots(), 2);
        assert!(matches!(
            t.into_raw(),
            Err(SealError::TemplateInjection { slots: 2 })
        ));
    }

    #[test]
    fn quoted_braces_are_not_slots() {
        let t = SqlTemplate::literal(
            "SELECT * FROM t WHERE tags = '{a,b}' AND doc @> '{\"k\": 1}'",
        );
        assert_eq!(t.slots(), 0);
    }

    #[test]
    fn non_identifier_braces_are_not_slots() {
        assert_eq!(SqlTemplate::literal("SELECT '{' || x || '}' FROM t").slots(), 0);
        assert_eq!(SqlTemplate::literal("SELECT {1abc} FROM t").slots(), 0);
    }

    #[test]
    fn interpolated_arguments_are_rejected() {
        let err = SqlTemplate::interpolated("SELECT * FROM t WHERE x = ", 1)
            .into_raw()
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_SQL");
    }
}
