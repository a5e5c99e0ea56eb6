//! SQL identifier validation.
//!
//! [`Ident`] accepts table names in the forms Postgres understands:
//!
//! - bare parts matching `[A-Za-z_][A-Za-z0-9_$]*`;
//! - quoted parts (`"CamelCase"`) with `""` as the escaped quote, any character but NUL;
//! - dotted combinations of both (`public."UserTable"`).
//!
//! Anything else is rejected with [`SealError::Validation`], so a validated
//! identifier can be spliced into a sealed statement without changing its
//! structure.

use crate::error::{SealError, SealResult};
use std::fmt;
use std::str::FromStr;

/// One dot-separated part of an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// Bare identifier, folded by Postgres.
    Bare(String),
    /// Quoted identifier, unescaped content.
    Quoted(String),
}

/// A validated, possibly schema-qualified SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    parts: Vec<IdentPart>,
}

impl Ident {
    /// Parse and validate an identifier.
    pub fn parse(s: &str) -> SealResult<Self> {
        if s.is_empty() {
            return Err(SealError::validation("identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(SealError::validation(
                "identifier cannot contain NUL character",
            ));
        }

        let mut parts = Vec::new();
        let mut rest = s;
        loop {
            let (part, tail) = if let Some(quoted) = rest.strip_prefix('"') {
                parse_quoted(quoted)?
            } else {
                parse_bare(rest)?
            };
            parts.push(part);

            match tail.strip_prefix('.') {
                Some("") => return Err(SealError::validation("trailing '.' in identifier")),
                Some(next) => rest = next,
                None if tail.is_empty() => break,
                None => {
                    return Err(SealError::validation(format!(
                        "unexpected {:?} after identifier part",
                        tail
                    )));
                }
            }
        }

        Ok(Self { parts })
    }

    /// The parsed parts, outermost first.
    pub fn parts(&self) -> &[IdentPart] {
        &self.parts
    }

    /// Whether any part contains `c` after unescaping.
    pub fn contains(&self, c: char) -> bool {
        self.parts.iter().any(|part| match part {
            IdentPart::Bare(s) | IdentPart::Quoted(s) => s.contains(c),
        })
    }

    /// Render as SQL, re-quoting quoted parts.
    pub fn to_sql(&self) -> String {
        self.to_string()
    }
}

fn parse_bare(s: &str) -> SealResult<(IdentPart, &str)> {
    let end = s
        .char_indices()
        .find(|&(_, c)| !(c == '_' || c == '$' || c.is_ascii_alphanumeric()))
        .map_or(s.len(), |(i, _)| i);
    let (name, tail) = s.split_at(end);

    match name.chars().next() {
        None => Err(SealError::validation("empty identifier part")),
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {
            Ok((IdentPart::Bare(name.to_string()), tail))
        }
        Some(first) => Err(SealError::validation(format!(
            "identifier cannot start with '{first}'"
        ))),
    }
}

/// Parse a quoted part; `s` starts right after the opening quote.
fn parse_quoted(s: &str) -> SealResult<(IdentPart, &str)> {
    let mut name = String::new();
    let mut chars = s.char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c != '"' {
            name.push(c);
            continue;
        }
        if chars.next_if(|&(_, next)| next == '"').is_some() {
            name.push('"');
            continue;
        }
        if name.is_empty() {
            return Err(SealError::validation("empty quoted identifier"));
        }
        return Ok((IdentPart::Quoted(name), &s[i + 1..]));
    }
    Err(SealError::validation("unclosed quoted identifier"))
}

impl FromStr for Ident {
    type Err = SealError;

    fn from_str(s: &str) -> SealResult<Self> {
        Ident::parse(s)
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match part {
                IdentPart::Bare(s) => f.write_str(s)?,
                IdentPart::Quoted(s) => write!(f, "\"{}\"", s.replace('"', "\"\""))?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_valid_forms() {
        for s in [
            "users",
            "users_v2",
            "public.users",
            "my_var$1",
            r#""CamelCase""#,
            r#"public."UserTable""#,
            r#""has""quote""#,
        ] {
            assert_eq!(Ident::parse(s).unwrap().to_sql(), s, "case: {s}");
        }
    }

    #[test]
    fn quoted_parts_are_unescaped() {
        let ident = Ident::parse(r#"app."Odd""Name""#).unwrap();
        assert_eq!(
            ident.parts(),
            [
                IdentPart::Bare("app".into()),
                IdentPart::Quoted("Odd\"Name".into())
            ]
        );
    }

    #[test]
    fn rejects_invalid_forms() {
        for s in [
            "",
            "1table",
            "my table",
            "schema..table",
            "schema.",
            r#""unclosed"#,
            r#""""#,
            "users; DROP TABLE x",
            "users--",
            r#""a"b"#,
        ] {
            let err = Ident::parse(s).unwrap_err();
            assert_eq!(err.code(), "VALIDATION_ERROR", "case: {s}");
        }
    }

    #[test]
    fn contains_sees_quoted_content() {
        assert!(Ident::parse(r#""we@ird""#).unwrap().contains('@'));
        assert!(!Ident::parse("plain").unwrap().contains('@'));
    }
}
