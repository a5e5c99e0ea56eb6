//! SQL pretty-printing for error context.
//!
//! [`format_sql`] lays a statement out one major clause per line with its body
//! indented by two spaces, and uppercases recognised keywords. It is a
//! token-level layout pass for humans reading error messages, not a parser:
//! string literals and quoted identifiers are copied verbatim.

const INDENT: &str = "  ";

const KEYWORDS: &[&str] = &[
    "ALL", "AND", "AS", "ASC", "BETWEEN", "BY", "CASE", "CONFLICT", "CROSS", "DEFAULT", "DELETE",
    "DESC", "DISTINCT", "DO", "ELSE", "END", "EXISTS", "FALSE", "FROM", "FULL", "GROUP", "HAVING",
    "ILIKE", "IN", "INNER", "INSERT", "INTO", "IS", "JOIN", "LEFT", "LIKE", "LIMIT", "NOT",
    "NOTHING", "NULL", "OFFSET", "ON", "OR", "ORDER", "OUTER", "RECURSIVE", "RETURNING", "RIGHT",
    "SELECT", "SET", "THEN", "TRUE", "UNION", "UPDATE", "USING", "VALUES", "WHEN", "WHERE", "WITH",
];

/// Clauses that start a new unindented line, longest first.
const CLAUSES: &[&[&str]] = &[
    &["GROUP", "BY"],
    &["ORDER", "BY"],
    &["INSERT", "INTO"],
    &["DELETE", "FROM"],
    &["UNION", "ALL"],
    &["SELECT"],
    &["FROM"],
    &["WHERE"],
    &["HAVING"],
    &["LIMIT"],
    &["OFFSET"],
    &["SET"],
    &["VALUES"],
    &["RETURNING"],
    &["UPDATE"],
    &["DELETE"],
    &["WITH"],
    &["UNION"],
];

/// Join phrases that start a new indented line, longest first.
const JOINS: &[&[&str]] = &[
    &["LEFT", "OUTER", "JOIN"],
    &["RIGHT", "OUTER", "JOIN"],
    &["FULL", "OUTER", "JOIN"],
    &["INNER", "JOIN"],
    &["LEFT", "JOIN"],
    &["RIGHT", "JOIN"],
    &["FULL", "JOIN"],
    &["CROSS", "JOIN"],
    &["JOIN"],
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token<'a> {
    Word(&'a str),
    Literal(&'a str),
    Op(&'a str),
    Comma,
    Open,
    Close,
    Semicolon,
}

fn is_word_char(c: char) -> bool {
    c == '_' || c == '$' || c == '.' || c.is_alphanumeric()
}

fn is_op_char(c: char) -> bool {
    "<>=!|:~+-*/%&^#@".contains(c)
}

/// Index just past a quoted run starting at `start` (which holds `quote`).
fn quoted_end(sql: &str, start: usize, quote: char) -> usize {
    let mut chars = sql[start + 1..].char_indices().peekable();
    while let Some((i, c)) = chars.next() {
        if c == quote {
            if chars.next_if(|&(_, next)| next == quote).is_some() {
                continue;
            }
            return start + 1 + i + 1;
        }
    }
    sql.len()
}

fn tokenize(sql: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    while let Some(c) = sql[pos..].chars().next() {
        let start = pos;
        pos += c.len_utf8();
        match c {
            c if c.is_whitespace() => {}
            ',' => tokens.push(Token::Comma),
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            ';' => tokens.push(Token::Semicolon),
            '\'' | '"' => {
                pos = quoted_end(sql, start, c);
                tokens.push(Token::Literal(&sql[start..pos]));
            }
            '@' if sql[pos..].starts_with(|n: char| n == '_' || n.is_alphanumeric()) => {
                pos = sql[pos..]
                    .find(|n: char| !is_word_char(n))
                    .map_or(sql.len(), |i| pos + i);
                tokens.push(Token::Word(&sql[start..pos]));
            }
            c if is_word_char(c) => {
                pos = sql[pos..]
                    .find(|n: char| !is_word_char(n))
                    .map_or(sql.len(), |i| pos + i);
                tokens.push(Token::Word(&sql[start..pos]));
            }
            c if is_op_char(c) => {
                pos = sql[pos..]
                    .find(|n: char| !is_op_char(n))
                    .map_or(sql.len(), |i| pos + i);
                tokens.push(Token::Op(&sql[start..pos]));
            }
            _ => tokens.push(Token::Op(&sql[start..pos])),
        }
    }
    tokens
}

fn keyword(token: &Token<'_>) -> Option<String> {
    match token {
        Token::Word(w) => {
            let upper = w.to_ascii_uppercase();
            KEYWORDS.contains(&upper.as_str()).then_some(upper)
        }
        _ => None,
    }
}

/// Length of the phrase from `table` matching `tokens[i..]`, if any.
fn phrase_at(tokens: &[Token<'_>], i: usize, table: &[&[&str]]) -> Option<usize> {
    table.iter().find_map(|phrase| {
        let matches = phrase.iter().enumerate().all(|(k, word)| {
            tokens
                .get(i + k)
                .and_then(keyword)
                .is_some_and(|kw| kw == *word)
        });
        matches.then_some(phrase.len())
    })
}

struct Layout {
    out: String,
    line_start: bool,
    indent: &'static str,
    prev: Option<Prev>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Prev {
    Keyword,
    Word,
    Open,
    Cast,
    Other,
}

impl Layout {
    fn newline(&mut self, indent: &'static str) {
        if !self.line_start {
            self.out.push('\n');
        }
        self.line_start = true;
        self.indent = indent;
    }

    fn push(&mut self, text: &str, prev: Prev, tight_before: bool) {
        if self.line_start {
            self.out.push_str(self.indent);
            self.line_start = false;
        } else if !tight_before && self.prev.is_some() {
            let tight_after = matches!(self.prev, Some(Prev::Open | Prev::Cast));
            if !tight_after {
                self.out.push(' ');
            }
        }
        self.out.push_str(text);
        self.prev = Some(prev);
    }
}

/// Pretty-print `sql`.
///
/// ```ignore
/// assert_eq!(
///     format_sql("select * from example where id = @id"),
///     "SELECT\n  *\nFROM\n  example\nWHERE\n  id = @id",
/// );
/// ```
pub fn format_sql(sql: &str) -> String {
    let tokens = tokenize(sql);
    let mut layout = Layout {
        out: String::with_capacity(sql.len() + 16),
        line_start: true,
        indent: "",
        prev: None,
    };
    let mut depth = 0usize;
    let mut in_between = false;
    let mut i = 0;

    while i < tokens.len() {
        let token = &tokens[i];

        if depth == 0 {
            if let Some(len) = phrase_at(&tokens, i, CLAUSES) {
                let phrase: Vec<String> = tokens[i..i + len].iter().filter_map(keyword).collect();
                layout.newline("");
                layout.push(&phrase.join(" "), Prev::Keyword, false);
                layout.newline(INDENT);
                i += len;
                continue;
            }
            if let Some(len) = phrase_at(&tokens, i, JOINS) {
                let phrase: Vec<String> = tokens[i..i + len].iter().filter_map(keyword).collect();
                layout.newline(INDENT);
                layout.push(&phrase.join(" "), Prev::Keyword, false);
                i += len;
                continue;
            }
        }

        match token {
            Token::Word(w) => match keyword(token) {
                Some(kw) => {
                    let is_and_or = kw == "AND" || kw == "OR";
                    if depth == 0 && is_and_or && !(kw == "AND" && in_between) {
                        layout.newline(INDENT);
                    }
                    if kw == "AND" {
                        in_between = false;
                    }
                    if kw == "BETWEEN" {
                        in_between = true;
                    }
                    layout.push(&kw, Prev::Keyword, false);
                }
                None => layout.push(w, Prev::Word, false),
            },
            Token::Literal(text) => layout.push(text, Prev::Word, false),
            Token::Op(op) if *op == "::" => layout.push(op, Prev::Cast, true),
            Token::Op(op) => layout.push(op, Prev::Other, false),
            Token::Comma => {
                layout.push(",", Prev::Other, true);
                if depth == 0 {
                    layout.newline(INDENT);
                }
            }
            Token::Open => {
                let tight = layout.prev == Some(Prev::Word);
                layout.push("(", Prev::Open, tight);
                depth += 1;
            }
            Token::Close => {
                depth = depth.saturating_sub(1);
                layout.push(")", Prev::Other, true);
            }
            Token::Semicolon => layout.push(";", Prev::Other, true),
        }
        i += 1;
    }

    layout.out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_clause_per_line() {
        assert_eq!(
            format_sql("select *\n  from example where id = @id"),
            "SELECT\n  *\nFROM\n  example\nWHERE\n  id = @id"
        );
    }

    #[test]
    fn select_list_is_split_on_commas() {
        assert_eq!(
            format_sql("SELECT a, b FROM t ORDER BY a desc LIMIT 10"),
            "SELECT\n  a,\n  b\nFROM\n  t\nORDER BY\n  a DESC\nLIMIT\n  10"
        );
    }

    #[test]
    fn conditions_and_between() {
        assert_eq!(
            format_sql("SELECT 1 FROM t WHERE a BETWEEN 1 AND 5 and b = 'x and y'"),
            "SELECT\n  1\nFROM\n  t\nWHERE\n  a BETWEEN 1 AND 5\n  AND b = 'x and y'"
        );
    }

    #[test]
    fn parentheses_stay_inline() {
        assert_eq!(
            format_sql("insert into t (a, b) values (@a, count(*)) returning id"),
            "INSERT INTO\n  t(a, b)\nVALUES\n  (@a, count(*))\nRETURNING\n  id"
        );
        assert_eq!(
            format_sql("DELETE FROM t WHERE id IN (SELECT id FROM u)"),
            "DELETE FROM\n  t\nWHERE\n  id IN (SELECT id FROM u)"
        );
    }

    #[test]
    fn joins_and_casts() {
        assert_eq!(
            format_sql("SELECT u.id::text FROM users u left join orders o ON o.uid = u.id"),
            "SELECT\n  u.id::text\nFROM\n  users u\n  LEFT JOIN orders o ON o.uid = u.id"
        );
    }

    #[test]
    fn literals_and_operators_are_preserved() {
        assert_eq!(
            format_sql("SELECT * FROM docs WHERE tags @> '{a}' AND \"Name\" <> 'it''s'"),
            "SELECT\n  *\nFROM\n  docs\nWHERE\n  tags @> '{a}'\n  AND \"Name\" <> 'it''s'"
        );
    }
}
