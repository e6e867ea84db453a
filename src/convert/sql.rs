use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

use crate::schema::ColumnKind;

static NUMERIC_LITERAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?$").unwrap());

/// Double every `'` and wrap in single quotes.
pub fn quote_literal(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    out.push('\'');
    for c in raw.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

pub fn format_value(kind: ColumnKind, raw: &str) -> Cow<'_, str> {
    match kind {
        ColumnKind::Numeric => Cow::Borrowed(raw),
        ColumnKind::Text => Cow::Owned(quote_literal(raw)),
    }
}

/// `(v1, v2, ...)` with each value rendered by its column's kind.
pub fn format_tuple<'a, I>(values: I, kinds: &[ColumnKind]) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let parts: Vec<Cow<'_, str>> = values
        .into_iter()
        .zip(kinds)
        .map(|(v, k)| format_value(*k, v))
        .collect();
    format!("({})", parts.join(", "))
}

/// `INSERT INTO <table> (<a>, <b>) VALUES` plus the trailing newline.
/// The table name is used verbatim.
pub fn insert_prologue(table: &str, columns: &[String]) -> String {
    format!("INSERT INTO {} ({}) VALUES\n", table, columns.join(", "))
}

pub const TUPLE_SEPARATOR: &str = ",\n";
pub const STATEMENT_TERMINATOR: &str = ";";

/// Whether a value can stand unquoted in a numeric column.
/// `NULL` is accepted in any case.
pub fn looks_numeric(raw: &str) -> bool {
    raw.eq_ignore_ascii_case("null") || NUMERIC_LITERAL.is_match(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quote_doubles_embedded_quotes() {
        assert_eq!(quote_literal("O'Hara St"), "'O''Hara St'");
        assert_eq!(quote_literal("''"), "''''''");
        assert_eq!(quote_literal(""), "''");
        assert_eq!(quote_literal("plain"), "'plain'");
    }

    #[test]
    fn numeric_values_pass_through_verbatim() {
        assert_eq!(format_value(ColumnKind::Numeric, "9.5"), "9.5");
        // not validated, not fixed
        assert_eq!(format_value(ColumnKind::Numeric, "it's"), "it's");
        assert_eq!(format_value(ColumnKind::Text, "9.5"), "'9.5'");
    }

    #[test]
    fn tuple_keeps_order_and_kinds() {
        let kinds = [ColumnKind::Text, ColumnKind::Numeric, ColumnKind::Text];
        assert_eq!(
            format_tuple(["a", "1", "b'c"], &kinds),
            "('a', 1, 'b''c')"
        );
    }

    #[test]
    fn prologue_lists_columns() {
        let cols = vec!["id".to_string(), "rate".to_string()];
        assert_eq!(
            insert_prologue("orders", &cols),
            "INSERT INTO orders (id, rate) VALUES\n"
        );
    }

    #[test]
    fn numeric_detection() {
        for ok in ["1", "-2", "+3.5", "9.", ".5", "1e10", "2.5E-3", "NULL", "null"] {
            assert!(looks_numeric(ok), "{ok} should look numeric");
        }
        for bad in ["", "abc", "1,5", "1.2.3", " 1", "0x10", "e5"] {
            assert!(!looks_numeric(bad), "{bad} should not look numeric");
        }
    }
}
