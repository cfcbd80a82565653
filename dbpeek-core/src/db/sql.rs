//! SQL text for the read-only queries the viewer issues.

use crate::models::{connection::Dialect, filter::FilterSpec};

pub fn quote_identifier(dialect: Dialect, name: &str) -> String {
    match dialect {
        Dialect::MySql => format!("`{}`", name.replace('`', "``")),
        _ => format!("\"{}\"", name.replace('"', "\"\"")),
    }
}

/// Quotes `value` as a string literal the engine coerces to the compared
/// column's type.
pub fn quote_literal(dialect: Dialect, value: &str) -> String {
    let escaped = match dialect {
        Dialect::MySql => value.replace('\\', "\\\\").replace('\'', "''"),
        _ => value.replace('\'', "''"),
    };
    format!("'{}'", escaped)
}

pub fn select_all(dialect: Dialect, table: &str, filter: Option<&FilterSpec>) -> String {
    let mut query = format!("SELECT * FROM {}", quote_identifier(dialect, table));
    if let Some(filter) = filter {
        query.push_str(&format!(
            " WHERE {} {} {}",
            quote_identifier(dialect, &filter.column),
            filter.operator,
            quote_literal(dialect, &filter.value)
        ));
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::filter::FilterOperator;

    #[test]
    fn test_quote_identifier() {
        assert_eq!(quote_identifier(Dialect::Sqlite, "users"), "\"users\"");
        assert_eq!(quote_identifier(Dialect::PostgreSql, "we\"ird"), "\"we\"\"ird\"");
        assert_eq!(quote_identifier(Dialect::MySql, "or`ders"), "`or``ders`");
    }

    #[test]
    fn test_quote_literal() {
        assert_eq!(quote_literal(Dialect::Sqlite, "O'Brien"), "'O''Brien'");
        assert_eq!(quote_literal(Dialect::PostgreSql, "a\\b"), "'a\\b'");
        assert_eq!(quote_literal(Dialect::MySql, "a\\'b"), "'a\\\\''b'");
    }

    #[test]
    fn test_select_all_unfiltered() {
        assert_eq!(
            select_all(Dialect::Sqlite, "users", None),
            "SELECT * FROM \"users\""
        );
        assert_eq!(
            select_all(Dialect::MySql, "users", None),
            "SELECT * FROM `users`"
        );
    }

    #[test]
    fn test_select_all_with_filter() {
        let filter = FilterSpec {
            column: "age".to_string(),
            operator: FilterOperator::NotEq,
            value: "30".to_string(),
        };
        assert_eq!(
            select_all(Dialect::PostgreSql, "users", Some(&filter)),
            "SELECT * FROM \"users\" WHERE \"age\" != '30'"
        );
    }
}
