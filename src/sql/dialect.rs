//! SQL dialect abstraction for PostgreSQL and SQLite compatibility
//!
//! A dialect owns every textual policy the renderer must not hard-code:
//! identifier quoting, column qualification and literal quoting.

use chrono::{NaiveDate, NaiveDateTime};

use super::schema::{ColumnDescribe, ColumnType};
use crate::ast::Value;

/// Supported SQL dialects
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SqlDialect {
    #[default]
    Postgres,
    Sqlite,
}

/// PostgreSQL keywords that cannot appear bare as a table or column name
/// (the `reserved` and `reserved (can be function or type)` categories)
pub const POSTGRES_KEYWORDS: &[&str] = &[
    "all", "analyse", "analyze", "and", "any", "array", "as", "asc", "asymmetric",
    "authorization", "binary", "both", "case", "cast", "check", "collate", "collation",
    "column", "concurrently", "constraint", "create", "cross", "current_catalog",
    "current_date", "current_role", "current_schema", "current_time", "current_timestamp",
    "current_user", "default", "deferrable", "desc", "distinct", "do", "else", "end",
    "except", "false", "fetch", "for", "foreign", "freeze", "from", "full", "grant", "group",
    "having", "ilike", "in", "initially", "inner", "intersect", "into", "is", "isnull", "join",
    "lateral", "leading", "left", "like", "limit", "localtime", "localtimestamp", "natural",
    "not", "notnull", "null", "offset", "on", "only", "or", "order", "outer", "overlaps",
    "placing", "primary", "references", "returning", "right", "select", "session_user",
    "similar", "some", "symmetric", "system_user", "table", "tablesample", "then", "to",
    "trailing", "true", "union", "unique", "user", "using", "variadic", "verbose", "when",
    "where", "window", "with",
];

/// SQLite keywords, as reported by `sqlite3_keyword_name`, plus the
/// `true`/`false` literals
pub const SQLITE_KEYWORDS: &[&str] = &[
    "abort", "action", "add", "after", "all", "alter", "always", "analyze", "and", "as", "asc",
    "attach", "autoincrement", "before", "begin", "between", "by", "cascade", "case", "cast",
    "check", "collate", "column", "commit", "conflict", "constraint", "create", "cross",
    "current", "current_date", "current_time", "current_timestamp", "database", "default",
    "deferrable", "deferred", "delete", "desc", "detach", "distinct", "do", "drop", "each",
    "else", "end", "escape", "except", "exclude", "exclusive", "exists", "explain", "fail",
    "false", "filter", "first", "following", "for", "foreign", "from", "full", "generated",
    "glob", "group", "groups", "having", "if", "ignore", "immediate", "in", "index", "indexed",
    "initially", "inner", "insert", "instead", "intersect", "into", "is", "isnull", "join",
    "key", "last", "left", "like", "limit", "match", "materialized", "natural", "no", "not",
    "nothing", "notnull", "null", "nulls", "of", "offset", "on", "or", "order", "others",
    "outer", "over", "partition", "plan", "pragma", "preceding", "primary", "query", "raise",
    "range", "recursive", "references", "regexp", "reindex", "release", "rename", "replace",
    "restrict", "returning", "right", "rollback", "row", "rows", "savepoint", "select", "set",
    "table", "temp", "temporary", "then", "ties", "to", "transaction", "trigger", "true",
    "unbounded", "union", "unique", "update", "using", "vacuum", "values", "view", "virtual",
    "when", "where", "window", "with", "without",
];

/// True if `name` is a lowercase identifier (`[a-z_][a-z0-9_]*`)
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// True if `name` can be emitted without quotes in every supported dialect
pub fn is_bare_identifier(name: &str) -> bool {
    is_plain_identifier(name)
        && !POSTGRES_KEYWORDS.contains(&name)
        && !SQLITE_KEYWORDS.contains(&name)
}

/// Trait for dialect-specific SQL generation
pub trait SqlDialectImpl: Send + Sync {
    /// Get the dialect type
    fn dialect(&self) -> SqlDialect;

    /// Keywords that must be quoted when used as identifiers
    fn keywords(&self) -> &'static [&'static str];

    /// Quote an identifier (table/column name) when it needs quoting
    fn quote_identifier(&self, name: &str) -> String {
        if is_plain_identifier(name) && !self.keywords().contains(&name) {
            name.to_string()
        } else {
            format!("\"{}\"", name.replace('"', "\"\""))
        }
    }

    /// Qualified column reference, e.g. `orders.total`
    fn qualify(&self, table: &str, column: &str) -> String {
        format!(
            "{}.{}",
            self.quote_identifier(table),
            self.quote_identifier(column)
        )
    }

    /// Boolean literal
    fn boolean_literal(&self, value: bool) -> &str;

    /// String literal with embedded quotes doubled
    fn quote_string(&self, value: &str) -> String {
        format!("'{}'", value.replace('\'', "''"))
    }

    /// Floating point literal; non-finite values are dialect specific
    fn quote_float(&self, value: f64) -> String;

    fn quote_date(&self, value: NaiveDate) -> String {
        self.quote_string(&value.format("%Y-%m-%d").to_string())
    }

    fn quote_timestamp(&self, value: NaiveDateTime) -> String {
        self.quote_string(&value.format("%Y-%m-%d %H:%M:%S%.f").to_string())
    }

    /// Quote `value` for storage in or comparison against `column`.
    ///
    /// Without a column the value is quoted by its own type alone.
    fn quote(&self, value: &Value, column: Option<&ColumnDescribe>) -> String {
        let column_type = column.map(|c| c.column_type);
        match value {
            Value::Null => "NULL".to_string(),
            Value::Boolean(b) => match column_type {
                Some(ColumnType::Integer) => (if *b { "1" } else { "0" }).to_string(),
                Some(t) if t.is_textual() => self.quote_string(if *b { "t" } else { "f" }),
                _ => self.boolean_literal(*b).to_string(),
            },
            Value::Integer(i) => match column_type {
                Some(ColumnType::Boolean) => self.boolean_literal(*i != 0).to_string(),
                Some(t) if t.is_textual() => self.quote_string(&i.to_string()),
                _ => i.to_string(),
            },
            Value::Float(f) => match column_type {
                Some(t) if t.is_textual() => self.quote_string(&f.to_string()),
                _ => self.quote_float(*f),
            },
            Value::Text(s) => match column_type {
                Some(ColumnType::Integer) => match s.trim().parse::<i64>() {
                    Ok(i) => i.to_string(),
                    Err(_) => self.quote_string(s),
                },
                Some(ColumnType::Float | ColumnType::Decimal) => match s.trim().parse::<f64>() {
                    Ok(f) if f.is_finite() => s.trim().to_string(),
                    _ => self.quote_string(s),
                },
                Some(ColumnType::Boolean) => match parse_boolean(s) {
                    Some(b) => self.boolean_literal(b).to_string(),
                    None => self.quote_string(s),
                },
                _ => self.quote_string(s),
            },
            Value::Date(d) => self.quote_date(*d),
            Value::Timestamp(ts) => match column_type {
                Some(ColumnType::Date) => self.quote_date(ts.date()),
                _ => self.quote_timestamp(*ts),
            },
        }
    }
}

fn parse_boolean(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "t" | "true" | "1" | "y" | "yes" | "on" => Some(true),
        "f" | "false" | "0" | "n" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// PostgreSQL dialect implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct PostgresDialect;

impl SqlDialectImpl for PostgresDialect {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Postgres
    }

    fn keywords(&self) -> &'static [&'static str] {
        POSTGRES_KEYWORDS
    }

    fn boolean_literal(&self, value: bool) -> &str {
        if value {
            "TRUE"
        } else {
            "FALSE"
        }
    }

    fn quote_float(&self, value: f64) -> String {
        if value.is_nan() {
            "'NaN'".to_string()
        } else if value.is_infinite() {
            if value > 0.0 {
                "'Infinity'".to_string()
            } else {
                "'-Infinity'".to_string()
            }
        } else {
            format!("{:?}", value)
        }
    }
}

/// SQLite dialect implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteDialect;

impl SqlDialectImpl for SqliteDialect {
    fn dialect(&self) -> SqlDialect {
        SqlDialect::Sqlite
    }

    fn keywords(&self) -> &'static [&'static str] {
        SQLITE_KEYWORDS
    }

    fn boolean_literal(&self, value: bool) -> &str {
        if value {
            "1"
        } else {
            "0"
        }
    }

    fn quote_float(&self, value: f64) -> String {
        // SQLite has no NaN; out-of-range literals overflow to +/-Inf
        if value.is_nan() {
            "NULL".to_string()
        } else if value.is_infinite() {
            if value > 0.0 {
                "9e999".to_string()
            } else {
                "-9e999".to_string()
            }
        } else {
            format!("{:?}", value)
        }
    }
}

/// Get dialect implementation for a given dialect type
pub fn get_dialect(dialect: SqlDialect) -> Box<dyn SqlDialectImpl> {
    match dialect {
        SqlDialect::Postgres => Box::new(PostgresDialect),
        SqlDialect::Sqlite => Box::new(SqliteDialect),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(column_type: ColumnType) -> ColumnDescribe {
        ColumnDescribe::new("c", column_type)
    }

    #[test]
    fn test_identifier_quoting() {
        let dialect = PostgresDialect;
        assert_eq!(dialect.quote_identifier("account"), "account");
        assert_eq!(dialect.quote_identifier("_tmp1"), "_tmp1");
        assert_eq!(dialect.quote_identifier("Account"), "\"Account\"");
        assert_eq!(dialect.quote_identifier("user"), "\"user\"");
        assert_eq!(dialect.quote_identifier("1st"), "\"1st\"");
        assert_eq!(dialect.quote_identifier(""), "\"\"");
        assert_eq!(dialect.quote_identifier("weird\"name"), "\"weird\"\"name\"");
    }

    #[test]
    fn test_keywords_are_per_dialect() {
        // `key` is only reserved in SQLite, `user` only in PostgreSQL
        assert_eq!(PostgresDialect.quote_identifier("key"), "key");
        assert_eq!(SqliteDialect.quote_identifier("key"), "\"key\"");
        assert_eq!(PostgresDialect.quote_identifier("user"), "\"user\"");
        assert_eq!(SqliteDialect.quote_identifier("user"), "user");
        for name in ["foreign", "constraint", "cast", "collate"] {
            assert_eq!(PostgresDialect.quote_identifier(name), format!("\"{}\"", name));
            assert_eq!(SqliteDialect.quote_identifier(name), format!("\"{}\"", name));
        }
        assert!(!is_bare_identifier("key"));
        assert!(!is_bare_identifier("user"));
        assert!(is_bare_identifier("orders"));
    }

    #[test]
    fn test_qualify() {
        assert_eq!(PostgresDialect.qualify("t", "id"), "t.id");
        assert_eq!(SqliteDialect.qualify("order", "Total"), "\"order\".\"Total\"");
    }

    #[test]
    fn test_default_quoting_without_column() {
        let dialect = PostgresDialect;
        assert_eq!(dialect.quote(&Value::Null, None), "NULL");
        assert_eq!(dialect.quote(&Value::Integer(5), None), "5");
        assert_eq!(dialect.quote(&Value::Float(2.5), None), "2.5");
        assert_eq!(dialect.quote(&Value::Boolean(true), None), "TRUE");
        assert_eq!(dialect.quote(&Value::from("it's"), None), "'it''s'");
        assert_eq!(dialect.quote(&Value::from("5"), None), "'5'");
    }

    #[test]
    fn test_integer_column_coercion() {
        let dialect = PostgresDialect;
        let int = column(ColumnType::Integer);
        assert_eq!(dialect.quote(&Value::from("42"), Some(&int)), "42");
        assert_eq!(dialect.quote(&Value::from(" 7 "), Some(&int)), "7");
        assert_eq!(dialect.quote(&Value::from("abc"), Some(&int)), "'abc'");
        assert_eq!(dialect.quote(&Value::Float(3.9), Some(&int)), "3.9");
        assert_eq!(dialect.quote(&Value::Float(1e30), Some(&int)), "1e30");
        assert_eq!(
            SqliteDialect.quote(&Value::Float(-1e30), Some(&int)),
            "-1e30"
        );
        assert_eq!(dialect.quote(&Value::Boolean(true), Some(&int)), "1");
    }

    #[test]
    fn test_text_column_quotes_numbers() {
        let dialect = PostgresDialect;
        let text = column(ColumnType::Text);
        assert_eq!(dialect.quote(&Value::Integer(5), Some(&text)), "'5'");
        assert_eq!(dialect.quote(&Value::Float(1.5), Some(&text)), "'1.5'");
        assert_eq!(dialect.quote(&Value::Boolean(false), Some(&text)), "'f'");
    }

    #[test]
    fn test_decimal_column_keeps_text_precision() {
        let dialect = PostgresDialect;
        let decimal = column(ColumnType::Decimal);
        assert_eq!(
            dialect.quote(&Value::from("12345678901234567890.01"), Some(&decimal)),
            "12345678901234567890.01"
        );
        assert_eq!(dialect.quote(&Value::from("inf"), Some(&decimal)), "'inf'");
        assert_eq!(
            dialect.quote(&Value::from("1; DROP TABLE t"), Some(&decimal)),
            "'1; DROP TABLE t'"
        );
    }

    #[test]
    fn test_boolean_column_per_dialect() {
        let boolean = column(ColumnType::Boolean);
        assert_eq!(PostgresDialect.quote(&Value::from("yes"), Some(&boolean)), "TRUE");
        assert_eq!(SqliteDialect.quote(&Value::from("f"), Some(&boolean)), "0");
        assert_eq!(SqliteDialect.quote(&Value::Integer(3), Some(&boolean)), "1");
        assert_eq!(
            PostgresDialect.quote(&Value::from("maybe"), Some(&boolean)),
            "'maybe'"
        );
    }

    #[test]
    fn test_date_quoting() {
        let dialect = PostgresDialect;
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        let ts = date.and_hms_opt(13, 5, 0).unwrap();
        assert_eq!(dialect.quote(&Value::Date(date), None), "'2024-02-29'");
        assert_eq!(dialect.quote(&Value::Timestamp(ts), None), "'2024-02-29 13:05:00'");
        assert_eq!(
            dialect.quote(&Value::Timestamp(ts), Some(&column(ColumnType::Date))),
            "'2024-02-29'"
        );
    }

    #[test]
    fn test_non_finite_floats() {
        assert_eq!(PostgresDialect.quote_float(f64::NAN), "'NaN'");
        assert_eq!(PostgresDialect.quote_float(f64::NEG_INFINITY), "'-Infinity'");
        assert_eq!(SqliteDialect.quote_float(f64::NAN), "NULL");
        assert_eq!(SqliteDialect.quote_float(f64::INFINITY), "9e999");
    }

    #[test]
    fn test_get_dialect() {
        assert_eq!(get_dialect(SqlDialect::Postgres).dialect(), SqlDialect::Postgres);
        assert_eq!(get_dialect(SqlDialect::Sqlite).dialect(), SqlDialect::Sqlite);
    }
}
