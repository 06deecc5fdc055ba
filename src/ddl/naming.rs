//! Physical naming and SQL quoting
//!
//! Every DDL code path builds identifiers and literals through this module.
//! The `custom_` prefix is applied here and nowhere else.

use crc32fast::Hasher;

use crate::catalog::DataKind;

/// Namespace tag prepended to every logical table name
pub const TABLE_PREFIX: &str = "custom_";
/// Suffix of the history table
pub const HISTORY_SUFFIX: &str = "_history";
/// Suffix of the history trigger function (and trigger)
pub const TRIGGER_SUFFIX: &str = "_history_trigger";
/// PostgreSQL silently truncates identifiers past this many bytes
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// `custom_<name>`
pub fn physical_table_name(name: &str) -> String {
    format!("{}{}", TABLE_PREFIX, name)
}

/// `custom_<name>_history`
pub fn history_table_name(name: &str) -> String {
    format!("{}{}{}", TABLE_PREFIX, name, HISTORY_SUFFIX)
}

/// `custom_<name>_history_trigger`
pub fn trigger_function_name(name: &str) -> String {
    format!("{}{}{}", TABLE_PREFIX, name, TRIGGER_SUFFIX)
}

/// Trigger name; shares the function name
pub fn trigger_name(name: &str) -> String {
    trigger_function_name(name)
}

/// Timeseries index on `custom_<name>.<field>`
pub fn timeseries_index_name(name: &str, field: &str) -> String {
    index_name(&physical_table_name(name), field, "ts")
}

/// GIST index on `<physical>.<field>`
pub fn spatial_index_name(physical: &str, field: &str) -> String {
    index_name(physical, field, "gist")
}

/// `idx_<physical>_<field>_<crc>_<suffix>`, at most 63 bytes.
///
/// The readable part is cut to fit. The checksum covers the full table and
/// field names, so `a_b.c` and `a.b_c` (or two long names sharing a prefix)
/// still get distinct indexes.
fn index_name(physical: &str, field: &str, suffix: &str) -> String {
    let mut hasher = Hasher::new();
    hasher.update(physical.as_bytes());
    hasher.update(&[0]);
    hasher.update(field.as_bytes());
    let crc = format!("{:08x}", hasher.finalize());

    let budget = MAX_IDENTIFIER_LEN - "idx_".len() - crc.len() - suffix.len() - 2;
    let mut readable = format!("{}_{}", physical, field);
    if readable.len() > budget {
        let mut end = budget;
        while !readable.is_char_boundary(end) {
            end -= 1;
        }
        readable.truncate(end);
    }

    format!("idx_{}_{}_{}", readable, crc, suffix)
}

/// Logical name of a physical main or history table, if it carries the prefix.
pub fn logical_name(physical: &str) -> Option<&str> {
    let rest = physical.strip_prefix(TABLE_PREFIX)?;
    Some(rest.strip_suffix(HISTORY_SUFFIX).unwrap_or(rest))
}

/// Double-quotes an identifier, doubling embedded quotes.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Single-quotes a literal, doubling embedded quotes.
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Renders a default value for a column of `kind`.
///
/// Numeric and boolean defaults are emitted bare. Everything else is
/// single-quoted; a value that already arrives quoted is kept when its inner
/// quotes are escaped, otherwise it is quoted again as plain text.
pub fn render_default(kind: DataKind, value: &str) -> String {
    if kind.is_numeric() || kind.is_boolean() {
        return value.to_string();
    }

    if is_quoted_literal(value) {
        return value.to_string();
    }

    quote_literal(value)
}

/// True if `value` is `'...'` with every inner quote doubled.
fn is_quoted_literal(value: &str) -> bool {
    if value.len() < 2 || !value.starts_with('\'') || !value.ends_with('\'') {
        return false;
    }

    let inner = &value[1..value.len() - 1];
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\'' && chars.next() != Some('\'') {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_names() {
        assert_eq!(physical_table_name("widgets"), "custom_widgets");
        assert_eq!(history_table_name("widgets"), "custom_widgets_history");
        assert_eq!(
            trigger_function_name("widgets"),
            "custom_widgets_history_trigger"
        );
    }

    #[test]
    fn test_index_names_readable() {
        let ts = timeseries_index_name("readings", "taken_at");
        assert!(ts.starts_with("idx_custom_readings_taken_at_"));
        assert!(ts.ends_with("_ts"));

        let gist = spatial_index_name("custom_sites_history", "location");
        assert!(gist.starts_with("idx_custom_sites_history_location_"));
        assert!(gist.ends_with("_gist"));
        assert_eq!(gist, spatial_index_name("custom_sites_history", "location"));
    }

    #[test]
    fn test_index_names_do_not_collide_on_underscores() {
        assert_ne!(
            timeseries_index_name("a_b", "c"),
            timeseries_index_name("a", "b_c")
        );
        assert_ne!(
            spatial_index_name("custom_sites", "history_location"),
            spatial_index_name("custom_sites_history", "location")
        );
    }

    #[test]
    fn test_long_index_names_fit_and_stay_distinct() {
        let table = "t".repeat(40);
        let history = history_table_name(&table);
        let a = spatial_index_name(&history, "reading_value_a");
        let b = spatial_index_name(&history, "reading_value_b");
        assert!(a.len() <= MAX_IDENTIFIER_LEN);
        assert!(b.len() <= MAX_IDENTIFIER_LEN);
        assert_ne!(a, b);
        assert!(a.ends_with("_gist"));

        let field = "f".repeat(63);
        assert!(timeseries_index_name(&table, &field).len() <= MAX_IDENTIFIER_LEN);
    }

    #[test]
    fn test_logical_name() {
        assert_eq!(logical_name("custom_widgets"), Some("widgets"));
        assert_eq!(logical_name("custom_widgets_history"), Some("widgets"));
        assert_eq!(logical_name("meta_custom_tables"), None);
    }

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("sku"), "\"sku\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_render_default_numeric_and_boolean_bare() {
        assert_eq!(render_default(DataKind::Integer, "5"), "5");
        assert_eq!(render_default(DataKind::Decimal, "9.99"), "9.99");
        assert_eq!(render_default(DataKind::Boolean, "false"), "false");
    }

    #[test]
    fn test_render_default_quotes_text() {
        assert_eq!(render_default(DataKind::Text, "open"), "'open'");
        assert_eq!(render_default(DataKind::Text, "it's"), "'it''s'");
        assert_eq!(render_default(DataKind::Date, "2024-01-01"), "'2024-01-01'");
    }

    #[test]
    fn test_render_default_keeps_quoted() {
        assert_eq!(render_default(DataKind::Text, "'open'"), "'open'");
        assert_eq!(render_default(DataKind::Text, "'it''s'"), "'it''s'");
    }

    #[test]
    fn test_render_default_requotes_unsafe_quoted() {
        let rendered = render_default(DataKind::Text, "'x'); DROP TABLE t; --'");
        assert!(rendered.starts_with("'''x''"));
        assert_eq!(
            rendered,
            quote_literal("'x'); DROP TABLE t; --'")
        );
    }
}
