//! SQL fragment rendering for the dynamic, per-tenant schema.
//!
//! Table and column names come straight from the source repository, so every
//! identifier is double-quoted (embedded `"` doubled) and every string
//! literal single-quoted (embedded `'` doubled). Reserved words and odd
//! characters in source-chosen ids are safe either way.

use itertools::Itertools;
use serde_json::Value;

use crate::models::FieldValue;

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn quote_literal(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// Renders a flattened field value as a SQL expression.
///
/// Scalars render by JSON type, references render as the referenced id,
/// lists render as an `ARRAY[...]` literal. An empty list renders as `'{}'`,
/// which the engine accepts for an array column of any element type.
pub fn render_value(value: &FieldValue) -> String {
    match value {
        FieldValue::Scalar(scalar) => render_scalar(scalar),
        FieldValue::Reference(id) => quote_literal(id),
        FieldValue::List(elements) if elements.is_empty() => "'{}'".to_string(),
        FieldValue::List(elements) => {
            format!("ARRAY[{}]", elements.iter().map(render_value).join(", "))
        }
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => quote_literal(s),
        // JSON-typed payloads are stored verbatim in their JSON column
        json => quote_literal(&json.to_string()),
    }
}

/// Hex-escaped bytea literal, `'\x…'`.
pub fn bytea_literal(bytes: &[u8]) -> String {
    use std::fmt::Write as _;
    let mut literal = String::with_capacity(4 + bytes.len() * 2);
    literal.push_str("'\\x");
    for byte in bytes {
        write!(literal, "{byte:02x}").unwrap();
    }
    literal.push('\'');
    literal
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::models::FieldValue;

    #[test]
    fn identifiers_are_always_quoted() {
        assert_eq!(quote_ident("order"), r#""order""#);
        assert_eq!(quote_ident(r#"we"ird"#), r#""we""ird""#);
    }

    #[test]
    fn literals_escape_single_quotes() {
        assert_eq!(quote_literal("it's"), "'it''s'");
        assert_eq!(quote_literal("'); DROP TABLE x; --"), "'''); DROP TABLE x; --'");
    }

    #[test]
    fn scalars_render_by_json_type() {
        assert_eq!(render_value(&FieldValue::Scalar(json!("Hello"))), "'Hello'");
        assert_eq!(render_value(&FieldValue::Scalar(json!(3.25))), "3.25");
        assert_eq!(render_value(&FieldValue::Scalar(json!(true))), "TRUE");
        assert_eq!(render_value(&FieldValue::Scalar(json!(null))), "NULL");
    }

    #[test]
    fn json_payloads_render_as_quoted_json() {
        let value = FieldValue::Scalar(json!({"a": 1, "b": ["x"]}));
        assert_eq!(render_value(&value), r#"'{"a":1,"b":["x"]}'"#);
    }

    #[test]
    fn lists_render_as_array_literals() {
        let value = FieldValue::List(vec![
            FieldValue::Scalar(json!("a")),
            FieldValue::Reference("p1".to_string()),
        ]);
        assert_eq!(render_value(&value), "ARRAY['a', 'p1']");
        assert_eq!(render_value(&FieldValue::List(vec![])), "'{}'");
    }

    #[test]
    fn bytea_renders_hex_escaped() {
        assert_eq!(bytea_literal(b"\x00\xffA"), r"'\x00ff41'");
    }
}
