use itertools::Itertools;

use crate::models::Entry;
use crate::models::FieldValue;

use super::sql::quote_ident;
use super::sql::quote_literal;
use super::sql::render_value;

/// A flattened row: column names and value expressions, same length and same
/// order, leading with the primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub table: String,
    pub columns: Vec<String>,
    pub values: Vec<String>,
}

/// Flattens an entry's field map into a row, in the entry's own field order.
///
/// Fields absent from this entry are omitted; the engine fills their columns
/// as NULL, so entries of the same model may populate different subsets.
/// Values are trusted verbatim: nothing is validated against the model's
/// declared types here, a mismatch surfaces as an engine error at insert
/// time and aborts the import.
pub fn flatten(entry: &Entry) -> Row {
    let mut columns = vec!["id".to_string()];
    let mut values = vec![quote_literal(&entry.sys.id)];
    for (field_id, value) in &entry.fields {
        columns.push(field_id.clone());
        values.push(render_value(&FieldValue::classify(value)));
    }
    Row {
        table: entry.content_type_id().to_string(),
        columns,
        values,
    }
}

pub fn insert_statement(row: &Row) -> String {
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        quote_ident(&row.table),
        row.columns.iter().map(|column| quote_ident(column)).join(", "),
        row.values.iter().join(", "),
    )
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::models::Entry;

    fn entry(value: serde_json::Value) -> Entry {
        Entry::from_source(&value).unwrap()
    }

    #[test]
    fn scalar_and_array_fields_flatten_to_one_row() {
        let row = flatten(&entry(json!({
            "sys": {"id": "e1", "contentType": {"sys": {"id": "Article"}}},
            "fields": {"title": "Hello", "tags": ["a", "b"]},
        })));
        assert_eq!(
            insert_statement(&row),
            r#"INSERT INTO "Article" ("id", "title", "tags") VALUES ('e1', 'Hello', ARRAY['a', 'b'])"#
        );
    }

    #[test]
    fn link_fields_reduce_to_the_referenced_id() {
        let row = flatten(&entry(json!({
            "sys": {"id": "e2", "contentType": {"sys": {"id": "Article"}}},
            "fields": {"author": {"sys": {"id": "p1", "linkType": "Entry"}}},
        })));
        assert_eq!(row.columns, vec!["id", "author"]);
        assert_eq!(row.values, vec!["'e2'", "'p1'"]);
    }

    #[test]
    fn absent_fields_are_omitted_from_the_row() {
        let row = flatten(&entry(json!({
            "sys": {"id": "e3", "contentType": {"sys": {"id": "Article"}}},
            "fields": {"tags": []},
        })));
        assert_eq!(row.columns, vec!["id", "tags"]);
        assert_eq!(row.values, vec!["'e3'", "'{}'"]);
    }

    #[test]
    fn columns_and_values_stay_in_lockstep() {
        let row = flatten(&entry(json!({
            "sys": {"id": "e4", "contentType": {"sys": {"id": "Article"}}},
            "fields": {
                "title": "O'Brien",
                "published": true,
                "meta": {"loc": {"lat": 1.5}},
                "authors": [{"sys": {"id": "p1"}}, {"sys": {"id": "p2"}}],
            },
        })));
        assert_eq!(row.columns.len(), row.values.len());
        assert_eq!(
            insert_statement(&row),
            r#"INSERT INTO "Article" ("id", "title", "published", "meta", "authors") VALUES ('e4', 'O''Brien', TRUE, '{"loc":{"lat":1.5}}', ARRAY['p1', 'p2'])"#
        );
    }
}
