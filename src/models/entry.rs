use serde::Deserialize;
use serde_json::Map;
use serde_json::Value;

use super::ModelError;
use super::SysLink;

/// One record of a content model, as delivered by the source.
///
/// `fields` keeps the source's own key order; entries of the same model may
/// legitimately populate different subsets of the model's fields.
#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    pub sys: EntrySys,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EntrySys {
    pub id: String,
    #[serde(rename = "contentType")]
    pub content_type: SysLink,
}

impl Entry {
    pub fn from_source(item: &Value) -> Result<Self, ModelError> {
        serde_json::from_value(item.clone()).map_err(|e| ModelError::Malformed {
            kind: "entry",
            msg: e.to_string(),
        })
    }

    /// Names the table this entry's row belongs to.
    pub fn content_type_id(&self) -> &str {
        &self.sys.content_type.sys.id
    }
}

/// An entry field value, classified exactly once from the source JSON.
///
/// The reference check is shallow: it applies to top-level values and to
/// array elements, never inside nested payloads. A non-reference object is
/// stored verbatim for its JSON column.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Scalar(Value),
    /// A `{sys: {id}}` reference, reduced to the referenced id.
    Reference(String),
    /// An array; elements are only ever `Scalar` or `Reference`.
    List(Vec<FieldValue>),
}

impl FieldValue {
    pub fn classify(value: &Value) -> Self {
        match value {
            Value::Array(elements) => Self::List(elements.iter().map(Self::reduce).collect()),
            other => Self::reduce(other),
        }
    }

    fn reduce(value: &Value) -> Self {
        match Self::reference_id(value) {
            Some(id) => Self::Reference(id.to_string()),
            None => Self::Scalar(value.clone()),
        }
    }

    fn reference_id(value: &Value) -> Option<&str> {
        value.get("sys")?.get("id")?.as_str()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_the_owning_model_from_sys() {
        let entry = Entry::from_source(&json!({
            "sys": {"id": "e1", "contentType": {"sys": {"id": "Article"}}},
            "fields": {"title": "Hello"},
        }))
        .unwrap();
        assert_eq!(entry.sys.id, "e1");
        assert_eq!(entry.content_type_id(), "Article");
    }

    #[test]
    fn entry_without_fields_parses() {
        let entry = Entry::from_source(&json!({
            "sys": {"id": "e2", "contentType": {"sys": {"id": "Article"}}},
        }))
        .unwrap();
        assert!(entry.fields.is_empty());
    }

    #[test]
    fn reference_reduces_to_the_referenced_id() {
        let value = FieldValue::classify(&json!({"sys": {"id": "p1", "type": "Link"}}));
        assert_eq!(value, FieldValue::Reference("p1".to_string()));
    }

    #[test]
    fn arrays_reduce_element_wise() {
        let value = FieldValue::classify(&json!(["a", {"sys": {"id": "p2"}}, 3]));
        assert_eq!(
            value,
            FieldValue::List(vec![
                FieldValue::Scalar(json!("a")),
                FieldValue::Reference("p2".to_string()),
                FieldValue::Scalar(json!(3)),
            ])
        );
    }

    #[test]
    fn non_reference_objects_stay_verbatim() {
        // nested payloads are not recursed into, even when they contain sys-like
        // shapes further down
        let payload = json!({"nodeType": "document", "content": [{"sys": {"id": "deep"}}]});
        let value = FieldValue::classify(&payload);
        assert_eq!(value, FieldValue::Scalar(payload));
    }

    #[test]
    fn sys_without_a_string_id_is_not_a_reference() {
        let payload = json!({"sys": {"id": 42}});
        assert_eq!(FieldValue::classify(&payload), FieldValue::Scalar(payload));
    }
}
