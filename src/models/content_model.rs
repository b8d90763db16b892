use serde::Deserialize;

use super::ModelError;
use super::Sys;

/// A content model drives the shape of one derived table.
///
/// Models are fetched fresh on every import and never persisted; they only
/// exist long enough to synthesize the schema.
#[derive(Debug, Clone)]
pub struct ContentModel {
    pub id: String,
    /// In declared order; the table's columns follow it 1:1.
    pub fields: Vec<FieldDefinition>,
}

#[derive(Debug, Clone)]
pub struct FieldDefinition {
    pub id: String,
    pub kind: FieldKind,
}

/// Closed set of field types the source can declare.
///
/// An array carries the element type when the source declares one; an
/// itemless array falls back to a generic JSON column. Anything outside this
/// set is rejected at model-parse time, so downstream type mapping stays a
/// total function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Array(Option<ItemKind>),
    Boolean,
    Date,
    Integer,
    Link,
    Number,
    Object,
    RichText,
    Symbol,
    Text,
}

/// Element types allowed inside an array field (the scalar set, minus Array).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Boolean,
    Date,
    Integer,
    Link,
    Number,
    Object,
    RichText,
    Symbol,
    Text,
}

impl ItemKind {
    fn parse(ty: &str) -> Option<Self> {
        match ty {
            "Boolean" => Some(Self::Boolean),
            "Date" => Some(Self::Date),
            "Integer" => Some(Self::Integer),
            "Link" => Some(Self::Link),
            "Number" => Some(Self::Number),
            "Object" => Some(Self::Object),
            "RichText" => Some(Self::RichText),
            "Symbol" => Some(Self::Symbol),
            "Text" => Some(Self::Text),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawContentType {
    sys: Sys,
    #[serde(default)]
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    id: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    items: Option<RawItems>,
}

#[derive(Debug, Deserialize)]
struct RawItems {
    #[serde(rename = "type")]
    ty: String,
}

impl ContentModel {
    /// Builds a model from one raw source item.
    ///
    /// Fails with [ModelError::UnknownFieldType] on any type outside
    /// [FieldKind], naming the model and field.
    pub fn from_source(item: &serde_json::Value) -> Result<Self, ModelError> {
        let raw: RawContentType =
            serde_json::from_value(item.clone()).map_err(|e| ModelError::Malformed {
                kind: "content type",
                msg: e.to_string(),
            })?;
        let model_id = raw.sys.id;
        let mut fields = Vec::with_capacity(raw.fields.len());
        for field in raw.fields {
            let unknown = |ty: &str| ModelError::UnknownFieldType {
                model: model_id.clone(),
                field: field.id.clone(),
                ty: ty.to_string(),
            };
            let kind = match field.ty.as_str() {
                "Array" => FieldKind::Array(match &field.items {
                    Some(items) => {
                        Some(ItemKind::parse(&items.ty).ok_or_else(|| unknown(&items.ty))?)
                    }
                    None => None,
                }),
                "Boolean" => FieldKind::Boolean,
                "Date" => FieldKind::Date,
                "Integer" => FieldKind::Integer,
                "Link" => FieldKind::Link,
                "Number" => FieldKind::Number,
                "Object" => FieldKind::Object,
                "RichText" => FieldKind::RichText,
                "Symbol" => FieldKind::Symbol,
                "Text" => FieldKind::Text,
                other => return Err(unknown(other)),
            };
            fields.push(FieldDefinition { id: field.id, kind });
        }
        Ok(Self {
            id: model_id,
            fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_fields_in_declared_order() {
        let model = ContentModel::from_source(&json!({
            "sys": {"id": "Article"},
            "fields": [
                {"id": "title", "type": "Text"},
                {"id": "tags", "type": "Array", "items": {"type": "Symbol"}},
                {"id": "rating", "type": "Number"},
            ],
        }))
        .unwrap();
        assert_eq!(model.id, "Article");
        let kinds: Vec<_> = model.fields.iter().map(|f| (f.id.as_str(), f.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("title", FieldKind::Text),
                ("tags", FieldKind::Array(Some(ItemKind::Symbol))),
                ("rating", FieldKind::Number),
            ]
        );
    }

    #[test]
    fn itemless_array_is_kept_generic() {
        let model = ContentModel::from_source(&json!({
            "sys": {"id": "Gallery"},
            "fields": [{"id": "anything", "type": "Array"}],
        }))
        .unwrap();
        assert_eq!(model.fields[0].kind, FieldKind::Array(None));
    }

    #[test]
    fn unknown_type_names_the_offender() {
        let error = ContentModel::from_source(&json!({
            "sys": {"id": "Venue"},
            "fields": [{"id": "position", "type": "Location"}],
        }))
        .unwrap_err();
        let ModelError::UnknownFieldType { model, field, ty } = error else {
            panic!("expected an unknown field type error, got {error}");
        };
        assert_eq!((model.as_str(), field.as_str(), ty.as_str()), ("Venue", "position", "Location"));
    }

    #[test]
    fn unknown_array_item_type_is_rejected_too() {
        let error = ContentModel::from_source(&json!({
            "sys": {"id": "Venue"},
            "fields": [{"id": "positions", "type": "Array", "items": {"type": "Location"}}],
        }))
        .unwrap_err();
        assert!(matches!(error, ModelError::UnknownFieldType { ty, .. } if ty == "Location"));
    }

    #[test]
    fn model_without_fields_is_valid() {
        let model = ContentModel::from_source(&json!({"sys": {"id": "Empty"}})).unwrap();
        assert!(model.fields.is_empty());
    }
}
