use crate::models::FieldDefinition;
use crate::models::FieldKind;
use crate::models::ItemKind;

/// Maps a field's declared type to its column type.
///
/// Total over [FieldKind]: unknown source types never reach this point, they
/// are rejected when the model is parsed. Arrays map to the element type's
/// column with an array suffix; an itemless array keeps the raw JSON shape.
pub fn column_type(field: &FieldDefinition) -> String {
    match field.kind {
        FieldKind::Array(Some(item)) => format!("{}[]", item_column_type(item)),
        FieldKind::Array(None) => "JSON".to_string(),
        FieldKind::Boolean => "BOOLEAN".to_string(),
        FieldKind::Date => "DATE".to_string(),
        FieldKind::Integer => "INTEGER".to_string(),
        FieldKind::Link => "TEXT".to_string(),
        FieldKind::Number => "REAL".to_string(),
        FieldKind::Object => "JSON".to_string(),
        FieldKind::RichText => "TEXT".to_string(),
        FieldKind::Symbol => "TEXT".to_string(),
        FieldKind::Text => "TEXT".to_string(),
    }
}

fn item_column_type(item: ItemKind) -> &'static str {
    match item {
        ItemKind::Boolean => "BOOLEAN",
        ItemKind::Date => "DATE",
        ItemKind::Integer => "INTEGER",
        ItemKind::Link => "TEXT",
        ItemKind::Number => "REAL",
        ItemKind::Object => "JSON",
        ItemKind::RichText => "TEXT",
        ItemKind::Symbol => "TEXT",
        ItemKind::Text => "TEXT",
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn field(kind: FieldKind) -> FieldDefinition {
        FieldDefinition {
            id: "f".to_string(),
            kind,
        }
    }

    #[rstest]
    #[case(FieldKind::Boolean, "BOOLEAN")]
    #[case(FieldKind::Date, "DATE")]
    #[case(FieldKind::Integer, "INTEGER")]
    #[case(FieldKind::Link, "TEXT")]
    #[case(FieldKind::Number, "REAL")]
    #[case(FieldKind::Object, "JSON")]
    #[case(FieldKind::RichText, "TEXT")]
    #[case(FieldKind::Symbol, "TEXT")]
    #[case(FieldKind::Text, "TEXT")]
    fn every_scalar_type_has_exactly_one_column_type(
        #[case] kind: FieldKind,
        #[case] expected: &str,
    ) {
        assert_eq!(column_type(&field(kind)), expected);
    }

    #[rstest]
    #[case(ItemKind::Symbol, "TEXT[]")]
    #[case(ItemKind::Integer, "INTEGER[]")]
    #[case(ItemKind::Link, "TEXT[]")]
    #[case(ItemKind::Object, "JSON[]")]
    fn arrays_take_the_element_type_with_a_suffix(#[case] item: ItemKind, #[case] expected: &str) {
        assert_eq!(column_type(&field(FieldKind::Array(Some(item)))), expected);
    }

    #[test]
    fn itemless_arrays_fall_back_to_json() {
        assert_eq!(column_type(&field(FieldKind::Array(None))), "JSON");
    }
}
