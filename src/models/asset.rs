use serde::Deserialize;
use serde_json::Value;

use super::ModelError;
use super::Sys;

/// A binary resource: metadata here, bytes fetched separately from the
/// declared file URL.
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub sys: Sys,
    pub fields: AssetFields,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetFields {
    #[serde(default)]
    pub title: Option<String>,
    pub file: AssetFile,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AssetFile {
    pub url: String,
    #[serde(rename = "contentType")]
    pub content_type: String,
    #[serde(rename = "fileName")]
    pub file_name: String,
}

impl Asset {
    pub fn from_source(item: &Value) -> Result<Self, ModelError> {
        serde_json::from_value(item.clone()).map_err(|e| ModelError::Malformed {
            kind: "asset",
            msg: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_the_file_envelope() {
        let asset = Asset::from_source(&json!({
            "sys": {"id": "a1"},
            "fields": {
                "title": "Cat",
                "file": {
                    "url": "//cdn.example.test/cat.jpg",
                    "contentType": "image/jpeg",
                    "fileName": "cat.jpg",
                },
            },
        }))
        .unwrap();
        assert_eq!(asset.sys.id, "a1");
        assert_eq!(asset.fields.file.content_type, "image/jpeg");
        assert_eq!(asset.fields.file.file_name, "cat.jpg");
    }

    #[test]
    fn asset_without_a_file_is_malformed() {
        let error = Asset::from_source(&json!({"sys": {"id": "a2"}, "fields": {}})).unwrap_err();
        assert!(matches!(error, ModelError::Malformed { kind: "asset", .. }));
    }
}
