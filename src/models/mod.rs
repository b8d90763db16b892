pub mod asset;
pub mod content_model;
pub mod entry;

pub use asset::Asset;
pub use content_model::ContentModel;
pub use content_model::FieldDefinition;
pub use content_model::FieldKind;
pub use content_model::ItemKind;
pub use entry::Entry;
pub use entry::FieldValue;

use serde::Deserialize;
use thiserror::Error;

/// Identity envelope carried by every source item.
#[derive(Debug, Clone, Deserialize)]
pub struct Sys {
    pub id: String,
}

/// The `{sys: {id}}` wrapper the source uses for references.
#[derive(Debug, Clone, Deserialize)]
pub struct SysLink {
    pub sys: Sys,
}

#[derive(Debug, Error)]
pub enum ModelError {
    /// The source declared a field type outside the supported set. Never
    /// silently defaulted: the import aborts with the offending location.
    #[error("unknown field type '{ty}' for field '{field}' of model '{model}'")]
    UnknownFieldType {
        model: String,
        field: String,
        ty: String,
    },

    #[error("malformed {kind} item from source: {msg}")]
    Malformed { kind: &'static str, msg: String },
}
