//! Lesson image records.
//!
//! Images travel as an ordered list of structured records and are flattened
//! to JSON text only at the storage edge, where a lesson keeps them in a single
//! nullable text column.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const DEFAULT_IMAGE_TYPE: &str = "image/png";

fn default_image_type() -> String {
    DEFAULT_IMAGE_TYPE.to_string()
}

/// One image attached to a lesson: base64 payload or URL plus its MIME type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonImage {
    #[serde(default)]
    pub data: String,

    #[serde(rename = "type", default = "default_image_type")]
    pub mime_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Any other keys the client sent, kept verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LessonImage {
    /// A bare payload string, assumed to be PNG.
    pub fn from_data(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            mime_type: default_image_type(),
            name: None,
            extra: Map::new(),
        }
    }
}

/// Normalize the `images` field of a lesson payload.
///
/// Strings become PNG records, objects are kept, anything else is dropped.
/// A non-array value yields no images.
pub fn normalize_images(value: &Value) -> Vec<LessonImage> {
    let Some(items) = value.as_array() else {
        return Vec::new();
    };

    items
        .iter()
        .filter_map(|item| match item {
            Value::String(data) => Some(LessonImage::from_data(data.clone())),
            Value::Object(_) => serde_json::from_value(item.clone()).ok(),
            _ => None,
        })
        .collect()
}

/// Column value for `images`: `None` when there are no images.
pub fn encode_images(images: &[LessonImage]) -> Result<Option<String>, serde_json::Error> {
    if images.is_empty() {
        return Ok(None);
    }
    serde_json::to_string(images).map(Some)
}

/// Read the `images` column back. Unreadable text yields no images.
pub fn decode_images(column: Option<&str>) -> Vec<LessonImage> {
    match column {
        Some(text) if !text.is_empty() => serde_json::from_str(text).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Discarding unreadable lesson images");
            Vec::new()
        }),
        _ => Vec::new(),
    }
}
