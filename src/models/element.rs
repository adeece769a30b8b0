//! Element model matching the frontend PageElement interface.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Kind of visual block an element renders as.
///
/// The set is closed on the frontend; anything else deserializes to
/// `Unknown` and is normalized to `Text` when snapshots are rebuilt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Profile,
    Link,
    Text,
    Social,
    Divider,
    Image,
    #[serde(other)]
    Unknown,
}

impl ElementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementType::Profile => "profile",
            ElementType::Link => "link",
            ElementType::Text => "text",
            ElementType::Social => "social",
            ElementType::Divider => "divider",
            ElementType::Image => "image",
            ElementType::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "profile" => Some(ElementType::Profile),
            "link" => Some(ElementType::Link),
            "text" => Some(ElementType::Text),
            "social" => Some(ElementType::Social),
            "divider" => Some(ElementType::Divider),
            "image" => Some(ElementType::Image),
            _ => None,
        }
    }
}

/// One visual block within a page.
///
/// `data` holds the type-dependent optional fields (text, url, icon, image
/// src, styling attributes). All of them are optional; consumers apply
/// per-type defaults for anything missing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: String,
    #[serde(rename = "type")]
    pub element_type: ElementType,
    #[serde(default)]
    pub position: i64,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Element {
    /// A fresh element of the given type at the given position.
    pub fn new(id: impl Into<String>, element_type: ElementType, position: i64) -> Self {
        Self {
            id: id.into(),
            element_type,
            position,
            data: Map::new(),
        }
    }
}
