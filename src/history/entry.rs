//! Optimized history snapshots and their wire format.
//!
//! Snapshots keep only the fields that matter for undo/redo (no transient UI
//! state) and must survive a JSON round-trip, which cannot carry temporal
//! values natively. Loose input enters here: drafts from the editor and
//! entries read back from storage are normalized from raw JSON into a typed
//! [`Page`], repairing malformed sub-fields with documented defaults instead
//! of rejecting them. Only an absent root is an error.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::BuilderError;
use crate::models::{Element, ElementType, Page, Theme};

/// Serialization envelope for values JSON cannot carry natively. New
/// non-JSON-native kinds become additional variants without changing the
/// `__type` contract.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "__type")]
pub enum EnvelopedValue {
    Date { value: String },
}

impl EnvelopedValue {
    pub fn from_datetime(datetime: &DateTime<Utc>) -> Self {
        EnvelopedValue::Date {
            value: datetime.to_rfc3339(),
        }
    }

    /// The wrapped instant, or `None` when the value does not parse.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let EnvelopedValue::Date { value } = self;
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// Stable wire format for one history entry. Must stay backward compatible
/// so old undo stacks keep deserializing across versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SerializedHistoryEntry {
    pub id: String,
    pub title: String,
    pub slug: String,
    pub elements: Vec<Element>,
    pub theme: Theme,
    pub created_at: EnvelopedValue,
    pub updated_at: EnvelopedValue,
}

fn generated_page_id() -> String {
    format!("page-{}", Utc::now().timestamp_millis())
}

fn generated_element_id() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "element-{}-{}",
        Utc::now().timestamp_millis(),
        &suffix[..8]
    )
}

/// Reduce a page-shaped JSON value to the essential history fields, with
/// every field defensively defaulted. Fails only when the value itself is
/// absent; malformed sub-fields are repaired, not rejected.
pub fn create_optimized_history_entry(page: &Value) -> Result<Page, BuilderError> {
    if page.is_null() {
        return Err(BuilderError::InvalidInput("page is required".to_string()));
    }
    Ok(normalize_page(page))
}

/// Serialize a page into the stable wire format, wrapping temporal fields
/// in the `__type: "Date"` envelope.
pub fn serialize_history_entry(page: &Page) -> SerializedHistoryEntry {
    SerializedHistoryEntry {
        id: page.id.clone(),
        title: page.title.clone(),
        slug: page.slug.clone(),
        elements: page.elements.clone(),
        theme: page.theme.clone(),
        created_at: EnvelopedValue::from_datetime(&page.created_at),
        updated_at: EnvelopedValue::from_datetime(&page.updated_at),
    }
}

/// Serialize a page to the JSON text stored in the undo stack.
pub fn serialize_history_entry_json(page: &Page) -> Result<String, BuilderError> {
    Ok(serde_json::to_string(&serialize_history_entry(page))?)
}

/// Rebuild a page from a serialized history entry. Missing or malformed
/// fields are repaired with the same defaults used when creating entries;
/// a temporal field without a well-formed envelope falls back to now.
/// Fails only for an absent root.
pub fn deserialize_history_entry(serialized: &Value) -> Result<Page, BuilderError> {
    if serialized.is_null() {
        return Err(BuilderError::InvalidInput(
            "serialized entry is required".to_string(),
        ));
    }
    Ok(normalize_page(serialized))
}

/// Rebuild a page from undo-stack JSON text. Text that is not JSON at all
/// is a deserialization error; shape problems inside valid JSON are
/// repaired as usual.
pub fn deserialize_history_entry_json(serialized: &str) -> Result<Page, BuilderError> {
    let value: Value = serde_json::from_str(serialized)
        .map_err(|err| BuilderError::Deserialization(format!("malformed history entry: {}", err)))?;
    deserialize_history_entry(&value)
}

/// One normalization pass from loose JSON to a typed page. Shared by entry
/// creation and deserialization; both sides use the same repair table.
fn normalize_page(raw: &Value) -> Page {
    let id = raw
        .get("id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(generated_page_id);

    let title = raw
        .get("title")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let slug = raw
        .get("slug")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let elements = raw
        .get("elements")
        .and_then(Value::as_array)
        .map(|list| list.iter().map(normalize_element).collect())
        .unwrap_or_default();

    let theme = raw
        .get("theme")
        .filter(|v| v.is_object())
        .and_then(|v| serde_json::from_value::<Theme>(v.clone()).ok())
        .unwrap_or_default();

    Page {
        id,
        title,
        slug,
        elements,
        theme,
        created_at: normalize_timestamp(raw.get("createdAt")),
        updated_at: normalize_timestamp(raw.get("updatedAt")),
    }
}

fn normalize_element(raw: &Value) -> Element {
    let Some(obj) = raw.as_object() else {
        return Element::new(generated_element_id(), ElementType::Text, 0);
    };

    let id = obj
        .get("id")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(generated_element_id);

    let element_type = obj
        .get("type")
        .and_then(Value::as_str)
        .and_then(ElementType::from_str)
        .unwrap_or(ElementType::Text);

    let position = obj
        .get("position")
        .and_then(|v| v.as_i64().or_else(|| v.as_f64().map(|f| f as i64)))
        .unwrap_or(0);

    // Shallow-copied, never aliased to the input.
    let data = obj
        .get("data")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    Element {
        id,
        element_type,
        position,
        data,
    }
}

/// Accepts either the `__type: "Date"` envelope or a plain ISO-8601 string;
/// anything else is replaced with the current time.
fn normalize_timestamp(raw: Option<&Value>) -> DateTime<Utc> {
    match raw {
        Some(Value::String(text)) => DateTime::parse_from_rfc3339(text)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now()),
        Some(value) if value.is_object() => serde_json::from_value::<EnvelopedValue>(value.clone())
            .ok()
            .and_then(|env| env.to_datetime())
            .unwrap_or_else(Utc::now),
        _ => Utc::now(),
    }
}
