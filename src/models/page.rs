//! Page model matching the frontend Page interface.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Element, Theme};

/// The persisted unit edited by the builder: ordered elements plus a theme.
///
/// Invariants: element ids are unique within the page and
/// `elements[i].position` reflects the element's index. `updated_at` is
/// refreshed on every accepted mutation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub theme: Theme,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Page {
    /// A new empty page with default theme and both timestamps set to now.
    pub fn new(id: impl Into<String>, title: impl Into<String>, slug: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            title: title.into(),
            slug: slug.into(),
            elements: Vec::new(),
            theme: Theme::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh `updated_at`. Call after every accepted mutation.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Rewrite element positions to match their order in the list.
    pub fn reindex_elements(&mut self) {
        for (index, element) in self.elements.iter_mut().enumerate() {
            element.position = index as i64;
        }
    }
}
