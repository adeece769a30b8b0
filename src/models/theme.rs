//! Theme model matching the frontend Theme interface.
//!
//! Legacy pages may carry a theme without `backgroundType`; those parse with
//! `background_type: None` and are normalized by the migration in
//! `background::persistence`. Unrecognized enum strings land on the explicit
//! `Unknown` variant instead of failing deserialization, so loose input is
//! repaired at the boundary rather than rejected.

use serde::{Deserialize, Serialize};

/// Declared background type of a theme.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    Solid,
    Gradient,
    Image,
    #[serde(other)]
    Unknown,
}

impl BackgroundType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackgroundType::Solid => "solid",
            BackgroundType::Gradient => "gradient",
            BackgroundType::Image => "image",
            BackgroundType::Unknown => "unknown",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "solid" => Some(BackgroundType::Solid),
            "gradient" => Some(BackgroundType::Gradient),
            "image" => Some(BackgroundType::Image),
            _ => None,
        }
    }
}

/// Gradient shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    Linear,
    Radial,
    #[serde(other)]
    Unknown,
}

impl GradientKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GradientKind::Linear => "linear",
            GradientKind::Radial => "radial",
            GradientKind::Unknown => "unknown",
        }
    }
}

/// Placement of a background image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImagePosition {
    #[default]
    Center,
    Top,
    Bottom,
    #[serde(other)]
    Unknown,
}

impl ImagePosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImagePosition::Center => "center",
            ImagePosition::Top => "top",
            ImagePosition::Bottom => "bottom",
            ImagePosition::Unknown => "unknown",
        }
    }
}

/// Scaling of a background image.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageSize {
    #[default]
    Cover,
    Contain,
    #[serde(other)]
    Unknown,
}

impl ImageSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageSize::Cover => "cover",
            ImageSize::Contain => "contain",
            ImageSize::Unknown => "unknown",
        }
    }
}

/// Gradient background configuration.
///
/// Valid iff `kind` is linear or radial, `colors` holds exactly two hex
/// colors and `direction` is within [0, 360] degrees.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundGradient {
    #[serde(rename = "type")]
    pub kind: GradientKind,
    #[serde(default = "default_direction")]
    pub direction: f64,
    #[serde(default)]
    pub colors: Vec<String>,
}

fn default_direction() -> f64 {
    90.0
}

/// Image background configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundImage {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub blur: f64,
    #[serde(default)]
    pub position: ImagePosition,
    #[serde(default)]
    pub size: ImageSize,
}

/// Page-level styling including the background configuration.
///
/// The gradient and image configs are retained even while another background
/// type is active, so switching types back and forth does not lose previously
/// entered settings. Only the config matching `background_type` is
/// authoritative for rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Theme {
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default = "default_primary_color")]
    pub primary_color: String,
    #[serde(default = "default_secondary_color")]
    pub secondary_color: String,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Absent on legacy pages; migration fills in `Solid`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_type: Option<BackgroundType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_gradient: Option<BackgroundGradient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<BackgroundImage>,
}

fn default_background_color() -> String {
    "#ffffff".to_string()
}

fn default_primary_color() -> String {
    "#000000".to_string()
}

fn default_secondary_color() -> String {
    "#666666".to_string()
}

fn default_font_family() -> String {
    "Inter".to_string()
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background_color: default_background_color(),
            primary_color: default_primary_color(),
            secondary_color: default_secondary_color(),
            font_family: default_font_family(),
            background_type: Some(BackgroundType::Solid),
            background_gradient: None,
            background_image: None,
        }
    }
}

impl Theme {
    /// The background type used for rendering and validation dispatch.
    /// Legacy themes without a declared type behave as solid.
    pub fn effective_background_type(&self) -> BackgroundType {
        self.background_type.unwrap_or(BackgroundType::Solid)
    }
}
