//! Background validation and style computation.
//!
//! Pure functions from a [`Theme`] to a renderable style descriptor. Every
//! branch degrades to a safe default (white background) instead of failing,
//! so the builder preview always has something to paint.

use serde::Serialize;

use crate::models::{BackgroundGradient, BackgroundType, GradientKind, ImagePosition, ImageSize, Theme};

/// Named compass directions and their degree values, in declaration order.
/// Ties in nearest-direction lookup resolve to the earlier entry.
const NAMED_DIRECTIONS: [(&str, f64); 8] = [
    ("to-top", 0.0),
    ("to-top-right", 45.0),
    ("to-right", 90.0),
    ("to-bottom-right", 135.0),
    ("to-bottom", 180.0),
    ("to-bottom-left", 225.0),
    ("to-left", 270.0),
    ("to-top-left", 315.0),
];

/// Renderable style descriptor computed from a theme.
///
/// Field names mirror the CSS properties the frontend applies.
/// `pending_image` is an explicit status flag: the theme declares an image
/// background but has no usable URL yet, so the solid fallback is painted
/// without reverting the declared type.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundStyle {
    pub background_type: BackgroundType,
    pub background_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub background_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    pub pending_image: bool,
}

impl BackgroundStyle {
    fn solid(color: String) -> Self {
        Self {
            background_type: BackgroundType::Solid,
            background_color: color,
            background_image: None,
            background_size: None,
            background_position: None,
            filter: None,
            pending_image: false,
        }
    }
}

/// True iff `value` is a `#RGB` or `#RRGGBB` hex color. No alpha forms.
pub fn is_valid_hex_color(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    matches!(digits.len(), 3 | 6) && digits.chars().all(|c| c.is_ascii_hexdigit())
}

/// True iff the gradient has a known kind, exactly two valid hex colors and
/// a direction within [0, 360] degrees.
pub fn is_valid_gradient(gradient: &BackgroundGradient) -> bool {
    if gradient.kind == GradientKind::Unknown {
        return false;
    }
    if gradient.colors.len() != 2 {
        return false;
    }
    if !gradient.colors.iter().all(|c| is_valid_hex_color(c)) {
        return false;
    }
    gradient.direction.is_finite() && (0.0..=360.0).contains(&gradient.direction)
}

/// Build the CSS gradient string. An unknown kind falls back to the linear
/// form; a missing direction defaults to 90 degrees.
pub fn generate_gradient_css(kind: GradientKind, colors: &[String], direction: Option<f64>) -> String {
    let first = colors.first().map(String::as_str).unwrap_or("#ffffff");
    let second = colors.get(1).map(String::as_str).unwrap_or(first);

    match kind {
        GradientKind::Radial => format!("radial-gradient(circle, {}, {})", first, second),
        GradientKind::Linear | GradientKind::Unknown => {
            format!(
                "linear-gradient({}deg, {}, {})",
                direction.unwrap_or(90.0),
                first,
                second
            )
        }
    }
}

/// Degree value for a named compass direction.
pub fn direction_degrees(name: &str) -> Option<f64> {
    NAMED_DIRECTIONS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, deg)| *deg)
}

/// Nearest named compass direction for a degree value, with wrap-around at
/// 360. Ties resolve to the first-declared name.
pub fn direction_name(degrees: f64) -> &'static str {
    let degrees = if degrees.is_finite() {
        degrees.rem_euclid(360.0)
    } else {
        90.0
    };

    let mut best = NAMED_DIRECTIONS[0].0;
    let mut best_distance = f64::MAX;
    for (name, value) in NAMED_DIRECTIONS {
        let raw = (degrees - value).abs();
        let distance = raw.min(360.0 - raw);
        if distance < best_distance {
            best = name;
            best_distance = distance;
        }
    }
    best
}

/// Compute the renderable style for a theme.
///
/// Dispatches on the declared background type; a legacy theme without one
/// behaves as solid. Invalid configurations fall back to the theme's solid
/// color (or white), never to a panic.
pub fn background_style(theme: &Theme) -> BackgroundStyle {
    let fallback = fallback_color(theme);

    match theme.effective_background_type() {
        BackgroundType::Solid => BackgroundStyle::solid(fallback),
        BackgroundType::Gradient => match &theme.background_gradient {
            Some(gradient) if is_valid_gradient(gradient) => BackgroundStyle {
                background_type: BackgroundType::Gradient,
                background_color: fallback,
                background_image: Some(generate_gradient_css(
                    gradient.kind,
                    &gradient.colors,
                    Some(gradient.direction),
                )),
                background_size: None,
                background_position: None,
                filter: None,
                pending_image: false,
            },
            _ => BackgroundStyle::solid(fallback),
        },
        BackgroundType::Image => match &theme.background_image {
            Some(image) if !image.url.trim().is_empty() => {
                // Any out-of-range blur means "no blur", not the nearest bound.
                let blur = if image.blur.is_finite() && (0.0..=20.0).contains(&image.blur) {
                    image.blur
                } else {
                    0.0
                };
                let position = match image.position {
                    ImagePosition::Unknown => ImagePosition::Center,
                    other => other,
                };
                let size = match image.size {
                    ImageSize::Unknown => ImageSize::Cover,
                    other => other,
                };

                BackgroundStyle {
                    background_type: BackgroundType::Image,
                    background_color: fallback,
                    background_image: Some(format!("url({})", image.url)),
                    background_size: Some(size.as_str().to_string()),
                    background_position: Some(position.as_str().to_string()),
                    filter: (blur > 0.0).then(|| format!("blur({}px)", blur)),
                    pending_image: false,
                }
            }
            // No usable URL yet: paint the solid fallback but keep the
            // declared type so in-progress configuration is not lost.
            _ => BackgroundStyle {
                background_type: BackgroundType::Image,
                pending_image: true,
                ..BackgroundStyle::solid(fallback)
            },
        },
        BackgroundType::Unknown => BackgroundStyle::solid(fallback),
    }
}

fn fallback_color(theme: &Theme) -> String {
    if is_valid_hex_color(&theme.background_color) {
        theme.background_color.clone()
    } else {
        "#ffffff".to_string()
    }
}

/// Caller-owned diagnostic tracker for the last resolved background type.
///
/// Advisory only: [`background_style`] stays a pure function of its input
/// and the session never changes a result for a given theme.
#[derive(Debug, Default)]
pub struct StyleSession {
    last_resolved: Option<BackgroundType>,
}

impl StyleSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compute a style and record which type it resolved to.
    pub fn observe(&mut self, theme: &Theme) -> BackgroundStyle {
        let style = background_style(theme);
        self.last_resolved = Some(style.background_type);
        style
    }

    pub fn last_resolved(&self) -> Option<BackgroundType> {
        self.last_resolved
    }

    pub fn reset(&mut self) {
        self.last_resolved = None;
    }
}
