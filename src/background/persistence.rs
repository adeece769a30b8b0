//! Validated save/restore, migration and backup for background configuration.
//!
//! The actual storage calls are injected collaborators (a repository, a
//! network client, browser storage behind a bridge); this module adds the
//! page-level policy around them: validate before saving, migrate and
//! re-validate after restoring, and keep an independent background backup
//! keyed by page id for recovery outside the undo stack.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::errors::BuilderError;
use crate::models::{BackgroundGradient, BackgroundImage, BackgroundType, GradientKind, Page, Theme};

use super::style::{is_valid_gradient, is_valid_hex_color};

/// Names of the theme fields that fail validation for their declared
/// background type. Empty means the configuration is consistent.
pub fn background_config_errors(theme: &Theme) -> Vec<String> {
    let mut fields = Vec::new();

    match theme.background_type {
        // Legacy themes without a declared type validate as solid.
        None | Some(BackgroundType::Solid) => {
            if !is_valid_hex_color(&theme.background_color) {
                fields.push("backgroundColor".to_string());
            }
        }
        Some(BackgroundType::Gradient) => match &theme.background_gradient {
            None => fields.push("backgroundGradient".to_string()),
            Some(gradient) => {
                if gradient.kind == GradientKind::Unknown {
                    fields.push("backgroundGradient.type".to_string());
                }
                if gradient.colors.len() != 2
                    || !gradient.colors.iter().all(|c| is_valid_hex_color(c))
                {
                    fields.push("backgroundGradient.colors".to_string());
                }
                if !gradient.direction.is_finite()
                    || !(0.0..=360.0).contains(&gradient.direction)
                {
                    fields.push("backgroundGradient.direction".to_string());
                }
            }
        },
        Some(BackgroundType::Image) => match &theme.background_image {
            None => fields.push("backgroundImage".to_string()),
            Some(image) => {
                if image.url.trim().is_empty() {
                    fields.push("backgroundImage.url".to_string());
                }
            }
        },
        Some(BackgroundType::Unknown) => fields.push("backgroundType".to_string()),
    }

    fields
}

/// True iff the page's background configuration is internally consistent
/// for its declared type.
pub fn validate_background_config(page: &Page) -> bool {
    background_config_errors(&page.theme).is_empty()
}

/// Validate the page's background, then hand it to the injected save
/// operation. An invalid configuration rejects the save with a validation
/// error listing the offending fields; the collaborator is not called.
/// Collaborator failures surface as persistence errors, untouched otherwise.
pub async fn save_page_with_background_validation<F, Fut, E>(
    page: &Page,
    save: F,
) -> Result<(), BuilderError>
where
    F: FnOnce(Page) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: std::fmt::Display,
{
    let fields = background_config_errors(&page.theme);
    if !fields.is_empty() {
        return Err(BuilderError::Validation {
            message: format!("Invalid background configuration: {}", fields.join(", ")),
            fields,
        });
    }

    save(page.clone())
        .await
        .map_err(|err| BuilderError::Persistence(err.to_string()))
}

/// Restore a page through the injected restore operation, then migrate and
/// re-validate it. A page that is still invalid after migration comes back
/// with its background reset to solid white so the UI always has something
/// renderable; only a failing collaborator is an error.
pub async fn restore_page_with_background_validation<F, Fut, E>(
    page_id: &str,
    restore: F,
) -> Result<Page, BuilderError>
where
    F: FnOnce(String) -> Fut,
    Fut: Future<Output = Result<Page, E>>,
    E: std::fmt::Display,
{
    let restored = restore(page_id.to_string())
        .await
        .map_err(|err| BuilderError::Persistence(err.to_string()))?;

    let mut page = migrate_legacy_background(&restored);
    if !validate_background_config(&page) {
        tracing::warn!(
            page_id = %page.id,
            "restored page failed background validation, resetting to solid default"
        );
        page.theme.background_type = Some(BackgroundType::Solid);
        page.theme.background_color = "#ffffff".to_string();
    }

    Ok(page)
}

/// Normalize a legacy-shaped page: no declared background type means solid
/// with the existing color. Idempotent; an already-migrated page is
/// returned unchanged.
pub fn migrate_legacy_background(page: &Page) -> Page {
    let mut migrated = page.clone();
    if migrated.theme.background_type.is_none() {
        migrated.theme.background_type = Some(BackgroundType::Solid);
    }
    migrated
}

/// The background-relevant subset of a theme, stored as an opaque string
/// keyed by page id. Only the config active for the declared type is
/// captured.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundBackup {
    pub page_id: String,
    pub background_type: BackgroundType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_gradient: Option<BackgroundGradient>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<BackgroundImage>,
}

/// Serialize the page's active background configuration into an opaque
/// backup string.
pub fn create_background_backup(page: &Page) -> Result<String, BuilderError> {
    let background_type = page.theme.effective_background_type();

    let backup = BackgroundBackup {
        page_id: page.id.clone(),
        background_type,
        background_color: (background_type == BackgroundType::Solid)
            .then(|| page.theme.background_color.clone()),
        background_gradient: (background_type == BackgroundType::Gradient)
            .then(|| page.theme.background_gradient.clone())
            .flatten(),
        background_image: (background_type == BackgroundType::Image)
            .then(|| page.theme.background_image.clone())
            .flatten(),
    };

    Ok(serde_json::to_string(&backup)?)
}

/// Apply a backup to a page. Returns `None` when the backup does not parse,
/// belongs to a different page, or fails validation; the caller keeps the
/// current background in that case. On success the returned page has only
/// its background fields overwritten.
pub fn restore_background_from_backup(backup: &str, page: &Page) -> Option<Page> {
    let parsed: BackgroundBackup = match serde_json::from_str(backup) {
        Ok(parsed) => parsed,
        Err(err) => {
            tracing::debug!("discarding unparseable background backup: {}", err);
            return None;
        }
    };

    if parsed.page_id != page.id {
        return None;
    }

    let mut restored = page.clone();
    restored.theme.background_type = Some(parsed.background_type);
    if let Some(color) = parsed.background_color {
        restored.theme.background_color = color;
    }
    if let Some(gradient) = parsed.background_gradient {
        restored.theme.background_gradient = Some(gradient);
    }
    if let Some(image) = parsed.background_image {
        restored.theme.background_image = Some(image);
    }

    if !validate_background_config(&restored) {
        tracing::debug!(page_id = %page.id, "discarding background backup that fails validation");
        return None;
    }

    Some(restored)
}
