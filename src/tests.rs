//! Integration tests for the builder state core.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::{json, Value};
use tempfile::TempDir;

use crate::background::{
    background_config_errors, background_style, create_background_backup,
    migrate_legacy_background, restore_background_from_backup,
    restore_page_with_background_validation, save_page_with_background_validation,
    validate_background_config, StyleSession,
};
use crate::db::{init_database, Repository};
use crate::errors::{codes, BuilderError, ErrorDetails};
use crate::history::{
    create_optimized_history_entry, deserialize_history_entry, serialize_history_entry,
    serialize_history_entry_json, HistoryStack,
};
use crate::models::{
    BackgroundGradient, BackgroundImage, BackgroundType, Element, ElementType, GradientKind,
    ImagePosition, ImageSize, Page, Theme,
};

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .try_init()
        .ok();
}

fn gradient_theme() -> Theme {
    Theme {
        background_color: "#FF5733".to_string(),
        background_type: Some(BackgroundType::Gradient),
        background_gradient: Some(BackgroundGradient {
            kind: GradientKind::Linear,
            direction: 45.0,
            colors: vec!["#FF5733".to_string(), "#3366FF".to_string()],
        }),
        ..Theme::default()
    }
}

fn sample_page() -> Page {
    let mut page = Page::new("page-1", "My Links", "my-links");
    page.elements = vec![
        Element::new("el-1", ElementType::Profile, 0),
        Element::new("el-2", ElementType::Link, 1),
        Element::new("el-3", ElementType::Text, 2),
    ];
    page.theme = gradient_theme();
    page
}

// ==================== STYLE COMPUTATION ====================

#[test]
fn test_solid_style() {
    let theme = Theme {
        background_color: "#FF5733".to_string(),
        background_type: Some(BackgroundType::Solid),
        ..Theme::default()
    };

    let style = background_style(&theme);
    assert_eq!(style.background_type, BackgroundType::Solid);
    assert_eq!(style.background_color, "#FF5733");
    assert!(style.background_image.is_none());
    assert!(!style.pending_image);
}

#[test]
fn test_solid_style_invalid_color_falls_back_to_white() {
    let theme = Theme {
        background_color: "tomato".to_string(),
        background_type: Some(BackgroundType::Solid),
        ..Theme::default()
    };

    let style = background_style(&theme);
    assert_eq!(style.background_color.to_lowercase(), "#ffffff");
}

#[test]
fn test_gradient_style() {
    let style = background_style(&gradient_theme());
    assert_eq!(style.background_type, BackgroundType::Gradient);
    assert_eq!(
        style.background_image.as_deref(),
        Some("linear-gradient(45deg, #FF5733, #3366FF)")
    );
    // Solid color kept as fallback paint
    assert_eq!(style.background_color, "#FF5733");
}

#[test]
fn test_invalid_gradient_falls_back_to_solid() {
    let mut theme = gradient_theme();
    theme.background_gradient.as_mut().unwrap().direction = -50.0;

    let style = background_style(&theme);
    assert_eq!(style.background_type, BackgroundType::Solid);
    assert_eq!(style.background_color, "#FF5733");
    assert!(style.background_image.is_none());
}

#[test]
fn test_image_style() {
    let theme = Theme {
        background_type: Some(BackgroundType::Image),
        background_image: Some(BackgroundImage {
            url: "https://x/y.jpg".to_string(),
            blur: 5.0,
            position: ImagePosition::Center,
            size: ImageSize::Cover,
        }),
        ..Theme::default()
    };

    let style = background_style(&theme);
    assert_eq!(style.background_type, BackgroundType::Image);
    assert!(style.background_image.unwrap().contains("https://x/y.jpg"));
    assert_eq!(style.background_size.as_deref(), Some("cover"));
    assert_eq!(style.background_position.as_deref(), Some("center"));
    assert!(style.filter.unwrap().contains("blur(5px)"));
}

#[test]
fn test_image_style_out_of_range_blur_means_no_blur() {
    let theme = Theme {
        background_type: Some(BackgroundType::Image),
        background_image: Some(BackgroundImage {
            url: "https://x/y.jpg".to_string(),
            blur: 25.0,
            position: ImagePosition::Top,
            size: ImageSize::Contain,
        }),
        ..Theme::default()
    };

    let style = background_style(&theme);
    assert!(style.filter.is_none());
    assert_eq!(style.background_size.as_deref(), Some("contain"));
    assert_eq!(style.background_position.as_deref(), Some("top"));
}

#[test]
fn test_image_style_empty_url_keeps_declared_type() {
    let theme = Theme {
        background_color: "#3366FF".to_string(),
        background_type: Some(BackgroundType::Image),
        background_image: Some(BackgroundImage {
            url: "   ".to_string(),
            blur: 0.0,
            position: ImagePosition::Center,
            size: ImageSize::Cover,
        }),
        ..Theme::default()
    };

    let style = background_style(&theme);
    // Declared type survives an in-progress (empty) URL
    assert_eq!(style.background_type, BackgroundType::Image);
    assert!(style.pending_image);
    assert_eq!(style.background_color, "#3366FF");
    assert!(style.background_image.is_none());
}

#[test]
fn test_unrecognized_type_yields_white_fallback() {
    let theme: Theme = serde_json::from_value(json!({ "backgroundType": "unknown" })).unwrap();
    let style = background_style(&theme);
    assert_eq!(style.background_color.to_lowercase(), "#ffffff");
}

#[test]
fn test_style_session_is_advisory() {
    let mut session = StyleSession::new();
    assert_eq!(session.last_resolved(), None);

    let theme = gradient_theme();
    let direct = background_style(&theme);
    let observed = session.observe(&theme);

    assert_eq!(direct, observed);
    assert_eq!(session.last_resolved(), Some(BackgroundType::Gradient));

    session.reset();
    assert_eq!(session.last_resolved(), None);
}

// ==================== PAGE INVARIANTS ====================

#[test]
fn test_reindex_elements_restores_position_invariant() {
    let mut page = sample_page();
    page.elements.swap(0, 2);
    page.elements.push(Element::new("el-4", ElementType::Divider, 99));

    page.reindex_elements();

    for (index, element) in page.elements.iter().enumerate() {
        assert_eq!(element.position, index as i64);
    }
}

#[test]
fn test_validation_error_details_carry_fields() {
    let err = BuilderError::Validation {
        message: "Invalid background configuration".to_string(),
        fields: vec!["backgroundGradient.direction".to_string()],
    };

    let details = ErrorDetails::new(&err);
    assert_eq!(details.code, codes::VALIDATION_ERROR);
    assert_eq!(
        details.details.unwrap()["fields"][0],
        "backgroundGradient.direction"
    );
}

// ==================== VALIDATION & MIGRATION ====================

#[test]
fn test_validate_background_config() {
    let mut page = sample_page();
    assert!(validate_background_config(&page));

    page.theme.background_gradient.as_mut().unwrap().direction = -50.0;
    assert!(!validate_background_config(&page));

    let fields = background_config_errors(&page.theme);
    assert_eq!(fields, vec!["backgroundGradient.direction".to_string()]);

    // The same invalid theme still yields a renderable style
    let style = background_style(&page.theme);
    assert_eq!(style.background_type, BackgroundType::Solid);
}

#[test]
fn test_validate_gradient_color_count() {
    let mut page = sample_page();
    page.theme
        .background_gradient
        .as_mut()
        .unwrap()
        .colors
        .push("#000000".to_string());

    let fields = background_config_errors(&page.theme);
    assert_eq!(fields, vec!["backgroundGradient.colors".to_string()]);
}

#[test]
fn test_validate_missing_image_config() {
    let mut page = sample_page();
    page.theme.background_type = Some(BackgroundType::Image);
    page.theme.background_image = None;

    let fields = background_config_errors(&page.theme);
    assert_eq!(fields, vec!["backgroundImage".to_string()]);
}

#[test]
fn test_migration_is_idempotent() {
    let mut legacy = sample_page();
    legacy.theme.background_type = None;

    let once = migrate_legacy_background(&legacy);
    assert_eq!(once.theme.background_type, Some(BackgroundType::Solid));

    let twice = migrate_legacy_background(&once);
    assert_eq!(once, twice);

    // Already-declared types are untouched
    let gradient = sample_page();
    assert_eq!(migrate_legacy_background(&gradient), gradient);
}

// ==================== SAVE / RESTORE ====================

#[tokio::test]
async fn test_save_rejects_invalid_background_without_calling_collaborator() {
    let mut page = sample_page();
    page.theme.background_gradient.as_mut().unwrap().direction = 400.0;

    let called = Arc::new(AtomicBool::new(false));
    let flag = called.clone();

    let result = save_page_with_background_validation(&page, move |page| {
        flag.store(true, Ordering::SeqCst);
        async move {
            drop(page);
            Ok::<(), BuilderError>(())
        }
    })
    .await;

    let err = result.unwrap_err();
    assert_eq!(err.error_code(), codes::VALIDATION_ERROR);
    assert_eq!(err.fields().to_vec(), vec!["backgroundGradient.direction".to_string()]);
    assert!(!called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_save_calls_collaborator_for_valid_page() {
    let page = sample_page();
    let called = Arc::new(AtomicBool::new(false));
    let flag = called.clone();

    save_page_with_background_validation(&page, move |saved| {
        flag.store(true, Ordering::SeqCst);
        async move {
            assert_eq!(saved.id, "page-1");
            Ok::<(), BuilderError>(())
        }
    })
    .await
    .unwrap();

    assert!(called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn test_save_collaborator_error_surfaces_as_persistence() {
    let page = sample_page();

    let err = save_page_with_background_validation(&page, |_page| async {
        Err::<(), String>("disk full".to_string())
    })
    .await
    .unwrap_err();

    assert_eq!(err.error_code(), codes::PERSISTENCE_ERROR);
    assert!(err.message().contains("disk full"));
}

#[tokio::test]
async fn test_restore_migrates_legacy_page() {
    let mut legacy = sample_page();
    legacy.theme = Theme {
        background_color: "#3366FF".to_string(),
        background_type: None,
        background_gradient: None,
        background_image: None,
        ..Theme::default()
    };

    let restored = restore_page_with_background_validation("page-1", move |_id| async move {
        Ok::<Page, BuilderError>(legacy)
    })
    .await
    .unwrap();

    assert_eq!(restored.theme.background_type, Some(BackgroundType::Solid));
    assert_eq!(restored.theme.background_color, "#3366FF");
}

#[tokio::test]
async fn test_restore_resets_unfixable_background_to_solid_white() {
    let mut broken = sample_page();
    broken.theme.background_gradient.as_mut().unwrap().colors = vec!["nope".to_string()];

    let restored = restore_page_with_background_validation("page-1", move |_id| async move {
        Ok::<Page, BuilderError>(broken)
    })
    .await
    .unwrap();

    assert_eq!(restored.theme.background_type, Some(BackgroundType::Solid));
    assert_eq!(restored.theme.background_color, "#ffffff");
}

#[tokio::test]
async fn test_restore_collaborator_error_surfaces() {
    let err = restore_page_with_background_validation("page-1", |_id| async {
        Err::<Page, String>("not reachable".to_string())
    })
    .await
    .unwrap_err();

    assert_eq!(err.error_code(), codes::PERSISTENCE_ERROR);
}

// ==================== BACKGROUND BACKUPS ====================

#[test]
fn test_backup_round_trip_onto_another_page_state() {
    let original = sample_page();
    let backup = create_background_backup(&original).unwrap();

    // Same page, different background and an unrelated theme tweak
    let mut other = sample_page();
    other.theme.background_type = Some(BackgroundType::Solid);
    other.theme.background_gradient = None;
    other.theme.background_color = "#000000".to_string();
    other.theme.primary_color = "#123456".to_string();

    let restored = restore_background_from_backup(&backup, &other).unwrap();
    assert_eq!(restored.theme.background_type, Some(BackgroundType::Gradient));
    assert_eq!(
        restored.theme.background_gradient,
        original.theme.background_gradient
    );
    // Non-background theme fields stay untouched
    assert_eq!(restored.theme.primary_color, "#123456");
}

#[test]
fn test_backup_ignores_other_pages() {
    let original = sample_page();
    let backup = create_background_backup(&original).unwrap();

    let mut other = sample_page();
    other.id = "page-2".to_string();

    assert!(restore_background_from_backup(&backup, &other).is_none());
}

#[test]
fn test_backup_rejects_garbage_and_invalid_payloads() {
    let page = sample_page();
    assert!(restore_background_from_backup("not json at all", &page).is_none());

    // A backup whose payload no longer validates is discarded too
    let tampered = json!({
        "pageId": "page-1",
        "backgroundType": "gradient",
        "backgroundGradient": {
            "type": "linear",
            "direction": 1000.0,
            "colors": ["#FF5733", "#3366FF"]
        }
    })
    .to_string();
    assert!(restore_background_from_backup(&tampered, &page).is_none());
}

#[test]
fn test_backup_captures_only_active_config() {
    let page = sample_page();
    let backup: Value = serde_json::from_str(&create_background_backup(&page).unwrap()).unwrap();

    assert_eq!(backup["pageId"], "page-1");
    assert_eq!(backup["backgroundType"], "gradient");
    assert!(backup.get("backgroundColor").is_none());
    assert!(backup.get("backgroundImage").is_none());
    assert!(backup["backgroundGradient"].is_object());
}

// ==================== HISTORY ENTRIES ====================

#[test]
fn test_create_entry_requires_a_page() {
    let err = create_optimized_history_entry(&Value::Null).unwrap_err();
    assert_eq!(err.error_code(), codes::INVALID_INPUT);
}

#[test]
fn test_create_entry_defaults_everything() {
    let entry = create_optimized_history_entry(&json!({})).unwrap();

    assert!(entry.id.starts_with("page-"));
    assert_eq!(entry.title, "");
    assert_eq!(entry.slug, "");
    assert!(entry.elements.is_empty());
    assert_eq!(entry.theme, Theme::default());
    assert!((chrono::Utc::now() - entry.created_at).num_seconds() < 5);
}

#[test]
fn test_create_entry_repairs_malformed_elements() {
    let entry = create_optimized_history_entry(&json!({
        "id": "page-9",
        "title": "Repaired",
        "elements": [
            42,
            { "type": "link", "position": "first", "data": { "url": "https://a.example" } },
            { "id": "keep-me", "type": "hologram", "position": 7 }
        ]
    }))
    .unwrap();

    assert_eq!(entry.elements.len(), 3);

    // Non-object element becomes a default text element
    assert!(entry.elements[0].id.starts_with("element-"));
    assert_eq!(entry.elements[0].element_type, ElementType::Text);
    assert_eq!(entry.elements[0].position, 0);
    assert!(entry.elements[0].data.is_empty());

    // Non-numeric position repaired to 0, data copied
    assert_eq!(entry.elements[1].element_type, ElementType::Link);
    assert_eq!(entry.elements[1].position, 0);
    assert_eq!(
        entry.elements[1].data.get("url").and_then(Value::as_str),
        Some("https://a.example")
    );

    // Unrecognized type normalizes to text, id kept
    assert_eq!(entry.elements[2].id, "keep-me");
    assert_eq!(entry.elements[2].element_type, ElementType::Text);
    assert_eq!(entry.elements[2].position, 7);
}

#[test]
fn test_create_entry_does_not_alias_input_data() {
    let raw = json!({
        "id": "page-9",
        "elements": [{ "id": "el-1", "type": "text", "position": 0, "data": { "text": "hi" } }]
    });

    let mut entry = create_optimized_history_entry(&raw).unwrap();
    entry.elements[0]
        .data
        .insert("text".to_string(), json!("changed"));

    assert_eq!(raw["elements"][0]["data"]["text"], "hi");
}

#[test]
fn test_serialized_wire_format() {
    let page = sample_page();
    let wire: Value =
        serde_json::from_str(&serialize_history_entry_json(&page).unwrap()).unwrap();

    assert_eq!(wire["id"], "page-1");
    assert_eq!(wire["title"], "My Links");
    assert_eq!(wire["slug"], "my-links");
    assert_eq!(wire["createdAt"]["__type"], "Date");
    assert!(wire["createdAt"]["value"].is_string());
    assert_eq!(wire["updatedAt"]["__type"], "Date");
    assert_eq!(wire["elements"][0]["type"], "profile");
    assert_eq!(wire["theme"]["backgroundType"], "gradient");
}

#[test]
fn test_history_round_trip() {
    let page = sample_page();

    let wire = serde_json::to_value(serialize_history_entry(&page)).unwrap();
    let rebuilt = deserialize_history_entry(&wire).unwrap();

    assert_eq!(rebuilt, page);
    assert_eq!(rebuilt.created_at, page.created_at);
    assert_eq!(rebuilt.updated_at, page.updated_at);
}

#[test]
fn test_deserialize_requires_input_and_repairs_dates() {
    let err = deserialize_history_entry(&Value::Null).unwrap_err();
    assert_eq!(err.error_code(), codes::INVALID_INPUT);

    // A timestamp without the envelope falls back to now
    let rebuilt = deserialize_history_entry(&json!({
        "id": "page-9",
        "createdAt": { "wrong": "shape" },
        "updatedAt": 12345
    }))
    .unwrap();
    assert!((chrono::Utc::now() - rebuilt.created_at).num_seconds() < 5);
    assert!((chrono::Utc::now() - rebuilt.updated_at).num_seconds() < 5);
}

// ==================== HISTORY STACK ====================

#[test]
fn test_stack_undo_redo_cycle() {
    let mut stack = HistoryStack::new(10);

    let state_a = sample_page();
    let mut state_b = sample_page();
    state_b.title = "Renamed".to_string();
    state_b.touch();

    // Outgoing state is pushed before the mutation is applied
    stack.push(&state_a).unwrap();
    assert!(stack.can_undo());
    assert!(!stack.can_redo());

    let undone = stack.undo(&state_b).unwrap();
    assert_eq!(undone.title, "My Links");
    assert!(stack.can_redo());

    let redone = stack.redo(&undone).unwrap();
    assert_eq!(redone.title, "Renamed");
    assert!(stack.can_undo());
    assert!(!stack.can_redo());
}

#[test]
fn test_stack_push_invalidates_redo_branch() {
    let mut stack = HistoryStack::new(10);
    let state_a = sample_page();
    let mut state_b = sample_page();
    state_b.title = "B".to_string();

    stack.push(&state_a).unwrap();
    stack.undo(&state_b).unwrap();
    assert!(stack.can_redo());

    stack.push(&state_a).unwrap();
    assert!(!stack.can_redo());
}

#[test]
fn test_stack_evicts_oldest_past_capacity() {
    let mut stack = HistoryStack::new(3);

    for i in 0..5 {
        let mut page = sample_page();
        page.title = format!("state-{}", i);
        stack.push(&page).unwrap();
    }
    assert_eq!(stack.len(), 3);

    let current = sample_page();
    // Most recent states survive; the two oldest were evicted
    assert_eq!(stack.undo(&current).unwrap().title, "state-4");
    assert_eq!(stack.undo(&current).unwrap().title, "state-3");
    assert_eq!(stack.undo(&current).unwrap().title, "state-2");
    assert!(stack.undo(&current).is_none());
}

#[test]
fn test_stack_capacity_has_a_floor() {
    // A zero capacity would make every push evict itself
    assert_eq!(HistoryStack::new(0).capacity(), 1);
    assert_eq!(
        HistoryStack::new(crate::config::DEFAULT_HISTORY_CAPACITY).capacity(),
        crate::config::DEFAULT_HISTORY_CAPACITY
    );
}

#[test]
fn test_stack_skips_corrupt_entries() {
    init_tracing();

    let mut stack = HistoryStack::new(10);
    let good = sample_page();
    stack.push(&good).unwrap();
    stack.inject_raw("{ definitely not json".to_string());

    // The corrupt top entry is skipped, the good one below still undoes
    let current = sample_page();
    let undone = stack.undo(&current).unwrap();
    assert_eq!(undone.id, "page-1");
}

// ==================== REPOSITORY ====================

#[tokio::test]
async fn test_repository_page_round_trip() {
    init_tracing();
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let pool = init_database(&temp_dir.path().join("test.sqlite"))
        .await
        .expect("Failed to init DB");
    let repo = Repository::new(pool);

    let page = sample_page();
    repo.save_page(&page).await.unwrap();

    let loaded = repo.get_page("page-1").await.unwrap().unwrap();
    assert_eq!(loaded, page);

    assert_eq!(repo.list_page_ids().await.unwrap(), vec!["page-1"]);

    repo.delete_page("page-1").await.unwrap();
    assert!(repo.get_page("page-1").await.unwrap().is_none());
}

#[tokio::test]
async fn test_repository_backup_store() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let pool = init_database(&temp_dir.path().join("test.sqlite"))
        .await
        .expect("Failed to init DB");
    let repo = Repository::new(pool);

    let page = sample_page();
    let backup = create_background_backup(&page).unwrap();

    repo.put_backup(&page.id, &backup).await.unwrap();
    let stored = repo.get_backup(&page.id).await.unwrap().unwrap();
    assert_eq!(stored, backup);

    // Blob stays opaque but must restore cleanly
    let restored = restore_background_from_backup(&stored, &page).unwrap();
    assert_eq!(restored.theme, page.theme);

    repo.delete_backup(&page.id).await.unwrap();
    assert!(repo.get_backup(&page.id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_and_restore_through_repository() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let pool = init_database(&temp_dir.path().join("test.sqlite"))
        .await
        .expect("Failed to init DB");
    let repo = Repository::new(pool);

    let mut page = sample_page();
    page.theme.background_type = None; // legacy shape on disk

    let save_repo = repo.clone();
    save_page_with_background_validation(&page, move |page| async move {
        save_repo.save_page(&page).await
    })
    .await
    .unwrap();

    let restore_repo = repo.clone();
    let restored = restore_page_with_background_validation("page-1", move |id| async move {
        restore_repo
            .get_page(&id)
            .await?
            .ok_or_else(|| BuilderError::Persistence(format!("Page {} not found", id)))
    })
    .await
    .unwrap();

    // Legacy shape was migrated on the way back in
    assert_eq!(restored.theme.background_type, Some(BackgroundType::Solid));
    assert_eq!(restored.id, page.id);
    assert_eq!(restored.elements, page.elements);
}
