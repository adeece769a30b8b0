//! Bio-link Builder State Core
//!
//! State management core for the bio-link page builder: background
//! configuration validation and styling, validated save/restore with
//! migration and backups, and an optimized undo/redo history over
//! serialized page snapshots. Storage is injected by the application; a
//! sqlite-backed [`db::Repository`] is provided for local persistence.

pub mod background;
pub mod config;
pub mod db;
pub mod errors;
pub mod history;
pub mod models;

#[cfg(test)]
mod tests;
