//! Data models for the bio-link page builder.
//!
//! These models match the frontend TypeScript interfaces exactly for seamless
//! interoperability.

mod element;
mod page;
mod theme;

pub use element::*;
pub use page::*;
pub use theme::*;
