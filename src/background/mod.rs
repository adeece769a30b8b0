//! Background configuration subsystem: validation, style computation and
//! persistence policy.

mod persistence;
mod style;

pub use persistence::*;
pub use style::*;
