//! In-memory model of the NCSC Cyber Assessment Framework and its JSON form.
//!
//! - [`model`]: Objective → Principle → Outcome → Indicator records
//! - [`json`]: deterministic pretty JSON encoding, decoding and file output
//!
//! ```rust
//! use caf_framework::{json, FrameworkDocument};
//!
//! let doc = FrameworkDocument::default();
//! let text = json::to_json(&doc).unwrap();
//! assert_eq!(json::from_json(&text).unwrap(), doc);
//! ```
pub mod json;
pub mod model;

pub use json::FrameworkError;
pub use model::{
    AchievementLevel, Counts, FrameworkDocument, Indicator, LevelColumn, Objective, Outcome,
    Principle,
};
