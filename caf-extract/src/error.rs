use std::fmt;

use caf_common::CafError;
use thiserror::Error;

/// Hierarchy level an extraction failure was detected at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Page,
    Objective,
    Principle,
    Outcome,
    IndicatorTable,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Page => "page",
            Level::Objective => "objective",
            Level::Principle => "principle",
            Level::Outcome => "outcome",
            Level::IndicatorTable => "indicator table",
        })
    }
}

/// Every variant means the page no longer looks the way the markers expect.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{level}: nothing matches `{marker}` in {context}")]
    MissingMarker {
        level: Level,
        marker: &'static str,
        context: String,
    },

    #[error("{level}: heading {heading:?} does not match the expected pattern")]
    BadHeading { level: Level, heading: String },

    #[error("{level} {id} is not nested under {parent}")]
    Lineage {
        level: Level,
        id: String,
        parent: String,
    },

    #[error("identifier {id} appears twice within the same parent")]
    DuplicateId { id: String },

    #[error("indicator table of {outcome}: {reason}")]
    Table { outcome: String, reason: String },

    #[error("invalid marker selector `{selector}`: {reason}")]
    Selector {
        selector: &'static str,
        reason: String,
    },
}

impl ExtractError {
    pub fn level(&self) -> Level {
        match self {
            ExtractError::MissingMarker { level, .. }
            | ExtractError::BadHeading { level, .. }
            | ExtractError::Lineage { level, .. } => *level,
            ExtractError::DuplicateId { .. } | ExtractError::Selector { .. } => Level::Page,
            ExtractError::Table { .. } => Level::IndicatorTable,
        }
    }
}

impl From<ExtractError> for CafError {
    fn from(err: ExtractError) -> Self {
        CafError::StructureMismatch(err.to_string())
    }
}
