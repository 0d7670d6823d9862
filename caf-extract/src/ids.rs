//! Heading text → (identifier, title).
//!
//! Headings look like `Objective A - Managing security risk`,
//! `Principle A1 Governance` (or just `A1 Governance`) and
//! `A1.a Board Direction`.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{ExtractError, Level};

static OBJECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^objective\s+([a-z])\b\s*[-–—:]?\s*(.+)$").expect("objective heading regex")
});
static PRINCIPLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:principle\s+)?([a-z]\d+)\b\s*[-–—:.]?\s*(.+)$")
        .expect("principle heading regex")
});
static OUTCOME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^([a-z]\d+)\.([a-z])\b\s*[-–—:.]?\s*(.+)$").expect("outcome heading regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub id: String,
    pub title: String,
}

pub fn objective(heading: &str) -> Result<Heading, ExtractError> {
    let caps = OBJECTIVE.captures(heading).ok_or_else(|| bad(Level::Objective, heading))?;
    Ok(Heading {
        id: caps[1].to_ascii_uppercase(),
        title: caps[2].trim().to_string(),
    })
}

/// Parse a principle heading and check it sits under `objective_id`.
pub fn principle(heading: &str, objective_id: &str) -> Result<Heading, ExtractError> {
    let caps = PRINCIPLE.captures(heading).ok_or_else(|| bad(Level::Principle, heading))?;
    let id = caps[1].to_ascii_uppercase();
    if !id.starts_with(objective_id) {
        return Err(ExtractError::Lineage {
            level: Level::Principle,
            id,
            parent: objective_id.to_string(),
        });
    }
    Ok(Heading {
        id,
        title: caps[2].trim().to_string(),
    })
}

/// Parse an outcome heading and check it sits under `principle_id`.
pub fn outcome(heading: &str, principle_id: &str) -> Result<Heading, ExtractError> {
    let caps = OUTCOME.captures(heading).ok_or_else(|| bad(Level::Outcome, heading))?;
    let parent = caps[1].to_ascii_uppercase();
    let id = format!("{parent}.{}", caps[2].to_ascii_lowercase());
    if parent != principle_id {
        return Err(ExtractError::Lineage {
            level: Level::Outcome,
            id,
            parent: principle_id.to_string(),
        });
    }
    Ok(Heading {
        id,
        title: caps[3].trim().to_string(),
    })
}

fn bad(level: Level, heading: &str) -> ExtractError {
    ExtractError::BadHeading {
        level,
        heading: heading.to_string(),
    }
}
