//! Indicators of Good Practice tables.
//!
//! The site lays each outcome's indicators out as a three-row table:
//!
//! 1. `th` cells naming the achievement levels, one column each
//! 2. `td` cells with the qualifier for that column
//! 3. `td` cells holding one `p` per indicator statement
//!
//! Indicators are emitted column by column, so all statements of the first
//! level come before those of the second. Every column is recorded in
//! `columns`, including ones with no qualifier and no statements.

use std::collections::HashSet;

use caf_framework::{AchievementLevel, Indicator, LevelColumn};
use scraper::ElementRef;

use crate::error::ExtractError;
use crate::markers::{Markers, TABLE_ROWS};
use crate::text::{descendant_texts, element_text};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndicatorTable {
    pub columns: Vec<LevelColumn>,
    pub indicators: Vec<Indicator>,
}

pub fn parse(
    table: ElementRef<'_>,
    outcome_id: &str,
    markers: &Markers,
) -> Result<IndicatorTable, ExtractError> {
    let fail = |reason: String| ExtractError::Table {
        outcome: outcome_id.to_string(),
        reason,
    };

    let rows: Vec<ElementRef<'_>> = table.select(&markers.table_row).collect();
    if rows.len() != TABLE_ROWS {
        return Err(fail(format!(
            "expected {TABLE_ROWS} rows, found {}",
            rows.len()
        )));
    }

    let mut levels = Vec::new();
    let mut seen = HashSet::new();
    for header in rows[0].select(&markers.table_header_cell).map(element_text) {
        let level = AchievementLevel::from_header(&header)
            .ok_or_else(|| fail(format!("unknown achievement level {header:?}")))?;
        if !seen.insert(level) {
            return Err(fail(format!("level {level} appears twice")));
        }
        levels.push(level);
    }
    if levels.is_empty() {
        return Err(fail("no level headers in the first row".to_string()));
    }

    let qualifier_cells: Vec<ElementRef<'_>> = rows[1].select(&markers.table_cell).collect();
    let statement_cells: Vec<ElementRef<'_>> = rows[2].select(&markers.table_cell).collect();
    for (name, cells) in [("qualifier", &qualifier_cells), ("statement", &statement_cells)] {
        if cells.len() != levels.len() {
            return Err(fail(format!(
                "{} level columns but {} {name} cells",
                levels.len(),
                cells.len()
            )));
        }
    }

    let columns = levels
        .iter()
        .zip(&qualifier_cells)
        .map(|(level, cell)| LevelColumn {
            level: *level,
            qualifier: element_text(*cell),
        })
        .collect();

    let indicators = levels
        .iter()
        .zip(&statement_cells)
        .flat_map(|(level, cell)| {
            descendant_texts(*cell, &markers.paragraph)
                .into_iter()
                .map(move |text| Indicator {
                    level: *level,
                    text,
                })
        })
        .collect();

    Ok(IndicatorTable {
        columns,
        indicators,
    })
}
