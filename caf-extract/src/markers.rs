//! Every CSS marker the extractor relies on.
//!
//! The page markup is the only contract; when it changes, this is the file to
//! update. Nothing here has a fallback.
//!
//! Two layouts are understood. The linked-page layout follows the live NCSC
//! site and is what crawl mode reads. The single-page layout is the contract
//! for a framework saved as one document (see the fixtures under
//! `tests/fixtures`); the live site does not serve this shape.

use scraper::Selector;

use crate::error::ExtractError;

// Single-page layout (saved documents, not the live site)
pub const OBJECTIVE: &str = "div.caf-objective";
pub const OBJECTIVE_HEADING: &str = "h2";
pub const PRINCIPLE: &str = "div.caf-principle";
pub const PRINCIPLE_HEADING: &str = "h3";
pub const GUIDANCE: &str = "div.caf-guidance";
pub const OUTCOME: &str = "div.pcf-BodyText";
pub const OUTCOME_HEADING: &str = "h4";
pub const PARAGRAPH: &str = "p";

// Linked-page layout (live site, crawl mode)
pub const OBJECTIVE_LINK: &str = "a[href*='objective']";
pub const PRINCIPLE_LINK: &str = "a[href*='principle']";
pub const PAGE_HEADING: &str = "h1.subHeading";
pub const SECTION_HEADING: &str = "h2";
pub const PRINCIPLE_SECTION: &str = "Principle";
pub const GUIDANCE_SECTION: &str = "Guidance";
pub const DESCRIPTION_SECTION: &str = "Description";
pub const LINKED_OUTCOME_HEADING: &str = "h3";
pub const LINKED_OUTCOME_DESCRIPTION: &str = "em";

// Indicator table
pub const TABLE: &str = "table";
pub const TABLE_ROW: &str = "tr";
pub const TABLE_HEADER_CELL: &str = "th";
pub const TABLE_CELL: &str = "td";
/// Level headers, qualifiers, statements.
pub const TABLE_ROWS: usize = 3;

/// Compiled form of the selectors above, built once per extraction.
pub struct Markers {
    pub objective: Selector,
    pub objective_heading: Selector,
    pub principle: Selector,
    pub principle_heading: Selector,
    pub guidance: Selector,
    pub outcome: Selector,
    pub outcome_heading: Selector,
    pub paragraph: Selector,
    pub objective_link: Selector,
    pub principle_link: Selector,
    pub page_heading: Selector,
    pub section_heading: Selector,
    pub linked_outcome_heading: Selector,
    pub linked_outcome_description: Selector,
    pub table: Selector,
    pub table_row: Selector,
    pub table_header_cell: Selector,
    pub table_cell: Selector,
}

impl Markers {
    pub fn compile() -> Result<Self, ExtractError> {
        Ok(Self {
            objective: compile(OBJECTIVE)?,
            objective_heading: compile(OBJECTIVE_HEADING)?,
            principle: compile(PRINCIPLE)?,
            principle_heading: compile(PRINCIPLE_HEADING)?,
            guidance: compile(GUIDANCE)?,
            outcome: compile(OUTCOME)?,
            outcome_heading: compile(OUTCOME_HEADING)?,
            paragraph: compile(PARAGRAPH)?,
            objective_link: compile(OBJECTIVE_LINK)?,
            principle_link: compile(PRINCIPLE_LINK)?,
            page_heading: compile(PAGE_HEADING)?,
            section_heading: compile(SECTION_HEADING)?,
            linked_outcome_heading: compile(LINKED_OUTCOME_HEADING)?,
            linked_outcome_description: compile(LINKED_OUTCOME_DESCRIPTION)?,
            table: compile(TABLE)?,
            table_row: compile(TABLE_ROW)?,
            table_header_cell: compile(TABLE_HEADER_CELL)?,
            table_cell: compile(TABLE_CELL)?,
        })
    }
}

fn compile(selector: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::Selector {
        selector,
        reason: format!("{e:?}"),
    })
}
