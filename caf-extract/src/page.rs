//! Single-page extraction: the whole framework laid out in one document.
//!
//! ```text
//! div.caf-objective
//!   h2  "Objective A - Managing security risk"
//!   p   description
//!   div.caf-principle
//!     h3  "Principle A1 Governance"
//!     p   description
//!     div.caf-guidance (optional)
//!     div.pcf-BodyText            one per outcome, must hold a table
//!       h4  "A1.a Board Direction"
//!       p   description
//!       table                     see `table`
//! ```

use caf_framework::{FrameworkDocument, Objective, Outcome, Principle};
use scraper::{ElementRef, Html};

use crate::error::{ExtractError, Level};
use crate::markers::{self, Markers};
use crate::text::{self, child_texts, descendant_texts, element_text, first_child};
use crate::{ids, table};

/// Parse `raw_html` and recover the full Objective → Indicator hierarchy.
///
/// Fails on the first missing marker; never returns a partial document.
pub fn extract(raw_html: &str) -> Result<FrameworkDocument, ExtractError> {
    let markers = Markers::compile()?;
    let html = Html::parse_document(raw_html);

    let objectives = html
        .select(&markers.objective)
        .map(|el| objective(el, &markers))
        .collect::<Result<Vec<_>, _>>()?;
    if objectives.is_empty() {
        return Err(ExtractError::MissingMarker {
            level: Level::Objective,
            marker: markers::OBJECTIVE,
            context: "page".to_string(),
        });
    }

    let doc = finish(objectives)?;
    let counts = doc.counts();
    tracing::debug!(
        objectives = counts.objectives,
        principles = counts.principles,
        outcomes = counts.outcomes,
        indicators = counts.indicators,
        "extract.page"
    );
    Ok(doc)
}

fn objective(el: ElementRef<'_>, markers: &Markers) -> Result<Objective, ExtractError> {
    let heading = first_child(el, &markers.objective_heading).ok_or_else(|| {
        ExtractError::MissingMarker {
            level: Level::Objective,
            marker: markers::OBJECTIVE_HEADING,
            context: format!("objective section starting {:?}", snippet(el)),
        }
    })?;
    let heading = ids::objective(&element_text(heading))?;
    let context = format!("objective {}", heading.id);

    let description = required_description(
        child_texts(el, &markers.paragraph),
        Level::Objective,
        &context,
    )?;

    let principles = el
        .select(&markers.principle)
        .map(|p| principle(p, &heading.id, markers))
        .collect::<Result<Vec<_>, _>>()?;
    if principles.is_empty() {
        return Err(ExtractError::MissingMarker {
            level: Level::Principle,
            marker: markers::PRINCIPLE,
            context,
        });
    }

    Ok(Objective {
        id: heading.id,
        title: heading.title,
        description,
        principles,
    })
}

fn principle(
    el: ElementRef<'_>,
    objective_id: &str,
    markers: &Markers,
) -> Result<Principle, ExtractError> {
    let heading = first_child(el, &markers.principle_heading).ok_or_else(|| {
        ExtractError::MissingMarker {
            level: Level::Principle,
            marker: markers::PRINCIPLE_HEADING,
            context: format!("a principle of objective {objective_id}"),
        }
    })?;
    let heading = ids::principle(&element_text(heading), objective_id)?;
    let context = format!("principle {}", heading.id);

    let description = required_description(
        child_texts(el, &markers.paragraph),
        Level::Principle,
        &context,
    )?;

    let guidance = first_child(el, &markers.guidance)
        .map(|g| descendant_texts(g, &markers.paragraph))
        .filter(|paragraphs| !paragraphs.is_empty())
        .map(|paragraphs| text::join_paragraphs(&paragraphs));

    let outcomes = outcome_blocks(el, markers)
        .map(|(block, table)| {
            let title_el = first_child(block, &markers.outcome_heading).ok_or_else(|| {
                ExtractError::MissingMarker {
                    level: Level::Outcome,
                    marker: markers::OUTCOME_HEADING,
                    context: format!("an outcome of {context}"),
                }
            })?;
            outcome(
                &element_text(title_el),
                child_texts(block, &markers.paragraph),
                table,
                &heading.id,
                markers,
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    if outcomes.is_empty() {
        return Err(ExtractError::MissingMarker {
            level: Level::Outcome,
            marker: markers::OUTCOME,
            context,
        });
    }

    Ok(Principle {
        id: heading.id,
        title: heading.title,
        description,
        guidance,
        detail: None,
        outcomes,
    })
}

/// Outcome containers under `el` that hold an indicator table, with that table.
///
/// `pcf-BodyText` is also used for plain prose blocks; those carry no table
/// and are not outcomes.
pub(crate) fn outcome_blocks<'a>(
    el: ElementRef<'a>,
    markers: &'a Markers,
) -> impl Iterator<Item = (ElementRef<'a>, ElementRef<'a>)> + 'a {
    el.select(&markers.outcome)
        .filter_map(|block| block.select(&markers.table).next().map(|t| (block, t)))
}

/// Assemble one outcome from its heading text, description paragraphs and
/// indicator table. Shared by the single-page and linked-page layouts.
pub(crate) fn outcome(
    heading: &str,
    description: Vec<String>,
    table_el: ElementRef<'_>,
    principle_id: &str,
    markers: &Markers,
) -> Result<Outcome, ExtractError> {
    let heading = ids::outcome(heading, principle_id)?;
    let description = required_description(
        description,
        Level::Outcome,
        &format!("outcome {}", heading.id),
    )?;
    let table = table::parse(table_el, &heading.id, markers)?;

    Ok(Outcome {
        id: heading.id,
        title: heading.title,
        description,
        levels: table.columns,
        indicators: table.indicators,
    })
}

pub(crate) fn required_description(
    paragraphs: Vec<String>,
    level: Level,
    context: &str,
) -> Result<String, ExtractError> {
    if paragraphs.is_empty() {
        return Err(ExtractError::MissingMarker {
            level,
            marker: markers::PARAGRAPH,
            context: context.to_string(),
        });
    }
    Ok(text::join_paragraphs(&paragraphs))
}

/// Wrap checked objectives into a document, rejecting repeated identifiers.
pub(crate) fn finish(objectives: Vec<Objective>) -> Result<FrameworkDocument, ExtractError> {
    let doc = FrameworkDocument::new(objectives);
    if let Some(id) = doc.find_duplicate_id() {
        return Err(ExtractError::DuplicateId { id: id.to_string() });
    }
    Ok(doc)
}

fn snippet(el: ElementRef<'_>) -> String {
    element_text(el).chars().take(60).collect()
}
