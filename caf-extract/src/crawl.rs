//! Parsers for the linked-page layout of the live site.
//!
//! The collection page links to one page per objective; each objective page
//! links to one page per principle; principle pages carry the outcomes and
//! their indicator tables. Fetching is the caller's job, these functions only
//! read HTML that has already been retrieved.

use std::collections::BTreeSet;

use caf_framework::{FrameworkDocument, Objective, Principle};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{ExtractError, Level};
use crate::markers::{self, Markers};
use crate::{ids, page};
use crate::text::{self, child_texts, descendant_texts, element_text};

/// What an objective page tells us before its principles are fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectivePage {
    pub id: String,
    pub title: String,
    pub description: String,
    pub principle_links: Vec<Url>,
}

/// Links to objective pages, resolved against `page_url`, sorted by path.
pub fn objective_links(raw_html: &str, page_url: &Url) -> Result<Vec<Url>, ExtractError> {
    let markers = Markers::compile()?;
    let html = Html::parse_document(raw_html);
    let links = collect_links(&html, &markers.objective_link, page_url);
    if links.is_empty() {
        return Err(ExtractError::MissingMarker {
            level: Level::Page,
            marker: markers::OBJECTIVE_LINK,
            context: page_url.to_string(),
        });
    }
    tracing::debug!(count = links.len(), page = %page_url, "crawl.objective_links");
    Ok(links)
}

pub fn parse_objective_page(raw_html: &str, page_url: &Url) -> Result<ObjectivePage, ExtractError> {
    let markers = Markers::compile()?;
    let html = Html::parse_document(raw_html);

    let heading_el = page_heading(&html, &markers, Level::Objective, page_url)?;
    let heading = ids::objective(&element_text(heading_el))?;

    // Paragraphs sitting beside the heading; the site does not always have them.
    let description = heading_el
        .parent()
        .and_then(ElementRef::wrap)
        .map(|parent| child_texts(parent, &markers.paragraph))
        .unwrap_or_default();

    let principle_links = collect_links(&html, &markers.principle_link, page_url);
    if principle_links.is_empty() {
        return Err(ExtractError::MissingMarker {
            level: Level::Principle,
            marker: markers::PRINCIPLE_LINK,
            context: format!("objective {} at {page_url}", heading.id),
        });
    }

    Ok(ObjectivePage {
        id: heading.id,
        title: heading.title,
        description: text::join_paragraphs(&description),
        principle_links,
    })
}

pub fn parse_principle_page(
    raw_html: &str,
    page_url: &Url,
    objective_id: &str,
) -> Result<Principle, ExtractError> {
    let markers = Markers::compile()?;
    let html = Html::parse_document(raw_html);

    let heading_el = page_heading(&html, &markers, Level::Principle, page_url)?;
    let heading = ids::principle(&element_text(heading_el), objective_id)?;
    let context = format!("principle {} at {page_url}", heading.id);

    let description = page::required_description(
        section_paragraphs(&html, &markers, markers::PRINCIPLE_SECTION),
        Level::Principle,
        &context,
    )?;
    let guidance = optional_section(&html, &markers, markers::GUIDANCE_SECTION);
    let detail = optional_section(&html, &markers, markers::DESCRIPTION_SECTION);

    let outcomes = page::outcome_blocks(html.root_element(), &markers)
        .map(|(block, table)| {
            let title_el = block
                .select(&markers.linked_outcome_heading)
                .next()
                .ok_or_else(|| ExtractError::MissingMarker {
                    level: Level::Outcome,
                    marker: markers::LINKED_OUTCOME_HEADING,
                    context: format!("an outcome of {context}"),
                })?;
            page::outcome(
                &element_text(title_el),
                descendant_texts(block, &markers.linked_outcome_description),
                table,
                &heading.id,
                &markers,
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
        detail,
        outcomes,
    })
}

/// Join an objective page with its principle pages, in link order.
pub fn assemble_objective(page: ObjectivePage, principles: Vec<Principle>) -> Objective {
    Objective {
        id: page.id,
        title: page.title,
        description: page.description,
        principles,
    }
}

/// Final identifier check over everything a crawl collected.
pub fn finish(objectives: Vec<Objective>) -> Result<FrameworkDocument, ExtractError> {
    if objectives.is_empty() {
        return Err(ExtractError::MissingMarker {
            level: Level::Objective,
            marker: markers::OBJECTIVE_LINK,
            context: "crawl".to_string(),
        });
    }
    page::finish(objectives)
}

fn page_heading<'a>(
    html: &'a Html,
    markers: &Markers,
    level: Level,
    page_url: &Url,
) -> Result<ElementRef<'a>, ExtractError> {
    html.select(&markers.page_heading)
        .next()
        .ok_or_else(|| ExtractError::MissingMarker {
            level,
            marker: markers::PAGE_HEADING,
            context: page_url.to_string(),
        })
}

/// Paragraphs in the container of the `h2` whose text contains `title`.
fn section_paragraphs(html: &Html, markers: &Markers, title: &str) -> Vec<String> {
    html.select(&markers.section_heading)
        .find(|h2| element_text(*h2).contains(title))
        .and_then(|h2| h2.parent())
        .and_then(ElementRef::wrap)
        .map(|section| descendant_texts(section, &markers.paragraph))
        .unwrap_or_default()
}

fn optional_section(html: &Html, markers: &Markers, title: &str) -> Option<String> {
    Some(section_paragraphs(html, markers, title))
        .filter(|paragraphs| !paragraphs.is_empty())
        .map(|paragraphs| text::join_paragraphs(&paragraphs))
}

fn collect_links(html: &Html, selector: &Selector, page_url: &Url) -> Vec<Url> {
    let unique: BTreeSet<(String, String)> = html
        .select(selector)
        .filter_map(|a| a.value().attr("href"))
        .filter_map(|href| page_url.join(href).ok())
        .map(|mut url| {
            url.set_fragment(None);
            (url.path().to_string(), url.to_string())
        })
        .collect();

    unique
        .into_iter()
        .filter_map(|(_, url)| Url::parse(&url).ok())
        .filter(|url| url != page_url)
        .collect()
}
