//! Text helpers over `scraper` element trees.

use scraper::{ElementRef, Selector};

/// Collapse whitespace (including narrow and non-breaking spaces) and turn
/// typographic apostrophes into plain ones.
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .replace('\u{2019}', "'")
}

pub fn element_text(el: ElementRef<'_>) -> String {
    normalize(&el.text().collect::<String>())
}

pub fn child_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    el.children().filter_map(ElementRef::wrap)
}

/// First direct child matching `selector`; nested sections are not searched.
pub fn first_child<'a>(el: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    child_elements(el).find(|child| selector.matches(child))
}

/// Non-empty texts of direct children matching `selector`, in order.
pub fn child_texts(el: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    child_elements(el)
        .filter(|child| selector.matches(child))
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Non-empty texts of all descendants matching `selector`, in order.
pub fn descendant_texts(el: ElementRef<'_>, selector: &Selector) -> Vec<String> {
    el.select(selector)
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect()
}

/// One paragraph per line.
pub fn join_paragraphs(paragraphs: &[String]) -> String {
    paragraphs.join("\n")
}
