//! CSS selector synthesis.
//!
//! For the target element the generator tries, in order, `tag#id`,
//! `tag.class…`, `tag`, `tag:nth-child(n)` and `tag.class…:nth-child(n)`, and
//! returns the first that matches only the target. Failing that, it climbs the
//! ancestor chain, giving each level the first of those forms that singles it
//! out among its siblings, and joins the levels with `>` until the whole
//! selector is unique in the document.

use core::iter;
use css_selectors::{AnPlusB, CompoundSelector, ElementAdapter as _, SimpleSelector, matches_compound};
use dom::{Document, NodeId};

/// Build a selector for `element`. Never fails: anything unexpected degrades to the tag name.
pub fn synthesize_selector(doc: &Document, element: NodeId) -> String {
    let Some(tag) = doc.tag_name(element) else {
        log::debug!(target: "anchor::selector", "selector requested for a non-element node");
        return String::from("*");
    };
    if !doc.is_connected(element) {
        log::debug!(target: "anchor::selector", "element is detached, using tag-only selector");
        return tag_only(tag);
    }
    if let Some(selector) = candidates(doc, element)
        .into_iter()
        .map(|compound| compound.to_string())
        .find(|selector| is_unique(doc, selector, element))
    {
        return selector;
    }
    ancestor_chain(doc, element).unwrap_or_else(|| tag_only(tag))
}

fn tag_only(tag: &str) -> String {
    CompoundSelector {
        simples: vec![SimpleSelector::Type(tag.to_owned())],
    }
    .to_string()
}

/// Candidate compounds for one element, most preferred first.
fn candidates(doc: &Document, element: NodeId) -> Vec<CompoundSelector> {
    let tag = SimpleSelector::Type(doc.tag_name(element).unwrap_or_default().to_owned());
    let classes: Vec<SimpleSelector> = doc
        .attribute(element, "class")
        .map(|value| {
            value
                .split_ascii_whitespace()
                .map(|class| SimpleSelector::Class(class.to_owned()))
                .collect()
        })
        .unwrap_or_default();
    let nth = SimpleSelector::NthChild(AnPlusB::index(
        i32::try_from(doc.adapter().index_among_siblings(element)).unwrap_or(i32::MAX),
    ));

    let mut out = Vec::with_capacity(5);
    if let Some(id) = doc.attribute(element, "id").filter(|id| !id.is_empty()) {
        out.push(compound([tag.clone(), SimpleSelector::IdSelector(id.to_owned())]));
    }
    if !classes.is_empty() {
        out.push(compound(iter::once(tag.clone()).chain(classes.iter().cloned())));
    }
    out.push(compound([tag.clone()]));
    out.push(compound([tag.clone(), nth.clone()]));
    if !classes.is_empty() {
        out.push(compound(
            iter::once(tag).chain(classes).chain(iter::once(nth)),
        ));
    }
    out
}

fn compound(simples: impl IntoIterator<Item = SimpleSelector>) -> CompoundSelector {
    CompoundSelector {
        simples: simples.into_iter().collect(),
    }
}

/// The first candidate that matches `element` and none of its element siblings.
fn sibling_unique_segment(doc: &Document, element: NodeId) -> Option<String> {
    let siblings = doc
        .parent(element)
        .map(|parent| doc.element_children(parent))
        .unwrap_or_else(|| vec![element]);
    let adapter = doc.adapter();
    candidates(doc, element)
        .into_iter()
        .find(|candidate| {
            siblings
                .iter()
                .all(|sibling| matches_compound(&adapter, *sibling, candidate) == (*sibling == element))
        })
        .map(|candidate| candidate.to_string())
}

fn ancestor_chain(doc: &Document, element: NodeId) -> Option<String> {
    let mut segments: Vec<String> = Vec::new();
    let mut current = element;
    loop {
        segments.push(sibling_unique_segment(doc, current)?);
        let selector = segments
            .iter()
            .rev()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" > ");
        if is_unique(doc, &selector, element) {
            return Some(selector);
        }
        match doc.parent_element(current) {
            Some(parent) => current = parent,
            None => {
                log::debug!(target: "anchor::selector", "no unique selector, keeping {selector:?}");
                return Some(selector);
            }
        }
    }
}

fn is_unique(doc: &Document, selector: &str, element: NodeId) -> bool {
    match doc.query_selector_all(selector) {
        Ok(matches) => matches.as_slice() == [element],
        Err(error) => {
            log::trace!(target: "anchor::selector", "generated selector rejected: {error:#}");
            false
        }
    }
}
