//! Re-locating an anchored element.
//!
//! Three independent strategies run in a fixed order and the first hit wins:
//! the stored selector, the stored xpath, then a fuzzy search for the quoted
//! text. Strategy failures (bad selector, bad path, no quote) are never errors;
//! they only mean "try the next one".

use crate::model::{Anchor, TextQuote};
use crate::xpath;
use dom::{Document, NodeId};

/// Which strategy located the element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Strategy {
    Selector,
    XPath,
    TextQuote,
}

/// A successful resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub element: NodeId,
    pub strategy: Strategy,
}

/// Signature shared by every strategy.
pub type StrategyFn = fn(&Document, &Anchor) -> Option<NodeId>;

/// The strategies in the order they are tried.
pub const STRATEGIES: [(Strategy, StrategyFn); 3] = [
    (Strategy::Selector, by_selector),
    (Strategy::XPath, by_xpath),
    (Strategy::TextQuote, by_text_quote),
];

/// Resolve `anchor` to an element, or `None` when no strategy finds one.
pub fn resolve(doc: &Document, anchor: &Anchor) -> Option<NodeId> {
    resolve_with(doc, anchor).map(|resolution| resolution.element)
}

/// Like [`resolve`], also reporting which strategy succeeded.
pub fn resolve_with(doc: &Document, anchor: &Anchor) -> Option<Resolution> {
    let resolution = STRATEGIES.iter().find_map(|(strategy, run)| {
        run(doc, anchor).map(|element| Resolution {
            element,
            strategy: *strategy,
        })
    });
    match resolution {
        Some(found) => log::trace!(
            target: "anchor::resolve",
            "{:?} resolved by {:?}",
            anchor.selector,
            found.strategy
        ),
        None => log::debug!(target: "anchor::resolve", "{:?} not found", anchor.selector),
    }
    resolution
}

/// Run the stored selector.
///
/// One match wins outright. Several matches are disambiguated by the quoted
/// text; without a quote, or with no match containing it, the result is `None`.
pub fn by_selector(doc: &Document, anchor: &Anchor) -> Option<NodeId> {
    let matches = match doc.query_selector_all(&anchor.selector) {
        Ok(matches) => matches,
        Err(error) => {
            log::trace!(target: "anchor::resolve", "selector strategy skipped: {error:#}");
            return None;
        }
    };
    match matches.as_slice() {
        [] => None,
        [only] => Some(*only),
        several => {
            let quote = anchor.text_quote.as_ref()?;
            several
                .iter()
                .copied()
                .find(|candidate| doc.text_content(*candidate).contains(&quote.exact))
        }
    }
}

/// Evaluate the stored xpath. Skipped when the anchor has none.
pub fn by_xpath(doc: &Document, anchor: &Anchor) -> Option<NodeId> {
    if anchor.xpath.is_empty() {
        return None;
    }
    xpath::evaluate_first(doc, &anchor.xpath).unwrap_or_else(|error| {
        log::trace!(target: "anchor::resolve", "xpath strategy skipped: {error:#}");
        None
    })
}

/// Fuzzy text-quote search with the default weights.
pub fn by_text_quote(doc: &Document, anchor: &Anchor) -> Option<NodeId> {
    let quote = anchor.text_quote.as_ref()?;
    find_text_quote(doc, quote, &TextQuoteWeights::default())
}

/// Scoring weights of the fuzzy text-quote search.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextQuoteWeights {
    /// Score of any element whose text contains the quote.
    pub base: f64,
    /// Added when the previous sibling's text ends with the prefix.
    pub prefix: f64,
    /// Added when the next sibling's text starts with the suffix.
    pub suffix: f64,
    /// Multiplied by `exact / candidate` text length, favouring tight matches.
    pub tightness: f64,
}

impl Default for TextQuoteWeights {
    fn default() -> Self {
        Self {
            base: 1.0,
            prefix: 0.5,
            suffix: 0.5,
            tightness: 0.5,
        }
    }
}

/// Walk the elements under `body` in document order and return the best-scoring
/// one whose trimmed text contains `quote.exact`. Ties keep the earliest.
pub fn find_text_quote(doc: &Document, quote: &TextQuote, weights: &TextQuoteWeights) -> Option<NodeId> {
    if quote.exact.is_empty() {
        return None;
    }
    let scope = doc.body().or_else(|| doc.document_element())?;
    let mut best: Option<(NodeId, f64)> = None;
    for candidate in doc.element_descendants(scope) {
        let Some(score) = score_candidate(doc, candidate, quote, weights) else {
            continue;
        };
        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((candidate, score));
        }
    }
    if let Some((element, score)) = best {
        log::trace!(target: "anchor::resolve", "text quote best score {score:.3}");
        return (score > 0.0).then_some(element);
    }
    None
}

/// Score of one element, or `None` when its text does not contain the quote.
pub fn score_candidate(
    doc: &Document,
    candidate: NodeId,
    quote: &TextQuote,
    weights: &TextQuoteWeights,
) -> Option<f64> {
    let text = doc.text_content(candidate);
    let trimmed = text.trim();
    if trimmed.is_empty() || !trimmed.contains(&quote.exact) {
        return None;
    }
    let mut score = weights.base;
    if let Some(prefix) = quote.prefix.as_deref().filter(|prefix| !prefix.is_empty()) {
        let before = doc
            .previous_sibling(candidate)
            .map(|sibling| doc.text_content(sibling))
            .unwrap_or_default();
        if before.trim().ends_with(prefix) {
            score += weights.prefix;
        }
    }
    if let Some(suffix) = quote.suffix.as_deref().filter(|suffix| !suffix.is_empty()) {
        let after = doc
            .next_sibling(candidate)
            .map(|sibling| doc.text_content(sibling))
            .unwrap_or_default();
        if after.trim().starts_with(suffix) {
            score += weights.suffix;
        }
    }
    let ratio = quote.exact.chars().count() as f64 / trimmed.chars().count() as f64;
    score += ratio * weights.tightness;
    Some(score)
}
