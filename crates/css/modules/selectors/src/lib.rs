//! Selectors Level 3 parsing, element matching and serialization.
//! Reference: <https://www.w3.org/TR/selectors-3/>
//!
//! This crate implements the subset needed to locate and re-locate page elements:
//! - Type, universal, class, id, and attribute (presence / equals) selectors
//! - `:nth-child()`, `:first-child`, `:last-child` and `:root`
//! - Combinators: descendant, child, adjacent sibling, general sibling
//! - Strict parsing: malformed input is an error, never a partial selector
//! - Serialization back to selector text (used when synthesizing selectors)

mod matcher;
mod parser;
mod serialize;

pub use matcher::{matches_complex, matches_compound, matches_selector_list, query_all};
pub use parser::{parse_complex_selector, parse_selector_list};
pub use serialize::{is_plain_identifier, serialize_identifier};

/// An adapter that abstracts DOM access for selector matching.
/// Implement this for your DOM layer.
pub trait ElementAdapter {
    type Handle: Copy + Eq;

    /// Parent element if any. Document nodes are not elements and must not be returned.
    fn parent(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Previous sibling element (skip non-elements if your DOM has mixed nodes).
    fn previous_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Next sibling element (skip non-elements if your DOM has mixed nodes).
    fn next_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Tag name in ASCII lowercase (per HTML parsing conventions).
    fn tag_name(&self, element: Self::Handle) -> &str;

    /// Returns Some(id) if the element has an id attribute, else None.
    fn element_id(&self, element: Self::Handle) -> Option<&str>;

    /// True if the element has the given class token.
    fn has_class(&self, element: Self::Handle, class: &str) -> bool;

    /// Returns the attribute value if present.
    fn attr(&self, element: Self::Handle, name: &str) -> Option<&str>;

    /// True for the document element (`:root`).
    fn is_root(&self, element: Self::Handle) -> bool {
        self.parent(element).is_none()
    }

    /// 1-based position among element siblings, as used by `:nth-child()`.
    fn index_among_siblings(&self, element: Self::Handle) -> usize {
        let mut index = 1usize;
        let mut current = self.previous_sibling_element(element);
        while let Some(sibling) = current {
            index = index.saturating_add(1);
            current = self.previous_sibling_element(sibling);
        }
        index
    }
}

/// The `An+B` microsyntax of `:nth-child()`.
/// Reference: <https://www.w3.org/TR/css-syntax-3/#anb-microsyntax>
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AnPlusB {
    pub step: i32,
    pub offset: i32,
}

impl AnPlusB {
    /// A plain index, `:nth-child(b)`.
    pub const fn index(offset: i32) -> Self {
        Self { step: 0, offset }
    }

    /// True if the 1-based `position` is selected by this expression.
    pub fn matches(self, position: usize) -> bool {
        let Ok(position) = i64::try_from(position) else {
            return false;
        };
        let step = i64::from(self.step);
        let delta = position - i64::from(self.offset);
        if step == 0 {
            return delta == 0;
        }
        delta % step == 0 && delta / step >= 0
    }
}

/// Simple selectors.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SimpleSelector {
    /// Type selector, stored lowercase.
    Type(String),
    /// Class selector (case-sensitive).
    Class(String),
    /// ID selector (case-sensitive).
    IdSelector(String),
    /// `[attr=value]`
    AttrEquals { name: String, value: String },
    /// `[attr]`
    AttrExists(String),
    /// `:nth-child(An+B)`
    NthChild(AnPlusB),
    /// `:first-child`
    FirstChild,
    /// `:last-child`
    LastChild,
    /// `:root`
    Root,
    /// Universal selector '*'.
    Universal,
}

/// A compound selector is a sequence of simple selectors (no combinators).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

/// Combinators between compounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

/// A complex selector is one or more compounds separated by combinators.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    pub first: CompoundSelector,
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    /// Number of compounds in the selector.
    pub fn len(&self) -> usize {
        self.rest.len().saturating_add(1)
    }

    /// Always false: a complex selector has at least one compound.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The compound at `index`, counting `first` as zero.
    pub fn compound(&self, index: usize) -> Option<&CompoundSelector> {
        if index == 0 {
            Some(&self.first)
        } else {
            self.rest.get(index - 1).map(|pair| &pair.1)
        }
    }

    /// The combinator to the left of the compound at `index`.
    pub fn combinator_before(&self, index: usize) -> Option<Combinator> {
        index
            .checked_sub(1)
            .and_then(|position| self.rest.get(position))
            .map(|pair| pair.0)
    }
}

/// A selector list separated by commas.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}
