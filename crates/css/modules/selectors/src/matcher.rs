//! CSS selector matching engine.
//! Reference: <https://www.w3.org/TR/selectors-3/#selectors>

use crate::{Combinator, ComplexSelector, CompoundSelector, ElementAdapter, SelectorList, SimpleSelector};

/// Match a selector list against an element.
pub fn matches_selector_list<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    list: &SelectorList,
) -> bool {
    list.selectors
        .iter()
        .any(|selector_item| matches_complex(adapter, element, selector_item))
}

/// Match a complex selector against an element, right to left.
///
/// Descendant and general-sibling combinators backtrack: every candidate on the
/// left is tried, not only the nearest one.
pub fn matches_complex<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
) -> bool {
    matches_from(adapter, element, sel, sel.rest.len())
}

/// Match the compound at `index` against `element`, then relate the remainder leftwards.
fn matches_from<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
    index: usize,
) -> bool {
    let Some(compound) = sel.compound(index) else {
        return false;
    };
    if !matches_compound(adapter, element, compound) {
        return false;
    }
    let Some(combinator) = sel.combinator_before(index) else {
        return true;
    };
    let left = index - 1;
    match combinator {
        Combinator::Descendant => {
            let mut current_parent = adapter.parent(element);
            while let Some(ancestor_element) = current_parent {
                if matches_from(adapter, ancestor_element, sel, left) {
                    return true;
                }
                current_parent = adapter.parent(ancestor_element);
            }
            false
        }
        Combinator::Child => adapter
            .parent(element)
            .is_some_and(|parent_el| matches_from(adapter, parent_el, sel, left)),
        Combinator::AdjacentSibling => adapter
            .previous_sibling_element(element)
            .is_some_and(|prev_el| matches_from(adapter, prev_el, sel, left)),
        Combinator::GeneralSibling => {
            let mut current_sibling = adapter.previous_sibling_element(element);
            while let Some(sibling_element) = current_sibling {
                if matches_from(adapter, sibling_element, sel, left) {
                    return true;
                }
                current_sibling = adapter.previous_sibling_element(sibling_element);
            }
            false
        }
    }
}

/// Match a compound selector against a single element.
pub fn matches_compound<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    compound: &CompoundSelector,
) -> bool {
    compound
        .simples
        .iter()
        .all(|simple| matches_simple(adapter, element, simple))
}

fn matches_simple<A: ElementAdapter>(adapter: &A, element: A::Handle, simple: &SimpleSelector) -> bool {
    match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(type_name) => adapter.tag_name(element) == type_name.as_str(),
        SimpleSelector::Class(class_name) => adapter.has_class(element, class_name),
        SimpleSelector::IdSelector(id_value) => adapter
            .element_id(element)
            .is_some_and(|value| value == id_value.as_str()),
        SimpleSelector::AttrEquals { name, value } => adapter
            .attr(element, name)
            .is_some_and(|attr_value| attr_value == value.as_str()),
        SimpleSelector::AttrExists(name) => adapter.attr(element, name).is_some(),
        SimpleSelector::NthChild(expression) => {
            expression.matches(adapter.index_among_siblings(element))
        }
        SimpleSelector::FirstChild => adapter.previous_sibling_element(element).is_none(),
        SimpleSelector::LastChild => adapter.next_sibling_element(element).is_none(),
        SimpleSelector::Root => adapter.is_root(element),
    }
}

/// Filter `candidates` (expected in document order) down to those matching `list`.
pub fn query_all<A, I>(adapter: &A, candidates: I, list: &SelectorList) -> Vec<A::Handle>
where
    A: ElementAdapter,
    I: IntoIterator<Item = A::Handle>,
{
    let matched: Vec<A::Handle> = candidates
        .into_iter()
        .filter(|candidate| matches_selector_list(adapter, *candidate, list))
        .collect();
    log::trace!(target: "css_selectors", "query matched {} element(s)", matched.len());
    matched
}
