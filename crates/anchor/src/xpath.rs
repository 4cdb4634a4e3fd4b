//! Absolute element paths.
//!
//! Capture writes `/tag[i]/tag[j]/...` where `i` counts preceding siblings with
//! the same tag. Evaluation accepts that form plus the small XPath subset
//! commonly stored next to it: `*` name tests, optional positive position
//! predicates, and `//` descendant steps.
//! Reference: <https://www.w3.org/TR/xpath-10/#location-paths>

use anyhow::{Context as _, Result, anyhow, bail};
use dom::{Document, NodeId};
use std::collections::HashMap;

/// The absolute path of `element`, walking parent elements to the top.
pub fn element_xpath(doc: &Document, element: NodeId) -> String {
    let mut parts: Vec<String> = Vec::new();
    let mut current = Some(element).filter(|id| doc.is_element(*id));
    while let Some(node) = current {
        let tag = doc.tag_name(node).unwrap_or_default();
        let mut index = 1usize;
        let mut sibling = doc.previous_element_sibling(node);
        while let Some(previous) = sibling {
            if doc.tag_name(previous) == Some(tag) {
                index += 1;
            }
            sibling = doc.previous_element_sibling(previous);
        }
        parts.push(format!("{tag}[{index}]"));
        current = doc.parent_element(node);
    }
    parts.reverse();
    format!("/{}", parts.join("/"))
}

#[derive(Clone, Debug, PartialEq, Eq)]
enum NameTest {
    Any,
    Name(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Step {
    /// True for a step introduced by `//`.
    descendant: bool,
    name: NameTest,
    /// 1-based position among the matching children of each context node.
    position: Option<usize>,
}

fn parse_path(path: &str) -> Result<Vec<Step>> {
    let path = path.trim();
    if !path.starts_with('/') {
        bail!("only absolute paths are supported: {path:?}");
    }
    let mut steps = Vec::new();
    let mut rest = path;
    while !rest.is_empty() {
        let (descendant, after) = match rest.strip_prefix("//") {
            Some(after) => (true, after),
            None => (false, rest.get(1..).unwrap_or_default()),
        };
        let end = after.find('/').unwrap_or(after.len());
        let (raw, remainder) = after.split_at(end);
        steps.push(parse_step(raw, descendant).with_context(|| format!("in path {path:?}"))?);
        rest = remainder;
    }
    Ok(steps)
}

fn parse_step(raw: &str, descendant: bool) -> Result<Step> {
    let (name, predicate) = match raw.split_once('[') {
        Some((name, tail)) => {
            let inner = tail
                .strip_suffix(']')
                .ok_or_else(|| anyhow!("unterminated predicate in step {raw:?}"))?;
            let position = inner
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|position| *position > 0)
                .ok_or_else(|| anyhow!("unsupported predicate {inner:?}"))?;
            (name, Some(position))
        }
        None => (raw, None),
    };
    let name = name.trim();
    let test = match name {
        "" => bail!("empty step"),
        "*" => NameTest::Any,
        _ if name
            .chars()
            .all(|character| character.is_ascii_alphanumeric() || matches!(character, '-' | '_')) =>
        {
            NameTest::Name(name.to_ascii_lowercase())
        }
        _ => bail!("unsupported step {raw:?}"),
    };
    Ok(Step {
        descendant,
        name: test,
        position: predicate,
    })
}

/// Evaluate `path` and return the first element in document order, if any.
///
/// # Errors
/// Returns an error when the path uses syntax outside the supported subset.
pub fn evaluate_first(doc: &Document, path: &str) -> Result<Option<NodeId>> {
    let steps = parse_path(path)?;
    let order: HashMap<NodeId, usize> = doc
        .elements()
        .enumerate()
        .map(|(index, id)| (id, index))
        .collect();

    let mut context = vec![doc.root()];
    for step in &steps {
        let mut next: Vec<NodeId> = Vec::new();
        for node in &context {
            let parents = if step.descendant {
                let mut all = vec![*node];
                all.extend(doc.element_descendants(*node));
                all
            } else {
                vec![*node]
            };
            for parent in parents {
                let matching: Vec<NodeId> = doc
                    .element_children(parent)
                    .into_iter()
                    .filter(|child| match &step.name {
                        NameTest::Any => true,
                        NameTest::Name(name) => doc.tag_name(*child) == Some(name.as_str()),
                    })
                    .collect();
                match step.position {
                    Some(position) => next.extend(matching.get(position - 1).copied()),
                    None => next.extend(matching),
                }
            }
        }
        next.sort_by_key(|id| order.get(id).copied().unwrap_or(usize::MAX));
        next.dedup();
        if next.is_empty() {
            return Ok(None);
        }
        context = next;
    }
    Ok(context.first().copied())
}
