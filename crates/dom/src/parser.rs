//! HTML5 parsing using html5ever.

use crate::document::{DOMNode, Document};
use anyhow::Result;
use html5ever::tendril::TendrilSink as _;
use html5ever::{ParseOpts, parse_document};
use indextree::NodeId;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// Parse `html` and copy the resulting tree under the document node of `doc`.
pub(crate) fn parse_into(doc: &mut Document, html: &str) -> Result<()> {
    let dom: RcDom = parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .read_from(&mut html.as_bytes())?;
    for error in dom.errors.borrow().iter() {
        log::trace!(target: "dom::parser", "recoverable parse error: {error}");
    }
    let root = doc.root();
    for child in dom.document.children.borrow().iter() {
        convert_node(doc, child, root);
    }
    Ok(())
}

/// Copy one html5ever node (and its subtree) into the arena under `parent`.
///
/// Whitespace-only text is kept: sibling text is part of how elements are
/// re-located, and it has to look the way a browser exposes it.
fn convert_node(doc: &mut Document, rc_node: &Handle, parent: NodeId) {
    let node = match &rc_node.data {
        RcNodeData::Document => {
            for child in rc_node.children.borrow().iter() {
                convert_node(doc, child, parent);
            }
            return;
        }
        RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => return,
        RcNodeData::Text { contents } => DOMNode::text(contents.borrow().to_string()),
        RcNodeData::Comment { contents } => DOMNode::comment(contents.to_string()),
        RcNodeData::Element { name, attrs, .. } => {
            let mut element = DOMNode::element(name.local.to_string());
            for attr in attrs.borrow().iter() {
                element
                    .attrs
                    .push((attr.name.local.to_string(), attr.value.to_string()));
            }
            element
        }
    };
    let id = doc.arena.new_node(node);
    parent.append(id, &mut doc.arena);
    for child in rc_node.children.borrow().iter() {
        convert_node(doc, child, id);
    }
}
