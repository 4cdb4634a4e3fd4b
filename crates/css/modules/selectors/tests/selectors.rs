use css_selectors::{
    ElementAdapter, is_plain_identifier, matches_selector_list, parse_complex_selector,
    parse_selector_list, query_all, serialize_identifier,
};

/// A flat element table: (tag, parent, id, classes).
struct Tree {
    nodes: Vec<(&'static str, Option<usize>, Option<&'static str>, &'static str)>,
}

impl Tree {
    fn siblings(&self, element: usize) -> Vec<usize> {
        let parent = self.nodes[element].1;
        (0..self.nodes.len())
            .filter(|index| self.nodes[*index].1 == parent)
            .collect()
    }
}

impl ElementAdapter for Tree {
    type Handle = usize;

    fn parent(&self, element: usize) -> Option<usize> {
        self.nodes[element].1
    }

    fn previous_sibling_element(&self, element: usize) -> Option<usize> {
        let siblings = self.siblings(element);
        let position = siblings.iter().position(|sibling| *sibling == element)?;
        position.checked_sub(1).map(|previous| siblings[previous])
    }

    fn next_sibling_element(&self, element: usize) -> Option<usize> {
        let siblings = self.siblings(element);
        let position = siblings.iter().position(|sibling| *sibling == element)?;
        siblings.get(position + 1).copied()
    }

    fn tag_name(&self, element: usize) -> &str {
        self.nodes[element].0
    }

    fn element_id(&self, element: usize) -> Option<&str> {
        self.nodes[element].2
    }

    fn has_class(&self, element: usize, class: &str) -> bool {
        self.nodes[element].3.split_whitespace().any(|token| token == class)
    }

    fn attr(&self, element: usize, name: &str) -> Option<&str> {
        match name {
            "id" => self.nodes[element].2,
            "class" => Some(self.nodes[element].3).filter(|classes| !classes.is_empty()),
            _ => None,
        }
    }
}

/// html > body > (div#main.card > (p, p.note, span), div.card > p.note)
fn sample() -> Tree {
    Tree {
        nodes: vec![
            ("html", None, None, ""),
            ("body", Some(0), None, ""),
            ("div", Some(1), Some("main"), "card wide"),
            ("p", Some(2), None, ""),
            ("p", Some(2), None, "note"),
            ("span", Some(2), None, ""),
            ("div", Some(1), None, "card"),
            ("p", Some(6), None, "note"),
        ],
    }
}

fn query(tree: &Tree, selector: &str) -> Vec<usize> {
    let list = parse_selector_list(selector).expect("selector parses");
    query_all(tree, 0..tree.nodes.len(), &list)
}

#[test]
fn compound_and_combinator_matching() {
    let _ = env_logger::builder().is_test(true).try_init();
    let tree = sample();
    assert_eq!(query(&tree, "p.note"), vec![4, 7]);
    assert_eq!(query(&tree, "div#main > p"), vec![3, 4]);
    assert_eq!(query(&tree, "body p"), vec![3, 4, 7]);
    assert_eq!(query(&tree, "p + span"), vec![5]);
    assert_eq!(query(&tree, "p ~ span"), vec![5]);
    assert_eq!(query(&tree, ".card.wide"), vec![2]);
    assert_eq!(query(&tree, "[id=main]"), vec![2]);
    assert_eq!(query(&tree, "[class]"), vec![2, 4, 6, 7]);
    assert_eq!(query(&tree, ":root"), vec![0]);
    assert_eq!(query(&tree, "span, #main"), vec![2, 5]);
}

#[test]
fn descendant_combinator_backtracks_past_nearest_ancestor() {
    let _ = env_logger::builder().is_test(true).try_init();
    let tree = sample();
    // The nearest `div` ancestor of node 7 is not `#main`; matching must keep climbing and fail.
    assert_eq!(query(&tree, "#main p.note"), vec![4]);
    assert_eq!(query(&tree, "body > div p"), vec![3, 4, 7]);
}

#[test]
fn structural_pseudo_classes() {
    let _ = env_logger::builder().is_test(true).try_init();
    let tree = sample();
    assert_eq!(query(&tree, "p:nth-child(2)"), vec![4]);
    assert_eq!(query(&tree, "div > :nth-child(odd)"), vec![3, 5, 7]);
    assert_eq!(query(&tree, "div > :first-child"), vec![3, 7]);
    assert_eq!(query(&tree, "div > :last-child"), vec![5, 7]);
    assert_eq!(query(&tree, "body > div:nth-child(-n+1)"), vec![2]);
}

#[test]
fn malformed_selectors_are_rejected() {
    let _ = env_logger::builder().is_test(true).try_init();
    for bad in ["", "   ", "> p", "p >", "p > > span", "p.", "#", "p[", "p:hover", "p:nth-child()", "a,", "p!"] {
        assert!(parse_selector_list(bad).is_err(), "{bad:?} should not parse");
    }
}

#[test]
fn serialization_reparses_to_the_same_selector() {
    let _ = env_logger::builder().is_test(true).try_init();
    for text in [
        "div#main > p.note:nth-child(2)",
        "body p + span ~ em",
        "li:nth-child(2n+1)",
        "[data-x=\"a b\"]",
    ] {
        let parsed = parse_complex_selector(text).expect("parses");
        let again = parse_complex_selector(&parsed.to_string()).expect("serialized form parses");
        assert_eq!(parsed, again);
    }
}

#[test]
fn identifiers_are_escaped_when_needed() {
    let _ = env_logger::builder().is_test(true).try_init();
    assert_eq!(serialize_identifier("main"), "main");
    assert_eq!(serialize_identifier("1st"), "\\31 st");
    assert_eq!(serialize_identifier("a:b"), "a\\:b");
    assert!(is_plain_identifier("card-wide_2"));
    assert!(!is_plain_identifier("w-1/2"));
    assert!(!is_plain_identifier(""));

    let tree = sample();
    let list = parse_selector_list(&format!("#{}", serialize_identifier("main"))).expect("parses");
    assert!(matches_selector_list(&tree, 2, &list));
}
