use anchor::{Anchor, capture, element_position, resolve};
use criterion::{Criterion, criterion_group, criterion_main};
use dom::{Document, Viewport};
use std::fmt::Write as _;
use std::hint::black_box;

/// A page of `count` article cards, each with a heading and a paragraph.
fn build_page(count: usize) -> Document {
    let mut html = String::from("<body><main>");
    for index in 0..count {
        let _ignored = write!(
            html,
            "<article class='card'><h2>Heading {index}</h2><p>Body text for card number {index}.</p></article>"
        );
    }
    html.push_str("</main></body>");
    Document::parse(&html, Viewport::new(1280.0, 720.0)).unwrap()
}

fn anchors(doc: &Document) -> Vec<Anchor> {
    doc.query_selector_all("p")
        .unwrap()
        .into_iter()
        .step_by(10)
        .map(|element| capture(doc, element, None))
        .collect()
}

fn bench_resolve(c: &mut Criterion) {
    let doc = build_page(200);
    let captured = anchors(&doc);

    c.bench_function("resolve_by_selector", |b| {
        b.iter(|| {
            for anchor in &captured {
                black_box(resolve(&doc, anchor));
            }
        });
    });

    let text_only: Vec<Anchor> = captured
        .iter()
        .map(|anchor| Anchor {
            selector: "#missing".to_owned(),
            xpath: String::new(),
            ..anchor.clone()
        })
        .collect();
    c.bench_function("resolve_by_text_quote", |b| {
        b.iter(|| {
            for anchor in &text_only {
                black_box(resolve(&doc, anchor));
            }
        });
    });

    c.bench_function("element_position_full_set", |b| {
        b.iter(|| {
            for anchor in &captured {
                black_box(element_position(&doc, anchor));
            }
        });
    });
}

criterion_group!(resolve_benches, bench_resolve);
criterion_main!(resolve_benches);
