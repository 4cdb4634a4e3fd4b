use dom::style::{Display, PointerEvents};
use dom::{Document, PageEvent, Rect, TEXT_LINE_HEIGHT, Viewport};

fn parse(html: &str) -> Document {
    Document::parse(html, Viewport::new(800.0, 600.0)).expect("parse")
}

#[test]
fn blocks_stack_in_document_order() {
    let _ = env_logger::builder().is_test(true).try_init();
    let doc = parse("<body><div id='a'>Hello</div><div id='b' style='height: 100px'>x</div></body>");
    let first = doc.get_element_by_id("a").expect("a");
    let second = doc.get_element_by_id("b").expect("b");
    assert_eq!(
        doc.bounding_client_rect(first),
        Rect::new(0.0, 0.0, 800.0, TEXT_LINE_HEIGHT)
    );
    assert_eq!(
        doc.bounding_client_rect(second),
        Rect::new(0.0, TEXT_LINE_HEIGHT, 800.0, 100.0)
    );
    let body = doc.body().expect("body");
    assert!((doc.bounding_client_rect(body).height - 120.0).abs() < f64::EPSILON);
    assert!((doc.scroll_height() - 600.0).abs() < f64::EPSILON);
}

#[test]
fn display_none_subtree_has_no_boxes() {
    let _ = env_logger::builder().is_test(true).try_init();
    let doc = parse("<body><div id='outer' style='display: none'><p id='inner'>text</p></div></body>");
    let outer = doc.get_element_by_id("outer").expect("outer");
    let inner = doc.get_element_by_id("inner").expect("inner");
    assert_eq!(doc.computed_style(outer).display, Display::None);
    assert!(doc.bounding_client_rect(outer).is_empty());
    assert!(doc.bounding_client_rect(inner).is_empty());
}

#[test]
fn hidden_attribute_and_head_are_not_displayed() {
    let _ = env_logger::builder().is_test(true).try_init();
    let doc = parse("<head><title>t</title></head><body><div id='x' hidden>x</div></body>");
    let div = doc.get_element_by_id("x").expect("div");
    assert_eq!(doc.computed_style(div).display, Display::None);
}

#[test]
fn percent_sizes_and_translate() {
    let _ = env_logger::builder().is_test(true).try_init();
    let doc = parse(
        "<body><div id='box' style='width: 50%; height: 40px; transform: translate(10px, -50%)'>\
         <span id='child'>c</span></div></body>",
    );
    let element = doc.get_element_by_id("box").expect("box");
    let child = doc.get_element_by_id("child").expect("child");
    assert_eq!(doc.bounding_client_rect(element), Rect::new(10.0, -20.0, 400.0, 40.0));
    assert_eq!(
        doc.bounding_client_rect(child),
        Rect::new(10.0, -20.0, 400.0, TEXT_LINE_HEIGHT)
    );
}

#[test]
fn absolute_boxes_leave_the_flow() {
    let _ = env_logger::builder().is_test(true).try_init();
    let doc = parse(
        "<body><div id='pos' style='position: absolute; left: 30px; top: 200px; width: 50px; height: 10px'></div>\
         <div id='flow'>after</div></body>",
    );
    let positioned = doc.get_element_by_id("pos").expect("pos");
    let flow = doc.get_element_by_id("flow").expect("flow");
    assert_eq!(doc.bounding_client_rect(positioned), Rect::new(30.0, 200.0, 50.0, 10.0));
    assert_eq!(doc.bounding_client_rect(flow), Rect::new(0.0, 0.0, 800.0, TEXT_LINE_HEIGHT));
}

#[test]
fn scrolling_moves_client_rects_but_not_fixed_boxes() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = parse(
        "<body><div id='tall' style='height: 2000px'></div>\
         <div id='bar' style='position: fixed; left: 0; top: 0; width: 100%; height: 50px'></div></body>",
    );
    let tall = doc.get_element_by_id("tall").expect("tall");
    let bar = doc.get_element_by_id("bar").expect("bar");
    assert!((doc.scroll_height() - 2000.0).abs() < f64::EPSILON);

    let mut rx = doc.subscribe();
    doc.scroll_to(0.0, 5000.0);
    assert_eq!(rx.try_recv(), Ok(PageEvent::Scroll { x: 0.0, y: 1400.0 }));
    assert!((doc.viewport().scroll_y - 1400.0).abs() < f64::EPSILON);
    assert!((doc.bounding_client_rect(tall).y + 1400.0).abs() < f64::EPSILON);
    assert_eq!(doc.bounding_client_rect(bar), Rect::new(0.0, 0.0, 800.0, 50.0));

    doc.scroll_by(0.0, -400.0);
    assert!((doc.viewport().scroll_y - 1000.0).abs() < f64::EPSILON);
}

#[test]
fn resize_relayouts_and_notifies() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = parse("<body><div id='a'>x</div></body>");
    let element = doc.get_element_by_id("a").expect("a");
    let mut rx = doc.subscribe();
    doc.resize(400.0, 300.0);
    assert_eq!(
        rx.try_recv(),
        Ok(PageEvent::Resize {
            width: 400.0,
            height: 300.0
        })
    );
    assert!((doc.bounding_client_rect(element).width - 400.0).abs() < f64::EPSILON);
}

#[test]
fn hit_testing_skips_pointer_transparent_layers() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = parse(
        "<body><div id='target' style='height: 100px'>content</div>\
         <div id='overlay' style='position: fixed; left: 0; top: 0; width: 100%; height: 100%'></div></body>",
    );
    let target = doc.get_element_by_id("target").expect("target");
    let overlay = doc.get_element_by_id("overlay").expect("overlay");
    assert_eq!(doc.element_from_point(50.0, 50.0), Some(overlay));

    doc.set_style_property(overlay, "pointer-events", Some("none"))
        .expect("set style");
    assert_eq!(doc.computed_style(overlay).pointer_events, PointerEvents::None);
    assert_eq!(doc.element_from_point(50.0, 50.0), Some(target));
    assert_eq!(doc.element_from_point(900.0, 50.0), None);

    doc.set_style_property(overlay, "pointer-events", None)
        .expect("clear style");
    assert_eq!(doc.attribute(overlay, "style").map(|style| style.contains("pointer-events")), Some(false));
    assert_eq!(doc.element_from_point(50.0, 50.0), Some(overlay));
}

#[test]
fn zero_sized_boxes_scroll_like_any_other() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = parse(
        "<body><div style='height: 1500px'></div>\
         <div id='dot' style='width: 0; height: 0'></div>\
         <div id='gone' style='display: none'></div>\
         <div style='height: 1500px'></div></body>",
    );
    let dot = doc.get_element_by_id("dot").expect("dot");
    let gone = doc.get_element_by_id("gone").expect("gone");
    assert_eq!(doc.bounding_client_rect(dot), Rect::new(0.0, 1500.0, 0.0, 0.0));

    doc.scroll_to(0.0, 1000.0);
    assert_eq!(doc.bounding_client_rect(dot), Rect::new(0.0, 500.0, 0.0, 0.0));
    assert_eq!(doc.bounding_client_rect(gone), Rect::default());
}

#[test]
fn invalid_lengths_fall_back_to_defaults() {
    let _ = env_logger::builder().is_test(true).try_init();
    let doc = parse(
        "<body><div id='shifted' style='left: infpx; position: relative; height: 10px'></div>\
         <div id='wide' style='width: NaNpx; height: 20px'></div>\
         <div id='moved' style='width: 100px; height: 10px; transform: translateX(-100%) translateX(10px)'></div></body>",
    );
    let shifted = doc.get_element_by_id("shifted").expect("shifted");
    let wide = doc.get_element_by_id("wide").expect("wide");
    let moved = doc.get_element_by_id("moved").expect("moved");
    assert_eq!(doc.bounding_client_rect(shifted), Rect::new(0.0, 0.0, 800.0, 10.0));
    assert_eq!(doc.bounding_client_rect(wide), Rect::new(0.0, 10.0, 800.0, 20.0));
    assert_eq!(doc.bounding_client_rect(moved), Rect::new(-90.0, 30.0, 100.0, 10.0));
}
