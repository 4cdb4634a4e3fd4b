use dom::{Document, Viewport};
use pin_tracker::{OVERLAY_MARKER, PointerPassthrough, capture_click, overlay::is_overlay_ui};

const PAGE: &str = "<body>\
    <p id='para' style='width: 800px; height: 100px'>Hello there</p>\
    <div id='toolbar' data-design-comments style='position: fixed; left: 0; top: 500px; width: 200px; height: 50px'>\
    <button id='add'>Add</button></div>\
    <div id='overlay' style='position: fixed; left: 0; top: 0; width: 800px; height: 600px'></div>\
    </body>";

fn page() -> Document {
    Document::parse(PAGE, Viewport::new(800.0, 600.0)).expect("parse")
}

#[test]
fn clicks_pass_through_the_overlay_onto_the_page() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = page();
    let overlay = doc.get_element_by_id("overlay").expect("overlay");
    assert_eq!(doc.element_from_point(40.0, 50.0), Some(overlay));

    let anchor = capture_click(&mut doc, overlay, 40.0, 50.0)
        .expect("capture")
        .expect("page element under click");
    assert_eq!(anchor.selector, "p#para");
    assert_eq!(anchor.text_quote.map(|quote| quote.exact), Some("Hello there".to_owned()));

    assert_eq!(doc.style_property(overlay, "pointer-events"), None);
    assert_eq!(doc.style_property(overlay, "width").as_deref(), Some("800px"));
    assert_eq!(doc.element_from_point(40.0, 50.0), Some(overlay));
}

#[test]
fn clicks_on_comment_ui_capture_nothing() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = page();
    let overlay = doc.get_element_by_id("overlay").expect("overlay");
    let button = doc.get_element_by_id("add").expect("button");
    assert!(is_overlay_ui(&doc, button));
    assert!(doc.attribute(doc.get_element_by_id("toolbar").expect("toolbar"), OVERLAY_MARKER).is_some());

    assert_eq!(capture_click(&mut doc, overlay, 10.0, 510.0).expect("capture"), None);
    assert_eq!(capture_click(&mut doc, overlay, 400.0, 300.0).expect("capture"), None);
}

#[test]
fn passthrough_restores_an_explicit_value() {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut doc = page();
    let overlay = doc.get_element_by_id("overlay").expect("overlay");
    doc.set_style_property(overlay, "pointer-events", Some("auto")).expect("style");
    {
        let guard = PointerPassthrough::engage(&mut doc, overlay).expect("engage");
        assert_eq!(guard.document().style_property(overlay, "pointer-events").as_deref(), Some("none"));
    }
    assert_eq!(doc.style_property(overlay, "pointer-events").as_deref(), Some("auto"));

    let text = doc.create_text("loose");
    assert!(capture_click(&mut doc, text, 10.0, 10.0).is_err());
}
