// Tests for the page content merger

use pageturn_dom::head::head_selector;
use pageturn_dom::{Container, ContentMerger, Dom, DomError, MemoryDocument};

fn live_page() -> MemoryDocument {
    let html = concat!(
        "<html><head>",
        r#"<meta charset="utf-8">"#,
        "<title>Home</title>",
        r#"<meta name="description" content="Welcome home">"#,
        r#"<link rel="stylesheet" href="/app.css">"#,
        "</head><body>",
        r#"<div id="pageturn-wrapper">"#,
        r#"<div class="pageturn-container" data-namespace="home">Hello</div>"#,
        "</div></body></html>",
    );
    MemoryDocument::from_html(html).unwrap()
}

fn shop_page() -> &'static str {
    concat!(
        "<html><head>",
        "<title>Shop</title>",
        r#"<meta name="description" content="All our wares">"#,
        r#"<meta property="og:title" content="Shop">"#,
        "</head><body>",
        r#"<div id="pageturn-wrapper">"#,
        r#"<div class="pageturn-container" data-namespace="shop">Wares</div>"#,
        "</div></body></html>",
    )
}

// ============================================================================
// Parse Tests
// ============================================================================

#[test]
fn test_parse_returns_hidden_detached_container() {
    let live = live_page();
    let mut merger = ContentMerger::new();

    let container = merger.parse(shop_page(), &live).unwrap();
    assert_eq!(container.element.tag, "div");
    assert!(container.is_hidden());
    assert_eq!(container.element.inner_html, "Wares");
    // Nothing was attached to the live page.
    assert!(live.wrapper_children().is_empty());
}

#[test]
fn test_parse_preserves_existing_inline_style() {
    let live = live_page();
    let mut merger = ContentMerger::new();
    let html = concat!(
        "<html><head><title>S</title></head><body>",
        r#"<div class="pageturn-container" style="color: red">x</div>"#,
        "</body></html>",
    );

    let container = merger.parse(html, &live).unwrap();
    let style = container.element.attr("style").unwrap();
    assert!(style.contains("color: red"));
    assert!(container.is_hidden());
}

#[test]
fn test_container_json_round_trip() {
    let live = live_page();
    let mut merger = ContentMerger::new();
    let container = merger.parse(shop_page(), &live).unwrap();

    let json = serde_json::to_string(&container).unwrap();
    let back: Container = serde_json::from_str(&json).unwrap();
    assert_eq!(back, container);
    assert!(back.is_hidden());
}

#[test]
fn test_parse_records_last_html() {
    let live = live_page();
    let mut merger = ContentMerger::new();
    assert!(merger.last_html().is_none());

    merger.parse(shop_page(), &live).unwrap();
    assert_eq!(merger.last_html(), Some(shop_page()));
}

#[test]
fn test_parse_without_head_is_malformed() {
    let live = live_page();
    let mut merger = ContentMerger::new();

    let err = merger
        .parse("<html><body>no head</body></html>", &live)
        .unwrap_err();
    assert!(matches!(err, DomError::MalformedDocument(_)));
    assert!(merger.last_html().is_none());
}

#[test]
fn test_parse_without_container_is_malformed() {
    let live = live_page();
    let mut merger = ContentMerger::new();
    let html = "<html><head><title>S</title></head><body><div>plain</div></body></html>";

    let err = merger.parse(html, &live).unwrap_err();
    assert!(matches!(err, DomError::MalformedDocument(_)));
}

#[test]
fn test_parse_without_live_wrapper_fails() {
    let bare =
        MemoryDocument::from_html("<html><head><title>B</title></head><body></body></html>")
            .unwrap();
    let mut merger = ContentMerger::new();

    let err = merger.parse(shop_page(), &bare).unwrap_err();
    assert!(matches!(err, DomError::ContainerNotFound));
}

// ============================================================================
// Head Update Tests
// ============================================================================

#[test]
fn test_update_head_replaces_allowlisted_elements() {
    let mut live = live_page();
    let merger = ContentMerger::new();

    merger.update_head(shop_page(), &mut live).unwrap();

    let selector = head_selector();
    let titles: Vec<_> = live
        .head_select(&selector)
        .into_iter()
        .filter(|e| e.tag == "title")
        .collect();
    assert_eq!(titles.len(), 1);
    assert_eq!(titles[0].text, "Shop");
}

#[test]
fn test_update_head_appends_in_incoming_order() {
    let mut live = live_page();
    let merger = ContentMerger::new();

    merger.update_head(shop_page(), &mut live).unwrap();

    let matched = live.head_select(&head_selector());
    assert_eq!(matched.len(), 3);
    assert_eq!(matched[0].tag, "title");
    assert_eq!(matched[1].attr("name"), Some("description"));
    assert_eq!(matched[2].attr("property"), Some("og:title"));
}

#[test]
fn test_update_head_leaves_non_allowlisted_untouched() {
    let mut live = live_page();
    let merger = ContentMerger::new();

    merger.update_head(shop_page(), &mut live).unwrap();

    // charset meta and stylesheet keep their original positions.
    assert_eq!(live.head()[0].attr("charset"), Some("utf-8"));
    assert_eq!(live.head()[1].attr("rel"), Some("stylesheet"));
}

#[test]
fn test_update_head_is_idempotent() {
    let mut live = live_page();
    let merger = ContentMerger::new();

    merger.update_head(shop_page(), &mut live).unwrap();
    let after_first = live.head().to_vec();

    merger.update_head(shop_page(), &mut live).unwrap();
    assert_eq!(live.head(), after_first.as_slice());
}

#[test]
fn test_update_head_without_head_block_fails() {
    let mut live = live_page();
    let merger = ContentMerger::new();
    let before = live.head().to_vec();

    let err = merger
        .update_head("<html><body></body></html>", &mut live)
        .unwrap_err();
    assert!(matches!(err, DomError::MalformedDocument(_)));
    // Extraction failed before any mutation.
    assert_eq!(live.head(), before.as_slice());
}

// ============================================================================
// Wrapper and Namespace Tests
// ============================================================================

#[test]
fn test_locate_wrapper() {
    let live = live_page();
    let merger = ContentMerger::new();

    let wrapper = merger.locate_wrapper(&live).unwrap();
    assert_eq!(wrapper.tag, "div");
    assert_eq!(wrapper.attr("id"), Some("pageturn-wrapper"));
}

#[test]
fn test_locate_wrapper_missing() {
    let bare =
        MemoryDocument::from_html("<html><head><title>B</title></head><body></body></html>")
            .unwrap();
    let merger = ContentMerger::new();

    let err = merger.locate_wrapper(&bare).unwrap_err();
    assert!(matches!(err, DomError::WrapperNotFound));
}

#[test]
fn test_read_namespace_from_container() {
    let live = live_page();
    let mut merger = ContentMerger::new();

    let container = merger.parse(shop_page(), &live).unwrap();
    assert_eq!(
        merger.read_namespace(&container.element),
        Some("shop".to_string())
    );
}

#[test]
fn test_read_namespace_absent() {
    let live = live_page();
    let mut merger = ContentMerger::new();
    let html = concat!(
        "<html><head><title>S</title></head><body>",
        r#"<div class="pageturn-container">x</div>"#,
        "</body></html>",
    );

    let container = merger.parse(html, &live).unwrap();
    assert!(merger.read_namespace(&container.element).is_none());
}

#[test]
fn test_read_namespace_custom_data_key() {
    let live = live_page();
    let mut merger = ContentMerger::new().with_namespace_data("view");
    let html = concat!(
        "<html><head><title>S</title></head><body>",
        r#"<div class="pageturn-container" data-view="gallery">x</div>"#,
        "</body></html>",
    );

    let container = merger.parse(html, &live).unwrap();
    assert_eq!(
        merger.read_namespace(&container.element),
        Some("gallery".to_string())
    );
}

// ============================================================================
// Container Insertion Tests
// ============================================================================

#[test]
fn test_insert_container_appends_into_wrapper() {
    let mut live = live_page();
    let mut merger = ContentMerger::new();

    let container = merger.parse(shop_page(), &live).unwrap();
    merger.insert_container(&container, &mut live).unwrap();

    assert_eq!(live.wrapper_children().len(), 1);
    assert!(live.wrapper_children()[0].is_hidden());
    assert_eq!(live.wrapper_children()[0].element.inner_html, "Wares");

    let rendered = live.wrapper_children()[0].outer_html();
    assert!(rendered.starts_with("<div"));
    assert!(rendered.contains("visibility: hidden"));
    assert!(rendered.ends_with("</div>"));
}

#[test]
fn test_insert_container_requires_wrapper() {
    let live = live_page();
    let mut bare =
        MemoryDocument::from_html("<html><head><title>B</title></head><body></body></html>")
            .unwrap();
    let mut merger = ContentMerger::new();

    let container = merger.parse(shop_page(), &live).unwrap();
    let err = merger.insert_container(&container, &mut bare).unwrap_err();
    assert!(matches!(err, DomError::WrapperNotFound));
}

// ============================================================================
// Custom Marker Tests
// ============================================================================

#[test]
fn test_invalid_container_class_keeps_previous() {
    let live = live_page();
    let mut merger = ContentMerger::new().with_container_class("{not-a-class}");

    // The bad class was rejected; the default still finds the container.
    let container = merger.parse(shop_page(), &live).unwrap();
    assert_eq!(container.element.inner_html, "Wares");
}

#[test]
fn test_custom_wrapper_and_container_markers() {
    let live_html = concat!(
        "<html><head><title>Home</title></head><body>",
        r#"<main id="stage"></main>"#,
        "</body></html>",
    );
    let live = MemoryDocument::from_html(live_html).unwrap();

    let mut merger = ContentMerger::new()
        .with_wrapper_id("stage")
        .with_container_class("scene");
    let incoming = concat!(
        "<html><head><title>S</title></head><body>",
        r#"<section class="scene">x</section>"#,
        "</body></html>",
    );

    let container = merger.parse(incoming, &live).unwrap();
    assert_eq!(container.element.tag, "section");

    let wrapper = merger.locate_wrapper(&live).unwrap();
    assert_eq!(wrapper.tag, "main");
}
