#![forbid(unsafe_code)]

//! End-to-end lifecycle scenarios against the in-memory document.

use modalkit_core::{Document, KeyCode, KeyEvent, NodeId};
use modalkit_widgets::modal::{
    CLOSE_CLASS, DismissTrigger, DismissalRegistry, DisplacePolicy, ModalConfig, ModalState,
    ModalWidget, OVERLAY_CLASS, PANEL_CLASS, TITLE_CLASS, close_modal,
};
use serde_json::json;

fn only(doc: &Document, class: &str) -> NodeId {
    let found = doc.query_class(class);
    assert_eq!(found.len(), 1, "expected one .{class}, found {}", found.len());
    found[0]
}

fn panels(doc: &Document) -> usize {
    doc.query_class(PANEL_CLASS).len()
}

#[test]
fn delete_item_closed_by_its_close_control() {
    let doc = Document::new();
    let modal = ModalWidget::open(
        ModalConfig::from_props(&json!({ "title": "Delete item?" })).unwrap(),
        doc.clone(),
    );

    assert_eq!(doc.text_content(only(&doc, TITLE_CLASS)), "Delete item?");
    assert_eq!(doc.text_content(only(&doc, CLOSE_CLASS)), "Close");
    assert!(modal.is_active());

    assert!(doc.click(only(&doc, CLOSE_CLASS)));
    assert_eq!(panels(&doc), 0);
    assert_eq!(modal.state(), ModalState::Closed);
    assert_eq!(modal.closed_by(), Some(DismissTrigger::CloseControl));
    assert!(!DismissalRegistry::global().close_active());
}

#[test]
fn confirm_closed_by_global_hook_then_noop() {
    let doc = Document::new();
    let modal = ModalWidget::open(
        ModalConfig::from_props(&json!({ "title": "Confirm", "closeText": "Dismiss" })).unwrap(),
        doc.clone(),
    );
    assert_eq!(doc.text_content(only(&doc, CLOSE_CLASS)), "Dismiss");

    close_modal();
    assert_eq!(panels(&doc), 0);
    assert_eq!(modal.closed_by(), Some(DismissTrigger::GlobalHook));

    let nodes = doc.node_count();
    close_modal();
    assert_eq!(doc.node_count(), nodes);
    assert_eq!(modal.state(), ModalState::Closed);
}

#[test]
fn second_modal_takes_over_the_hook() {
    let doc = Document::new();
    let a = ModalWidget::open(ModalConfig::new("A"), doc.clone());
    let b = ModalWidget::open(ModalConfig::new("B"), doc.clone());
    assert_eq!(panels(&doc), 2);

    close_modal();
    assert!(a.is_open());
    assert!(!b.is_open());
    assert_eq!(panels(&doc), 1);
    assert_eq!(doc.text_content(only(&doc, TITLE_CLASS)), "A");

    // A is no longer reachable through the hook.
    close_modal();
    assert!(a.is_open());

    a.close();
    assert_eq!(panels(&doc), 0);
}

#[test]
fn close_policy_replaces_previous_modal() {
    let doc = Document::new();
    let registry = DismissalRegistry::new();
    let a = ModalWidget::open_in(ModalConfig::new("A"), doc.clone(), &registry);
    let b = ModalWidget::open_in(
        ModalConfig::new("B").displace(DisplacePolicy::Close),
        doc.clone(),
        &registry,
    );

    assert_eq!(a.closed_by(), Some(DismissTrigger::Displaced));
    assert_eq!(panels(&doc), 1);
    assert!(registry.is_active(b.id()));
}

#[test]
fn close_twice_matches_close_once() {
    let registry = DismissalRegistry::new();
    let once = Document::new();
    let twice = Document::new();
    let m1 = ModalWidget::open_in(ModalConfig::new("x"), once.clone(), &registry);
    m1.close();
    let m2 = ModalWidget::open_in(ModalConfig::new("x"), twice.clone(), &registry);
    m2.close();
    m2.close();

    assert_eq!(m1.state(), m2.state());
    assert_eq!(once.node_count(), twice.node_count());
    assert_eq!(once.listener_count(), twice.listener_count());
    assert_eq!(registry.active(), None);
}

#[test]
fn closing_orphan_does_not_clear_newer_registration() {
    let doc = Document::new();
    let registry = DismissalRegistry::new();
    let a = ModalWidget::open_in(ModalConfig::new("A"), doc.clone(), &registry);
    let b = ModalWidget::open_in(ModalConfig::new("B"), doc.clone(), &registry);

    a.close();
    assert!(registry.is_active(b.id()));
    assert!(registry.close_active());
    assert_eq!(panels(&doc), 0);
}

#[test]
fn escape_closes_when_enabled() {
    let doc = Document::new();
    let registry = DismissalRegistry::new();
    let plain = ModalWidget::open_in(ModalConfig::new("plain"), doc.clone(), &registry);
    assert!(!doc.key(KeyEvent::new(KeyCode::Escape)));
    assert!(plain.is_open());

    let escapable = ModalWidget::open_in(
        ModalConfig::new("esc").close_on_escape(true),
        doc.clone(),
        &registry,
    );
    assert!(doc.key(KeyEvent::new(KeyCode::Escape)));
    assert_eq!(escapable.closed_by(), Some(DismissTrigger::Escape));
    assert!(plain.is_open());
}

#[test]
fn escape_does_not_reach_covered_modal() {
    let doc = Document::new();
    let registry = DismissalRegistry::new();
    let below = ModalWidget::open_in(
        ModalConfig::new("below").close_on_escape(true),
        doc.clone(),
        &registry,
    );
    let above = ModalWidget::open_in(ModalConfig::new("above"), doc.clone(), &registry);

    assert!(!doc.key(KeyEvent::new(KeyCode::Escape)));
    assert!(below.is_open());
    assert!(above.is_open());

    above.close();
    assert!(doc.key(KeyEvent::new(KeyCode::Escape)));
    assert_eq!(below.closed_by(), Some(DismissTrigger::Escape));
    assert_eq!(panels(&doc), 0);
}

#[test]
fn dropped_handle_remains_closable() {
    let doc = Document::new();
    let registry = DismissalRegistry::new();
    drop(ModalWidget::open_in(
        ModalConfig::new("fire and forget"),
        doc.clone(),
        &registry,
    ));

    assert_eq!(panels(&doc), 1);
    assert!(registry.close_active());
    assert_eq!(panels(&doc), 0);
    assert_eq!(doc.node_count(), 1);
}

#[test]
fn dropped_handle_closable_by_its_button() {
    let doc = Document::new();
    let registry = DismissalRegistry::new();
    drop(ModalWidget::open_in(ModalConfig::new("x"), doc.clone(), &registry));

    doc.click(only(&doc, CLOSE_CLASS));
    assert_eq!(panels(&doc), 0);
    assert_eq!(registry.active(), None);
}

#[test]
fn externally_removed_nodes_count_as_removed() {
    let doc = Document::new();
    let registry = DismissalRegistry::new();
    let modal = ModalWidget::open_in(ModalConfig::new("x"), doc.clone(), &registry);

    assert!(doc.remove(only(&doc, OVERLAY_CLASS)));
    modal.close();
    assert_eq!(modal.state(), ModalState::Closed);
    assert_eq!(registry.active(), None);
}

#[test]
fn empty_title_renders_empty_heading() {
    let doc = Document::new();
    let registry = DismissalRegistry::new();
    let modal = ModalWidget::open_in(ModalConfig::default(), doc.clone(), &registry);
    assert_eq!(modal.title(), "");
    assert_eq!(doc.text_content(only(&doc, TITLE_CLASS)), "");
    assert_eq!(doc.text_content(only(&doc, CLOSE_CLASS)), "Close");
    modal.close();
}

#[test]
fn markup_is_escaped_in_labels() {
    let doc = Document::new();
    let registry = DismissalRegistry::new();
    let modal = ModalWidget::open_in(
        ModalConfig::new("<b>bold</b>").close_text("a & b"),
        doc.clone(),
        &registry,
    );
    let html = doc.outer_html(only(&doc, PANEL_CLASS));
    assert!(html.contains("&lt;b&gt;bold&lt;/b&gt;"));
    assert!(html.contains("a &amp; b"));
    modal.close();
}
