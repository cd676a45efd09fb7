#![forbid(unsafe_code)]

//! Text snapshots of the terminal surface.

use modalkit_core::{Event, KeyCode, KeyEvent, MouseEvent};
use modalkit_widgets::modal::{DismissalRegistry, ModalConfig, ModalWidget, Screen};
use pretty_assertions::assert_eq;

fn open(screen: &Screen, registry: &DismissalRegistry, config: ModalConfig) -> ModalWidget<Screen> {
    ModalWidget::open_in(config, screen.clone(), registry)
}

#[test]
fn delete_item_snapshot() {
    let screen = Screen::new(40, 10);
    let registry = DismissalRegistry::new();
    open(&screen, &registry, ModalConfig::new("Delete item?"));

    let expected = [
        "",
        "",
        "",
        "           ┌─ Delete item? ─┐",
        "           │                │",
        "           │      [ Close ] │",
        "           └────────────────┘",
    ]
    .join("\n");
    assert_eq!(screen.to_text(), expected);
}

#[test]
fn custom_close_text_snapshot() {
    let screen = Screen::new(30, 6);
    let registry = DismissalRegistry::new();
    open(
        &screen,
        &registry,
        ModalConfig::new("Confirm").close_text("Dismiss"),
    );

    let expected = [
        "",
        "      ┌─ Confirm ──────┐",
        "      │                │",
        "      │    [ Dismiss ] │",
        "      └────────────────┘",
    ]
    .join("\n");
    assert_eq!(screen.to_text(), expected);
}

#[test]
fn untitled_snapshot() {
    let screen = Screen::new(20, 4);
    let registry = DismissalRegistry::new();
    open(&screen, &registry, ModalConfig::default());

    let expected = [
        " ┌────────────────┐",
        " │                │",
        " │      [ Close ] │",
        " └────────────────┘",
    ]
    .join("\n");
    assert_eq!(screen.to_text(), expected);
}

#[test]
fn click_clears_and_hook_is_noop_after() {
    let screen = Screen::new(40, 10);
    let registry = DismissalRegistry::new();
    let modal = open(&screen, &registry, ModalConfig::new("Delete item?"));
    let button = screen.close_button_rect(modal.id()).expect("button rect");

    // Panel body swallows the press.
    let body = screen.panel_rect(modal.id()).expect("panel rect");
    assert!(!screen.handle_event(&Event::Mouse(MouseEvent::left_down(body.x + 1, body.y + 1))));
    assert!(modal.is_open());

    let right_edge = button.x + button.width - 1;
    assert!(screen.handle_event(&Event::Mouse(MouseEvent::left_down(right_edge, button.y))));
    assert_eq!(screen.to_text(), "");
    assert!(!registry.close_active());
}

#[test]
fn stacked_orphan_redraws_after_top_closes() {
    let screen = Screen::new(40, 10);
    let registry = DismissalRegistry::new();
    let a = open(&screen, &registry, ModalConfig::new("First"));
    let b = open(
        &screen,
        &registry,
        ModalConfig::new("Second").close_on_escape(true),
    );

    assert!(screen.to_text().contains("Second"));
    assert!(!screen.to_text().contains("First"));

    assert!(screen.handle_event(&Event::Key(KeyEvent::new(KeyCode::Escape))));
    assert!(!b.is_open());
    assert!(a.is_open());
    assert!(screen.to_text().contains("First"));
}
