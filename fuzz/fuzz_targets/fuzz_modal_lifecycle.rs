#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use modalkit_core::{Document, Event, KeyCode, KeyEvent, MouseEvent};
use modalkit_widgets::modal::{
    CLOSE_CLASS, DismissalRegistry, DisplacePolicy, ModalConfig, ModalWidget, PANEL_CLASS, Screen,
};

#[derive(Debug, Arbitrary)]
enum Op {
    Open { title: String, escape: bool, replace: bool },
    Close(u8),
    Click(u8),
    Escape,
    Hook,
    ScreenPress { x: u8, y: u8 },
}

fuzz_target!(|ops: Vec<Op>| {
    if ops.len() > 256 {
        return;
    }

    let doc = Document::new();
    let screen = Screen::new(60, 20);
    let registry = DismissalRegistry::new();
    let mut docs: Vec<ModalWidget<Document>> = Vec::new();
    let mut screens: Vec<ModalWidget<Screen>> = Vec::new();

    for op in ops {
        match op {
            Op::Open {
                title,
                escape,
                replace,
            } => {
                let policy = if replace {
                    DisplacePolicy::Close
                } else {
                    DisplacePolicy::Orphan
                };
                let config = ModalConfig::new(title)
                    .close_on_escape(escape)
                    .displace(policy);
                if docs.len() <= screens.len() {
                    docs.push(ModalWidget::open_in(config, doc.clone(), &registry));
                } else {
                    screens.push(ModalWidget::open_in(config, screen.clone(), &registry));
                }
            }
            Op::Close(i) => {
                if let Some(m) = docs.get(usize::from(i)) {
                    m.close();
                }
            }
            Op::Click(i) => {
                if let Some(&button) = doc.query_class(CLOSE_CLASS).get(usize::from(i)) {
                    doc.click(button);
                }
            }
            Op::Escape => {
                doc.key(KeyEvent::new(KeyCode::Escape));
                screen.handle_event(&Event::Key(KeyEvent::new(KeyCode::Escape)));
            }
            Op::Hook => {
                registry.close_active();
            }
            Op::ScreenPress { x, y } => {
                screen.handle_event(&Event::Mouse(MouseEvent::left_down(
                    u16::from(x),
                    u16::from(y),
                )));
            }
        }

        let open_docs = docs.iter().filter(|m| m.is_open()).count();
        assert_eq!(doc.query_class(PANEL_CLASS).len(), open_docs);
        let open_screens = screens.iter().filter(|m| m.is_open()).count();
        assert_eq!(screen.layer_count(), open_screens);
        for line in screen.render_lines() {
            assert!(!line.is_empty());
        }
    }

    for m in &docs {
        m.close();
    }
    for m in &screens {
        m.close();
    }
    assert_eq!(doc.node_count(), 1);
    assert_eq!(registry.active(), None);
});
