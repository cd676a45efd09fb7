#![forbid(unsafe_code)]

//! Render capability for modals.
//!
//! A [`ModalSurface`] turns a [`ModalView`] into mounted nodes and removes
//! them again. The widget's state machine only ever talks to this trait, so
//! it runs the same against the in-memory [`Document`], the terminal
//! [`Screen`](super::Screen), a browser DOM, or a test double.
//!
//! # Contract
//!
//! - `render` mounts exactly one set of nodes and returns the handle that
//!   identifies them.
//! - The surface keeps the [`CloseTrigger`] for as long as the nodes are
//!   mounted and fires it when the close control is activated. Keeping the
//!   trigger keeps the modal alive, the way a DOM listener does.
//! - `unmount` removes the nodes and drops the trigger. Nodes that were
//!   already removed by someone else count as removed; `unmount` never fails.

use std::fmt;
use std::rc::Rc;

use modalkit_core::{Document, DocumentEvent, EventKind, NodeId};

use super::registry::{Dismiss, DismissTrigger, ModalId};

/// Everything a surface needs to draw a modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModalView<'a> {
    /// Instance the nodes belong to.
    pub id: ModalId,
    /// Heading text (may be empty).
    pub title: &'a str,
    /// Close control label.
    pub close_text: &'a str,
    /// Whether Escape should fire the trigger.
    pub close_on_escape: bool,
}

/// Callback a surface fires when a dismissal control is activated.
///
/// Every fire converges on the owning modal's single close routine.
#[derive(Clone)]
pub struct CloseTrigger {
    target: Rc<dyn Dismiss>,
}

impl fmt::Debug for CloseTrigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CloseTrigger")
            .field("modal", &self.target.modal_id())
            .finish()
    }
}

impl CloseTrigger {
    /// Wrap a dismissable target.
    pub fn new(target: Rc<dyn Dismiss>) -> Self {
        Self { target }
    }

    /// The modal this trigger closes.
    #[must_use]
    pub fn modal_id(&self) -> ModalId {
        self.target.modal_id()
    }

    /// Close-control activation.
    pub fn fire(&self) {
        self.target.dismiss(DismissTrigger::CloseControl);
    }

    /// Fire with an explicit trigger (e.g. Escape).
    pub fn fire_as(&self, trigger: DismissTrigger) {
        self.target.dismiss(trigger);
    }
}

/// Render capability used by [`ModalWidget`](super::ModalWidget).
pub trait ModalSurface {
    /// Identifies the nodes mounted by one `render` call.
    type Handle;

    /// Mount the modal and wire `trigger` to its close control.
    fn render(&mut self, view: &ModalView<'_>, trigger: CloseTrigger) -> Self::Handle;

    /// Remove the nodes identified by `handle`.
    fn unmount(&mut self, handle: Self::Handle);
}

/// CSS class of the full-page overlay element.
pub const OVERLAY_CLASS: &str = "modal-overlay";
/// CSS class of the dialog panel.
pub const PANEL_CLASS: &str = "modal";
/// CSS class of the heading.
pub const TITLE_CLASS: &str = "modal-title";
/// CSS class of the close control.
pub const CLOSE_CLASS: &str = "modal-close";

/// Nodes mounted into a [`Document`] for one modal.
///
/// ```text
/// div.modal-overlay
/// └── div.modal[role=dialog]
///     ├── h3.modal-title
///     └── button.modal-close
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentMount {
    pub overlay: NodeId,
    pub panel: NodeId,
    pub heading: NodeId,
    pub close_button: NodeId,
}

impl ModalSurface for Document {
    type Handle = DocumentMount;

    fn render(&mut self, view: &ModalView<'_>, trigger: CloseTrigger) -> DocumentMount {
        let raw_id = view.id.id().to_string();
        let heading_id = format!("modal-title-{raw_id}");

        let overlay = self.create_element("div");
        self.set_attribute(overlay, "class", OVERLAY_CLASS);
        self.set_attribute(overlay, "data-modal-id", &raw_id);

        let panel = self.create_element("div");
        self.set_attribute(panel, "class", PANEL_CLASS);
        self.set_attribute(panel, "role", "dialog");
        self.set_attribute(panel, "aria-modal", "true");
        self.set_attribute(panel, "aria-labelledby", &heading_id);

        let heading = self.create_element("h3");
        self.set_attribute(heading, "class", TITLE_CLASS);
        self.set_attribute(heading, "id", &heading_id);
        if !view.title.is_empty() {
            let text = self.create_text(view.title);
            self.append_child(heading, text);
        }

        let close_button = self.create_element("button");
        self.set_attribute(close_button, "class", CLOSE_CLASS);
        self.set_attribute(close_button, "type", "button");
        if !view.close_text.is_empty() {
            let text = self.create_text(view.close_text);
            self.append_child(close_button, text);
        }

        self.append_child(panel, heading);
        self.append_child(panel, close_button);
        self.append_child(overlay, panel);

        let on_click = trigger.clone();
        self.add_listener(
            close_button,
            EventKind::Click,
            Rc::new(move |_: &DocumentEvent| on_click.fire()),
        );

        if view.close_on_escape {
            let on_key = trigger;
            self.add_listener(
                overlay,
                EventKind::KeyDown,
                Rc::new(move |event: &DocumentEvent| {
                    if let DocumentEvent::Key(key) = event
                        && key.is_escape_press()
                    {
                        on_key.fire_as(DismissTrigger::Escape);
                    }
                }),
            );
        }

        // Attach last so the subtree appears in one step.
        let body = self.body();
        self.append_child(body, overlay);

        DocumentMount {
            overlay,
            panel,
            heading,
            close_button,
        }
    }

    fn unmount(&mut self, handle: DocumentMount) {
        if !self.remove(handle.overlay) {
            tracing::trace!(
                target: "modalkit::modal",
                overlay = handle.overlay.id(),
                "overlay already removed"
            );
        }
    }
}
