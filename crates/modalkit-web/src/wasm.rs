#![forbid(unsafe_code)]

//! `wasm-bindgen` exports.
//!
//! Wraps [`super::host::HostCore`] with JS-friendly types and renders into
//! the live DOM. Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::rc::Rc;

use modalkit_core::{KeyCode, KeyEvent, Modifiers};
use modalkit_widgets::modal::{
    CLOSE_CLASS, CloseTrigger, DismissTrigger, ModalSurface, ModalView, ModalWidget,
    OVERLAY_CLASS, PANEL_CLASS, TITLE_CLASS, close_modal,
};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlElement, KeyboardEvent};

use crate::host::HostCore;
use crate::props::{HostError, ModalProps};

thread_local! {
    static HOST: RefCell<HostCore<DomSurface>> = RefCell::new(HostCore::default());
    static CLOSE_HOOK: RefCell<Option<Closure<dyn FnMut()>>> = const { RefCell::new(None) };
}

impl From<HostError> for JsValue {
    fn from(err: HostError) -> Self {
        JsValue::from_str(&err.to_string())
    }
}

fn js_error(err: JsValue) -> HostError {
    HostError::Dom(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

fn document() -> Result<Document, HostError> {
    web_sys::window()
        .ok_or(HostError::Unavailable("window"))?
        .document()
        .ok_or(HostError::Unavailable("document"))
}

fn key_event(event: &KeyboardEvent) -> Option<KeyEvent> {
    let code = KeyCode::from_dom_key(&event.key())?;
    let mut modifiers = Modifiers::NONE;
    if event.shift_key() {
        modifiers |= Modifiers::SHIFT;
    }
    if event.alt_key() {
        modifiers |= Modifiers::ALT;
    }
    if event.ctrl_key() {
        modifiers |= Modifiers::CTRL;
    }
    if event.meta_key() {
        modifiers |= Modifiers::SUPER;
    }
    Some(KeyEvent::new(code).with_modifiers(modifiers))
}

/// Bind `window.closeModal` once per page.
fn install_close_hook() -> Result<(), HostError> {
    if !HOST.with(|host| host.borrow_mut().claim_hook_install()) {
        return Ok(());
    }
    let window = web_sys::window().ok_or(HostError::Unavailable("window"))?;
    let hook = Closure::<dyn FnMut()>::new(close_modal);
    js_sys::Reflect::set(
        &window,
        &JsValue::from_str("closeModal"),
        hook.as_ref(),
    )
    .map_err(js_error)?;
    CLOSE_HOOK.with(|slot| *slot.borrow_mut() = Some(hook));
    Ok(())
}

/// Nodes and listeners mounted for one modal.
pub struct DomMount {
    document: Document,
    overlay: Element,
    _on_click: Closure<dyn FnMut(web_sys::Event)>,
    on_key: Option<Closure<dyn FnMut(KeyboardEvent)>>,
}

/// Render surface backed by the page's `document`.
///
/// Clones share the last render failure, so the caller that opened a modal
/// can tell whether its nodes were actually mounted.
#[derive(Clone)]
pub struct DomSurface {
    document: Document,
    body: HtmlElement,
    failure: Rc<RefCell<Option<HostError>>>,
}

impl DomSurface {
    /// Bind to the page's `document`. Fails when there is no `body` yet.
    pub fn from_window() -> Result<Self, HostError> {
        let document = document()?;
        let body = document.body().ok_or(HostError::Unavailable("body"))?;
        Ok(Self {
            document,
            body,
            failure: Rc::new(RefCell::new(None)),
        })
    }

    /// Take the error of the last failed render, if any.
    pub fn take_failure(&self) -> Option<HostError> {
        self.failure.borrow_mut().take()
    }

    fn build(&self, view: &ModalView<'_>, trigger: CloseTrigger) -> Result<DomMount, HostError> {
        let doc = &self.document;
        let body = &self.body;
        let heading_id = format!("modal-title-{}", view.id.id());

        let overlay = doc.create_element("div").map_err(js_error)?;
        overlay.set_class_name(OVERLAY_CLASS);
        overlay
            .set_attribute("data-modal-id", &view.id.id().to_string())
            .map_err(js_error)?;

        let panel = doc.create_element("div").map_err(js_error)?;
        panel.set_class_name(PANEL_CLASS);
        panel.set_attribute("role", "dialog").map_err(js_error)?;
        panel.set_attribute("aria-modal", "true").map_err(js_error)?;
        panel
            .set_attribute("aria-labelledby", &heading_id)
            .map_err(js_error)?;

        let heading = doc.create_element("h3").map_err(js_error)?;
        heading.set_class_name(TITLE_CLASS);
        heading.set_id(&heading_id);
        heading.set_text_content(Some(view.title));

        let button = doc.create_element("button").map_err(js_error)?;
        button.set_class_name(CLOSE_CLASS);
        button.set_attribute("type", "button").map_err(js_error)?;
        button.set_text_content(Some(view.close_text));

        panel.append_child(&heading).map_err(js_error)?;
        panel.append_child(&button).map_err(js_error)?;
        overlay.append_child(&panel).map_err(js_error)?;

        let on_click = {
            let trigger = trigger.clone();
            Closure::wrap(Box::new(move |_event: web_sys::Event| trigger.fire())
                as Box<dyn FnMut(web_sys::Event)>)
        };
        button
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
            .map_err(js_error)?;

        body.append_child(&overlay).map_err(js_error)?;

        // Every escapable modal listens on `document`; only the one whose
        // overlay is the last element of `body` reacts.
        let on_key = if view.close_on_escape {
            let top_body = body.clone();
            let own_overlay = overlay.clone();
            let handler = Closure::wrap(Box::new(move |event: KeyboardEvent| {
                let on_top = top_body
                    .last_element_child()
                    .is_some_and(|top| top == own_overlay);
                if on_top && key_event(&event).is_some_and(|key| key.is_escape_press()) {
                    event.prevent_default();
                    trigger.fire_as(DismissTrigger::Escape);
                }
            }) as Box<dyn FnMut(KeyboardEvent)>);
            if let Err(err) =
                doc.add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
            {
                overlay.remove();
                return Err(js_error(err));
            }
            Some(handler)
        } else {
            None
        };

        Ok(DomMount {
            document: doc.clone(),
            overlay,
            _on_click: on_click,
            on_key,
        })
    }
}

impl ModalSurface for DomSurface {
    type Handle = Option<DomMount>;

    fn render(&mut self, view: &ModalView<'_>, trigger: CloseTrigger) -> Option<DomMount> {
        match self.build(view, trigger) {
            Ok(mount) => Some(mount),
            Err(err) => {
                tracing::warn!(target: "modalkit::web", id = view.id.id(), %err, "modal render failed");
                *self.failure.borrow_mut() = Some(err);
                None
            }
        }
    }

    fn unmount(&mut self, handle: Option<DomMount>) {
        let Some(mount) = handle else {
            return;
        };
        if let Some(on_key) = &mount.on_key {
            let _ = mount
                .document
                .remove_event_listener_with_callback("keydown", on_key.as_ref().unchecked_ref());
        }
        // `remove` on a detached element is a no-op.
        mount.overlay.remove();
    }
}

/// A modal dialog opened from JS: `new Modal({ title, closeText })`.
#[wasm_bindgen]
pub struct Modal {
    inner: ModalWidget<DomSurface>,
}

#[wasm_bindgen]
impl Modal {
    /// Open a modal from a props object.
    #[wasm_bindgen(constructor)]
    pub fn new(props: JsValue) -> Result<Modal, JsValue> {
        if props.is_undefined() {
            return Err(HostError::InvalidProps("props are required".to_owned()).into());
        }
        let json = js_sys::JSON::stringify(&props)
            .map_err(|_| HostError::InvalidProps("props are not serializable".to_owned()))?;
        let props = ModalProps::from_json(&String::from(json))?;
        let surface = DomSurface::from_window()?;
        let status = surface.clone();
        install_close_hook()?;
        let inner = HOST.with(|host| host.borrow_mut().open(props, surface));
        if let Some(err) = status.take_failure() {
            inner.close();
            return Err(err.into());
        }
        Ok(Modal { inner })
    }

    /// Close this modal. Idempotent.
    pub fn close(&self) {
        self.inner.close();
    }

    #[wasm_bindgen(getter, js_name = isOpen)]
    pub fn is_open(&self) -> bool {
        self.inner.is_open()
    }

    #[wasm_bindgen(getter)]
    pub fn title(&self) -> String {
        self.inner.title().to_owned()
    }

    #[wasm_bindgen(getter, js_name = closeText)]
    pub fn close_text(&self) -> String {
        self.inner.close_text().to_owned()
    }

    #[wasm_bindgen(getter)]
    pub fn id(&self) -> f64 {
        self.inner.id().id() as f64
    }
}

/// Close the active modal. Same as `window.closeModal()`.
#[wasm_bindgen(js_name = closeModal)]
pub fn close_active_modal() {
    close_modal();
}

/// Number of modals opened through `Modal` that are still open.
#[wasm_bindgen(js_name = openModalCount)]
pub fn open_modal_count() -> u32 {
    HOST.with(|host| u32::try_from(host.borrow().open_count()).unwrap_or(u32::MAX))
}
