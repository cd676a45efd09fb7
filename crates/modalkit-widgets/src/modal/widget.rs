#![forbid(unsafe_code)]

//! The modal widget and its single close routine.
//!
//! A [`ModalWidget`] is a cheap handle over a shared instance. The instance
//! is also referenced by the [`CloseTrigger`] its surface holds and, weakly,
//! by the [`DismissalRegistry`]. Whichever of those asks first, the close
//! runs once.
//!
//! # Invariants
//!
//! - State only moves `Open -> Closed`.
//! - While `Open` the instance owns exactly one mounted handle; while
//!   `Closed` it owns none.
//! - The state flips before unmounting, so a trigger fired while unmounting
//!   is a no-op.

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::rc::Rc;

use web_time::Instant;

use super::config::{DisplacePolicy, ModalConfig};
use super::registry::{Dismiss, DismissTrigger, DismissalRegistry, ModalId};
use super::surface::{CloseTrigger, ModalSurface, ModalView};

/// Lifecycle state of a modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModalState {
    /// Rendered and reachable through its triggers.
    Open,
    /// Torn down. Terminal.
    Closed,
}

struct ModalInstance<S: ModalSurface> {
    id: ModalId,
    config: ModalConfig,
    state: Cell<ModalState>,
    closed_by: Cell<Option<DismissTrigger>>,
    surface: RefCell<S>,
    mount: RefCell<Option<S::Handle>>,
    registry: DismissalRegistry,
    opened_at: Instant,
}

impl<S: ModalSurface> Dismiss for ModalInstance<S> {
    fn modal_id(&self) -> ModalId {
        self.id
    }

    fn dismiss(&self, trigger: DismissTrigger) {
        if self.state.get() == ModalState::Closed {
            tracing::trace!(
                target: "modalkit::modal",
                id = self.id.id(),
                trigger = trigger.as_str(),
                "close ignored: already closed"
            );
            return;
        }
        self.state.set(ModalState::Closed);
        self.closed_by.set(Some(trigger));

        let handle = self.mount.borrow_mut().take();
        if let Some(handle) = handle {
            self.surface.borrow_mut().unmount(handle);
        }
        let released = self.registry.unregister_if_current(self.id);

        tracing::debug!(
            target: "modalkit::modal",
            id = self.id.id(),
            title = %self.config.title,
            trigger = trigger.as_str(),
            released,
            open_ms = self.opened_at.elapsed().as_millis() as u64,
            "modal.close"
        );
    }
}

impl<S: ModalSurface> Drop for ModalInstance<S> {
    fn drop(&mut self) {
        if self.state.get() != ModalState::Open {
            return;
        }
        // Only reachable when the surface let go of its trigger while mounted.
        self.state.set(ModalState::Closed);
        if let Some(handle) = self.mount.get_mut().take() {
            self.surface.get_mut().unmount(handle);
        }
        self.registry.unregister_if_current(self.id);
    }
}

/// A titled dialog panel with a close control.
///
/// Opening renders the panel into a [`ModalSurface`] and makes the modal the
/// active target of the dismissal registry. Clones share the same instance.
///
/// # Example
///
/// ```
/// use modalkit_core::Document;
/// use modalkit_widgets::modal::{DismissalRegistry, ModalConfig, ModalState, ModalWidget};
///
/// let registry = DismissalRegistry::new();
/// let doc = Document::new();
/// let modal = ModalWidget::open_in(
///     ModalConfig::new("Confirm").close_text("Dismiss"),
///     doc.clone(),
///     &registry,
/// );
/// assert_eq!(modal.close_text(), "Dismiss");
///
/// modal.close();
/// modal.close();
/// assert_eq!(modal.state(), ModalState::Closed);
/// assert_eq!(registry.active(), None);
/// ```
pub struct ModalWidget<S: ModalSurface + 'static> {
    inner: Rc<ModalInstance<S>>,
}

impl<S: ModalSurface + 'static> Clone for ModalWidget<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: ModalSurface + 'static> fmt::Debug for ModalWidget<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModalWidget")
            .field("id", &self.inner.id)
            .field("title", &self.inner.config.title)
            .field("state", &self.inner.state.get())
            .finish()
    }
}

impl<S: ModalSurface + 'static> ModalWidget<S> {
    /// Open a modal on this thread's global registry.
    pub fn open(config: ModalConfig, surface: S) -> Self {
        Self::open_in(config, surface, &DismissalRegistry::global())
    }

    /// Open a modal on an explicit registry.
    ///
    /// Under [`DisplacePolicy::Close`] the currently active modal is closed
    /// first. The new modal is rendered, then registered.
    pub fn open_in(config: ModalConfig, surface: S, registry: &DismissalRegistry) -> Self {
        if config.displace == DisplacePolicy::Close {
            registry.dismiss_active(DismissTrigger::Displaced);
        }

        let inner = Rc::new(ModalInstance {
            id: ModalId::next(),
            config,
            state: Cell::new(ModalState::Open),
            closed_by: Cell::new(None),
            surface: RefCell::new(surface),
            mount: RefCell::new(None),
            registry: registry.clone(),
            opened_at: Instant::now(),
        });
        let target: Rc<dyn Dismiss> = inner.clone();

        let handle = {
            let config = &inner.config;
            let view = ModalView {
                id: inner.id,
                title: &config.title,
                close_text: &config.close_text,
                close_on_escape: config.close_on_escape,
            };
            inner
                .surface
                .borrow_mut()
                .render(&view, CloseTrigger::new(Rc::clone(&target)))
        };
        *inner.mount.borrow_mut() = Some(handle);

        let displaced = registry.register(&target);
        tracing::debug!(
            target: "modalkit::modal",
            id = inner.id.id(),
            title = %inner.config.title,
            displaced = displaced.map(ModalId::id),
            "modal.open"
        );

        Self { inner }
    }

    /// Close the modal. Idempotent; never fails.
    pub fn close(&self) {
        self.inner.dismiss(DismissTrigger::Programmatic);
    }

    /// Unique id of this instance.
    #[inline]
    #[must_use]
    pub fn id(&self) -> ModalId {
        self.inner.id
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ModalState {
        self.inner.state.get()
    }

    /// Whether the modal is still open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state() == ModalState::Open
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.inner.config.title
    }

    #[must_use]
    pub fn close_text(&self) -> &str {
        &self.inner.config.close_text
    }

    /// The configuration this modal was opened with.
    #[must_use]
    pub fn config(&self) -> &ModalConfig {
        &self.inner.config
    }

    /// What closed the modal, if it is closed.
    #[must_use]
    pub fn closed_by(&self) -> Option<DismissTrigger> {
        self.inner.closed_by.get()
    }

    /// Whether this modal currently owns the dismissal hook.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.registry.is_active(self.inner.id)
    }

    /// A trigger that closes this modal, for wiring extra controls.
    #[must_use]
    pub fn close_trigger(&self) -> CloseTrigger {
        CloseTrigger::new(self.inner.clone())
    }

    /// Borrow the surface the modal rendered into.
    ///
    /// # Panics
    ///
    /// Panics if called from inside the surface's own `render`/`unmount`.
    #[must_use]
    pub fn surface(&self) -> Ref<'_, S> {
        self.inner.surface.borrow()
    }
}
