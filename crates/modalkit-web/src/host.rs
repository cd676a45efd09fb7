#![forbid(unsafe_code)]

//! Platform-independent host core.
//!
//! Holds the logic shared between the `wasm-bindgen` exports and native
//! tests: opening modals from props, the page-wide dismissal hook, and the
//! one-time installation flag for `window.closeModal`. No JS types here.

use modalkit_widgets::modal::{DismissalRegistry, ModalId, ModalSurface, ModalWidget};

use crate::props::{HostError, ModalProps};

/// Host-side bookkeeping for modals opened by a page.
pub struct HostCore<S: ModalSurface + 'static> {
    registry: DismissalRegistry,
    modals: Vec<ModalWidget<S>>,
    hook_installed: bool,
}

impl<S: ModalSurface + 'static> Default for HostCore<S> {
    fn default() -> Self {
        Self::new(DismissalRegistry::global())
    }
}

impl<S: ModalSurface + 'static> HostCore<S> {
    /// Create a host bound to `registry`.
    #[must_use]
    pub fn new(registry: DismissalRegistry) -> Self {
        Self {
            registry,
            modals: Vec::new(),
            hook_installed: false,
        }
    }

    #[must_use]
    pub fn registry(&self) -> &DismissalRegistry {
        &self.registry
    }

    /// Open a modal from parsed props.
    pub fn open(&mut self, props: ModalProps, surface: S) -> ModalWidget<S> {
        self.modals.retain(ModalWidget::is_open);
        let modal = ModalWidget::open_in(props.into(), surface, &self.registry);
        self.modals.push(modal.clone());
        modal
    }

    /// Open a modal from a JSON props document.
    pub fn open_json(&mut self, json: &str, surface: S) -> Result<ModalWidget<S>, HostError> {
        let props = ModalProps::from_json(json)?;
        Ok(self.open(props, surface))
    }

    /// Page-wide `closeModal()`: close the active modal, if any.
    pub fn close_modal(&self) -> bool {
        self.registry.close_active()
    }

    /// Close a tracked modal by id. Returns `false` if it is unknown or
    /// already closed.
    pub fn close(&mut self, id: ModalId) -> bool {
        let Some(modal) = self.modals.iter().find(|m| m.id() == id) else {
            return false;
        };
        let was_open = modal.is_open();
        modal.close();
        self.modals.retain(ModalWidget::is_open);
        was_open
    }

    /// Close every modal this host opened.
    pub fn close_all(&mut self) {
        for modal in self.modals.drain(..) {
            modal.close();
        }
    }

    /// Number of modals opened here that are still open.
    #[must_use]
    pub fn open_count(&self) -> usize {
        self.modals.iter().filter(|m| m.is_open()).count()
    }

    /// Ids of open modals, oldest first.
    #[must_use]
    pub fn open_ids(&self) -> Vec<ModalId> {
        self.modals
            .iter()
            .filter(|m| m.is_open())
            .map(ModalWidget::id)
            .collect()
    }

    /// Mark the global hook as installed.
    ///
    /// Returns `true` only for the first call, which is the caller that must
    /// actually bind `window.closeModal`.
    pub fn claim_hook_install(&mut self) -> bool {
        if self.hook_installed {
            return false;
        }
        self.hook_installed = true;
        tracing::debug!(target: "modalkit::web", "closeModal hook installed");
        true
    }

    #[must_use]
    pub fn hook_installed(&self) -> bool {
        self.hook_installed
    }
}
