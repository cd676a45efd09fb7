#![forbid(unsafe_code)]

//! Single-slot dismissal registry behind the global `close_modal` hook.
//!
//! The registry holds at most one *active* dismissable target. Registering a
//! new target replaces the old one (last writer wins) and reports which id
//! was displaced; it is not a stack, so closing the newer target does not
//! restore the older one.
//!
//! # Invariants
//!
//! - At most one target is active.
//! - `unregister_if_current(id)` only clears the slot when `id` owns it.
//! - The slot borrow is released before a target's close routine runs, so
//!   the routine may call back into the registry.
//! - The slot holds a weak reference; the registry never keeps a modal alive.
//!
//! # Failure Modes
//!
//! - `close_active()` with an empty slot returns `false` (no-op).
//! - `close_active()` whose target was dropped clears the stale slot and
//!   returns `false`.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

/// Global counter for unique modal IDs.
static MODAL_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

thread_local! {
    static GLOBAL_REGISTRY: DismissalRegistry = DismissalRegistry::new();
}

/// Unique identifier for a modal instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModalId(u64);

impl ModalId {
    /// Allocate a new unique modal ID.
    pub fn next() -> Self {
        Self(MODAL_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ModalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "modal#{}", self.0)
    }
}

/// What initiated a close.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DismissTrigger {
    /// The rendered close control was activated.
    CloseControl,
    /// Escape was pressed while the modal was on top.
    Escape,
    /// The global `close_modal` hook was invoked.
    GlobalHook,
    /// The owner called `ModalWidget::close`.
    Programmatic,
    /// A newer modal opened with `DisplacePolicy::Close`.
    Displaced,
}

impl DismissTrigger {
    /// Stable name used in log fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CloseControl => "close_control",
            Self::Escape => "escape",
            Self::GlobalHook => "global_hook",
            Self::Programmatic => "programmatic",
            Self::Displaced => "displaced",
        }
    }
}

/// Something the registry can close.
///
/// `dismiss` must be idempotent and must not fail.
pub trait Dismiss {
    /// Identity used for slot ownership checks.
    fn modal_id(&self) -> ModalId;

    /// Run the close routine.
    fn dismiss(&self, trigger: DismissTrigger);
}

struct ActiveEntry {
    id: ModalId,
    target: Weak<dyn Dismiss>,
}

/// Single-slot registry of the active dismissable modal.
///
/// Cloning yields another handle to the same slot.
#[derive(Clone, Default)]
pub struct DismissalRegistry {
    slot: Rc<RefCell<Option<ActiveEntry>>>,
}

impl fmt::Debug for DismissalRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DismissalRegistry")
            .field("active", &self.active())
            .finish()
    }
}

impl DismissalRegistry {
    /// Create an independent, empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The registry of the current UI thread, used by [`close_modal`].
    #[must_use]
    pub fn global() -> Self {
        GLOBAL_REGISTRY.with(Clone::clone)
    }

    /// Make `target` the active modal, returning the id it displaced.
    pub fn register(&self, target: &Rc<dyn Dismiss>) -> Option<ModalId> {
        let id = target.modal_id();
        let previous = self.slot.borrow_mut().replace(ActiveEntry {
            id,
            target: Rc::downgrade(target),
        });
        let displaced = previous.map(|entry| entry.id).filter(|&prev| prev != id);
        if let Some(prev) = displaced {
            tracing::debug!(
                target: "modalkit::registry",
                active = id.id(),
                displaced = prev.id(),
                "dismissal hook reassigned"
            );
        }
        displaced
    }

    /// Clear the slot if `id` currently owns it. Returns whether it did.
    pub fn unregister_if_current(&self, id: ModalId) -> bool {
        let mut slot = self.slot.borrow_mut();
        if slot.as_ref().is_some_and(|entry| entry.id == id) {
            *slot = None;
            true
        } else {
            false
        }
    }

    /// The id of the active modal, if any.
    #[must_use]
    pub fn active(&self) -> Option<ModalId> {
        self.slot.borrow().as_ref().map(|entry| entry.id)
    }

    /// Whether `id` is the active modal.
    #[must_use]
    pub fn is_active(&self, id: ModalId) -> bool {
        self.active() == Some(id)
    }

    /// Close the active modal through its own close routine.
    ///
    /// Returns `false` (doing nothing) when no modal is active.
    pub fn close_active(&self) -> bool {
        self.dismiss_active(DismissTrigger::GlobalHook)
    }

    pub(crate) fn dismiss_active(&self, trigger: DismissTrigger) -> bool {
        let target = {
            let slot = self.slot.borrow();
            slot.as_ref().map(|entry| (entry.id, entry.target.upgrade()))
        };
        match target {
            Some((_, Some(target))) => {
                target.dismiss(trigger);
                true
            }
            Some((id, None)) => {
                self.unregister_if_current(id);
                tracing::trace!(target: "modalkit::registry", id = id.id(), "stale slot cleared");
                false
            }
            None => {
                tracing::trace!(target: "modalkit::registry", "no active modal");
                false
            }
        }
    }
}

/// Close whichever modal is active on this thread's global registry.
///
/// Does nothing when no modal is active.
pub fn close_modal() {
    DismissalRegistry::global().close_active();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct Spy {
        id: ModalId,
        registry: DismissalRegistry,
        closes: Cell<u32>,
        last: Cell<Option<DismissTrigger>>,
    }

    impl Spy {
        fn new(registry: &DismissalRegistry) -> Rc<Self> {
            Rc::new(Self {
                id: ModalId::next(),
                registry: registry.clone(),
                closes: Cell::new(0),
                last: Cell::new(None),
            })
        }
    }

    impl Dismiss for Spy {
        fn modal_id(&self) -> ModalId {
            self.id
        }

        fn dismiss(&self, trigger: DismissTrigger) {
            self.closes.set(self.closes.get() + 1);
            self.last.set(Some(trigger));
            self.registry.unregister_if_current(self.id);
        }
    }

    fn as_target(spy: &Rc<Spy>) -> Rc<dyn Dismiss> {
        Rc::clone(spy) as Rc<dyn Dismiss>
    }

    #[test]
    fn unique_ids() {
        let a = ModalId::next();
        let b = ModalId::next();
        assert_ne!(a, b);
        assert!(b > a);
        assert_eq!(format!("{a}"), format!("modal#{}", a.id()));
    }

    #[test]
    fn empty_registry_close_is_noop() {
        let registry = DismissalRegistry::new();
        assert_eq!(registry.active(), None);
        assert!(!registry.close_active());
        assert!(!registry.unregister_if_current(ModalId::next()));
    }

    #[test]
    fn register_then_close_active() {
        let registry = DismissalRegistry::new();
        let spy = Spy::new(&registry);
        assert_eq!(registry.register(&as_target(&spy)), None);
        assert!(registry.is_active(spy.id));

        assert!(registry.close_active());
        assert_eq!(spy.closes.get(), 1);
        assert_eq!(spy.last.get(), Some(DismissTrigger::GlobalHook));
        assert_eq!(registry.active(), None);

        assert!(!registry.close_active());
        assert_eq!(spy.closes.get(), 1);
    }

    #[test]
    fn last_writer_wins() {
        let registry = DismissalRegistry::new();
        let a = Spy::new(&registry);
        let b = Spy::new(&registry);
        registry.register(&as_target(&a));
        assert_eq!(registry.register(&as_target(&b)), Some(a.id));
        assert!(registry.is_active(b.id));

        registry.close_active();
        assert_eq!(a.closes.get(), 0);
        assert_eq!(b.closes.get(), 1);
        // Not a stack: A does not get the slot back.
        assert_eq!(registry.active(), None);
    }

    #[test]
    fn reregistering_same_target_reports_no_displacement() {
        let registry = DismissalRegistry::new();
        let a = Spy::new(&registry);
        registry.register(&as_target(&a));
        assert_eq!(registry.register(&as_target(&a)), None);
    }

    #[test]
    fn unregister_with_stale_id_keeps_slot() {
        let registry = DismissalRegistry::new();
        let a = Spy::new(&registry);
        let b = Spy::new(&registry);
        registry.register(&as_target(&a));
        registry.register(&as_target(&b));
        assert!(!registry.unregister_if_current(a.id));
        assert!(registry.is_active(b.id));
        assert!(registry.unregister_if_current(b.id));
        assert_eq!(registry.active(), None);
    }

    #[test]
    fn dropped_target_is_cleared_without_closing() {
        let registry = DismissalRegistry::new();
        let spy = Spy::new(&registry);
        let id = spy.id;
        registry.register(&as_target(&spy));
        drop(spy);
        assert!(registry.is_active(id));
        assert!(!registry.close_active());
        assert_eq!(registry.active(), None);
    }

    #[test]
    fn clones_share_the_slot() {
        let registry = DismissalRegistry::new();
        let other = registry.clone();
        let spy = Spy::new(&registry);
        other.register(&as_target(&spy));
        assert!(registry.is_active(spy.id));
    }

    #[test]
    fn global_registry_is_shared_per_thread() {
        let spy = Spy::new(&DismissalRegistry::global());
        DismissalRegistry::global().register(&as_target(&spy));
        close_modal();
        assert_eq!(spy.closes.get(), 1);
        close_modal();
        assert_eq!(spy.closes.get(), 1);
    }

    #[test]
    fn trigger_names() {
        assert_eq!(DismissTrigger::CloseControl.as_str(), "close_control");
        assert_eq!(DismissTrigger::GlobalHook.as_str(), "global_hook");
    }
}
