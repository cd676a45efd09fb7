#![forbid(unsafe_code)]

//! Modal dialog widget, dismissal registry, and render surfaces.
//!
//! # Lifecycle
//!
//! A [`ModalWidget`] is opened by construction and closed exactly once:
//!
//! ```text
//! (pre) --open--> Open --close control | close_modal() | Escape--> Closed
//!                                           Closed --any trigger--> Closed (no-op)
//! ```
//!
//! Every trigger converges on a single close routine that flips the state,
//! unmounts the nodes the widget rendered, and releases the widget's claim
//! on the [`DismissalRegistry`] if it still holds it.
//!
//! # Dismissal registry
//!
//! The registry is a single slot: the most recently opened modal is the
//! active one, and [`close_modal`] closes it. Opening a second modal does not
//! close the first unless its config asks for [`DisplacePolicy::Close`].
//!
//! # Surfaces
//!
//! Rendering goes through the [`ModalSurface`] capability. Two surfaces ship
//! with the crate:
//!
//! - [`modalkit_core::Document`]: DOM-shaped nodes under `body`.
//! - [`Screen`]: a terminal cell grid with hit testing.
//!
//! # Example
//!
//! ```
//! use modalkit_core::Document;
//! use modalkit_widgets::modal::{ModalConfig, ModalWidget, close_modal};
//!
//! let doc = Document::new();
//! let modal = ModalWidget::open(ModalConfig::new("Delete item?"), doc.clone());
//! assert_eq!(doc.query_class("modal").len(), 1);
//!
//! close_modal();
//! assert!(!modal.is_open());
//! assert!(doc.query_class("modal").is_empty());
//! ```

mod config;
mod registry;
mod screen;
mod surface;
mod widget;

pub use config::{ConfigError, DEFAULT_CLOSE_TEXT, DisplacePolicy, ModalConfig};
pub use registry::{Dismiss, DismissTrigger, DismissalRegistry, ModalId, close_modal};
pub use screen::{Screen, ScreenLayer};
pub use surface::{
    CLOSE_CLASS, CloseTrigger, DocumentMount, ModalSurface, ModalView, OVERLAY_CLASS, PANEL_CLASS,
    TITLE_CLASS,
};
pub use widget::{ModalState, ModalWidget};
