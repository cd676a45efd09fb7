#![forbid(unsafe_code)]

//! Browser host for modalkit.
//!
//! On `wasm32` this crate exports a `Modal` class (`new Modal({ title,
//! closeText })`) that renders into the page's DOM, and binds
//! `window.closeModal()` to the dismissal registry the first time a modal
//! is opened.
//!
//! [`HostCore`] carries the platform-independent part and is what native
//! tests drive, using [`modalkit_core::Document`] as the surface.

mod host;
mod props;

#[cfg(target_arch = "wasm32")]
mod wasm;

pub use host::HostCore;
pub use props::{HostError, ModalProps};

#[cfg(target_arch = "wasm32")]
pub use wasm::{DomMount, DomSurface, Modal};
