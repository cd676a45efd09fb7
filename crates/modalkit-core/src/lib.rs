#![forbid(unsafe_code)]

//! Core primitives for modalkit: input events, geometry, the in-memory
//! document model, and logging setup.

pub mod document;
pub mod event;
pub mod geometry;
pub mod logging;

pub use document::{Document, DocumentEvent, EventKind, Listener, NodeId};
pub use event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};
pub use geometry::{Rect, Size};
