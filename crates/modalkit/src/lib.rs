#![forbid(unsafe_code)]

//! modalkit public facade crate.
//!
//! Re-exports the modal widget, its surfaces, and the dismissal hook from
//! the internal crates, and offers a prelude for day-to-day usage.

use std::fmt;

// --- Core re-exports -------------------------------------------------------

pub use modalkit_core::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, Modifiers, MouseButton, MouseEvent, MouseEventKind,
};
pub use modalkit_core::geometry::{Rect, Size};
pub use modalkit_core::logging::{LogConfig, LogFormat, LoggingError};
pub use modalkit_core::{Document, NodeId};

// --- Widget re-exports -----------------------------------------------------

pub use modalkit_widgets::modal::{
    CloseTrigger, ConfigError, DEFAULT_CLOSE_TEXT, Dismiss, DismissTrigger, DismissalRegistry,
    DisplacePolicy, ModalConfig, ModalId, ModalState, ModalSurface, ModalView, ModalWidget,
    Screen, close_modal,
};

// --- Web re-exports --------------------------------------------------------

#[cfg(feature = "web")]
pub use modalkit_web::{HostCore, HostError, ModalProps};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for modalkit hosts.
#[derive(Debug)]
pub enum Error {
    /// Modal configuration could not be parsed.
    Config(ConfigError),
    /// Log subscriber setup failed.
    Logging(LoggingError),
    /// Browser host failure.
    #[cfg(feature = "web")]
    Host(HostError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            #[cfg(feature = "web")]
            Self::Host(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            #[cfg(feature = "web")]
            Self::Host(err) => Some(err),
        }
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<LoggingError> for Error {
    fn from(err: LoggingError) -> Self {
        Self::Logging(err)
    }
}

#[cfg(feature = "web")]
impl From<HostError> for Error {
    fn from(err: HostError) -> Self {
        Self::Host(err)
    }
}

/// Standard result type for modalkit APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Install the default log subscriber (`MODALKIT_LOG`, compact output).
pub fn init_logging() -> Result<()> {
    modalkit_core::logging::init(&LogConfig::default())?;
    Ok(())
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        DismissalRegistry, DisplacePolicy, Document, Error, Event, ModalConfig, ModalState,
        ModalWidget, Result, Screen, close_modal,
    };

    pub use crate::{core, widgets};
}

pub use modalkit_core as core;
pub use modalkit_widgets as widgets;
