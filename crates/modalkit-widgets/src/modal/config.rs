#![forbid(unsafe_code)]

//! Modal configuration and props parsing.
//!
//! A [`ModalConfig`] is fixed for the lifetime of the widget it opens. It
//! can be built in code, parsed from a JS-style props object
//! (`{ "title": ..., "closeText": ... }`), or loaded from TOML with the
//! `toml-config` feature.
//!
//! # Failure Modes
//!
//! | Input | Behavior |
//! |-------|----------|
//! | Missing or `null` `title` | Empty heading, not an error |
//! | Missing or `null` `closeText` | Falls back to [`DEFAULT_CLOSE_TEXT`] |
//! | Non-string `title` / `closeText` | Rendered as its text form (`3`, `true`, `a,b`) |
//! | Non-boolean `closeOnEscape`, unknown `displace` | [`ConfigError::InvalidField`] |
//! | Props not an object | [`ConfigError::InvalidField`] for `props` |
//! | Malformed JSON / TOML | [`ConfigError::Parse`] |
//! | Unknown keys | Ignored |

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Label of the close control when none is configured.
pub const DEFAULT_CLOSE_TEXT: &str = "Close";

/// What opening a modal does to the modal that is currently active.
///
/// The dismissal hook is a single slot, so a newly opened modal always
/// takes it over. This policy decides the fate of the previous holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplacePolicy {
    /// The previous modal stays rendered but is no longer reachable through
    /// the hook; it can still be closed through its own close control.
    #[default]
    Orphan,
    /// The previous modal is closed before the new one registers.
    Close,
}

/// Errors from configuration parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The document could not be parsed at all.
    Parse(String),
    /// A recognized field had the wrong type.
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::InvalidField { field, expected } => {
                write!(f, "invalid field '{field}': expected {expected}")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Modal configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ModalConfig {
    /// Heading text. Not validated; empty renders an empty heading.
    pub title: String,
    /// Close control label.
    pub close_text: String,
    /// Whether a plain Escape press closes the modal.
    pub close_on_escape: bool,
    /// Effect on the previously active modal.
    pub displace: DisplacePolicy,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            title: String::new(),
            close_text: DEFAULT_CLOSE_TEXT.to_owned(),
            close_on_escape: false,
            displace: DisplacePolicy::Orphan,
        }
    }
}

impl ModalConfig {
    /// Create a config with a title and defaults for everything else.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Set the close control label.
    pub fn close_text(mut self, text: impl Into<String>) -> Self {
        self.close_text = text.into();
        self
    }

    /// Set whether Escape closes the modal.
    pub fn close_on_escape(mut self, close: bool) -> Self {
        self.close_on_escape = close;
        self
    }

    /// Set the displacement policy.
    pub fn displace(mut self, policy: DisplacePolicy) -> Self {
        self.displace = policy;
        self
    }

    /// Build a config from a JS-style props object.
    ///
    /// Recognized keys: `title`, `closeText`, `closeOnEscape`, `displace`.
    /// `null` is treated like an absent key. Labels are presentational, so
    /// a non-string label is shown as its text form rather than rejected.
    pub fn from_props(props: &Value) -> Result<Self, ConfigError> {
        let Some(map) = props.as_object() else {
            return Err(ConfigError::InvalidField {
                field: "props",
                expected: "object",
            });
        };

        let mut config = Self::default();
        if let Some(title) = map.get("title").and_then(label_text) {
            config.title = title;
        }
        if let Some(text) = map.get("closeText").and_then(label_text) {
            config.close_text = text;
        }
        match map.get("closeOnEscape") {
            None | Some(Value::Null) => {}
            Some(Value::Bool(b)) => config.close_on_escape = *b,
            Some(_) => {
                return Err(ConfigError::InvalidField {
                    field: "closeOnEscape",
                    expected: "boolean",
                });
            }
        }
        match map.get("displace") {
            None | Some(Value::Null) => {}
            Some(value) => {
                config.displace = DisplacePolicy::deserialize(value).map_err(|_| {
                    ConfigError::InvalidField {
                        field: "displace",
                        expected: "\"orphan\" or \"close\"",
                    }
                })?;
            }
        }
        Ok(config)
    }

    /// Parse a JSON props object.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_props(&value)
    }

    /// Parse a TOML document using the same keys and rules as props.
    #[cfg(feature = "toml-config")]
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let value: Value = toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_props(&value)
    }
}

/// Text a label value renders as. `None` for `null`.
fn label_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .map(|item| label_text(item).unwrap_or_default())
                .collect::<Vec<_>>()
                .join(","),
        ),
        Value::Object(_) => Some("[object Object]".to_owned()),
    }
}
