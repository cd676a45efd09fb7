#![forbid(unsafe_code)]

//! JS-facing props and host errors.
//!
//! Props go through [`ModalConfig::from_props`], so a page and a native
//! caller accept exactly the same keys: `title`, `closeText`,
//! `closeOnEscape` and `displace`.

use std::fmt;

use modalkit_widgets::modal::{ConfigError, ModalConfig};
use serde_json::Value;

/// Props object accepted by the JS `Modal` constructor.
///
/// Mirrors `{ title: string, closeText?: string, closeOnEscape?: boolean,
/// displace?: "orphan" | "close" }`. `null` is accepted wherever a key may
/// be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalProps {
    config: ModalConfig,
}

impl ModalProps {
    /// Parse props from a JSON document.
    pub fn from_json(json: &str) -> Result<Self, HostError> {
        let value: Value =
            serde_json::from_str(json).map_err(|e| HostError::InvalidProps(e.to_string()))?;
        Self::from_value(&value)
    }

    /// Interpret an already-parsed props object.
    pub fn from_value(value: &Value) -> Result<Self, HostError> {
        let config = ModalConfig::from_props(value)?;
        Ok(Self { config })
    }

    /// Label the close control will show.
    #[must_use]
    pub fn effective_close_text(&self) -> &str {
        &self.config.close_text
    }

    #[must_use]
    pub fn config(&self) -> &ModalConfig {
        &self.config
    }
}

impl From<ModalConfig> for ModalProps {
    fn from(config: ModalConfig) -> Self {
        Self { config }
    }
}

impl From<ModalProps> for ModalConfig {
    fn from(props: ModalProps) -> Self {
        props.config
    }
}

/// Errors surfaced to the embedding page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Props were not an object or had wrongly typed values.
    InvalidProps(String),
    /// A browser global (`window`, `document`, `body`) is missing.
    Unavailable(&'static str),
    /// A DOM call threw.
    Dom(String),
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidProps(msg) => write!(f, "invalid modal props: {msg}"),
            Self::Unavailable(what) => write!(f, "{what} is not available"),
            Self::Dom(msg) => write!(f, "DOM error: {msg}"),
        }
    }
}

impl std::error::Error for HostError {}

impl From<ConfigError> for HostError {
    fn from(err: ConfigError) -> Self {
        Self::InvalidProps(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modalkit_widgets::modal::DisplacePolicy;

    #[test]
    fn title_only() {
        let props = ModalProps::from_json(r#"{"title":"Delete item?"}"#).unwrap();
        assert_eq!(props.effective_close_text(), "Close");
        let config = ModalConfig::from(props);
        assert_eq!(config, ModalConfig::new("Delete item?"));
    }

    #[test]
    fn explicit_close_text() {
        let props = ModalProps::from_json(r#"{"title":"Confirm","closeText":"Dismiss"}"#).unwrap();
        assert_eq!(props.effective_close_text(), "Dismiss");
        assert_eq!(ModalConfig::from(props).close_text, "Dismiss");
    }

    #[test]
    fn nulls_and_missing_keys() {
        let props = ModalProps::from_json(r#"{"title":null,"closeText":null}"#).unwrap();
        assert_eq!(props, ModalProps::default());
        let config = ModalConfig::from(ModalProps::from_json("{}").unwrap());
        assert_eq!(config.title, "");
        assert_eq!(config.close_text, "Close");
    }

    #[test]
    fn escape_and_displace_flags() {
        let props =
            ModalProps::from_json(r#"{"title":"t","closeOnEscape":true,"displace":"close"}"#)
                .unwrap();
        assert!(props.config().close_on_escape);
        assert_eq!(props.config().displace, DisplacePolicy::Close);
    }

    #[test]
    fn non_string_labels_are_shown_as_text() {
        let props = ModalProps::from_json(r#"{"title":3,"closeText":false}"#).unwrap();
        assert_eq!(props.config().title, "3");
        assert_eq!(props.effective_close_text(), "false");
    }

    #[test]
    fn malformed_props_are_rejected() {
        for json in [
            r#"{"closeOnEscape":"yes"}"#,
            r#"{"displace":"stack"}"#,
            "null",
            "\"t\"",
            "{",
        ] {
            let err = ModalProps::from_json(json).unwrap_err();
            assert!(matches!(err, HostError::InvalidProps(_)), "{json}");
        }
    }

    #[test]
    fn unknown_keys_ignored() {
        let props = ModalProps::from_json(r#"{"title":"t","onClose":"fn"}"#).unwrap();
        assert_eq!(props.config().title, "t");
    }

    #[test]
    fn error_display() {
        assert_eq!(
            HostError::Unavailable("window").to_string(),
            "window is not available"
        );
        let err = HostError::from(ConfigError::Parse("eof".to_owned()));
        assert_eq!(err.to_string(), "invalid modal props: parse error: eof");
    }
}
