#![no_main]

use libfuzzer_sys::fuzz_target;
use modalkit_widgets::modal::{ConfigError, DEFAULT_CLOSE_TEXT, ModalConfig};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 4096 {
        return;
    }

    // Parsing must never panic.
    let parsed = ModalConfig::from_json_str(text);

    match parsed {
        Ok(config) => {
            let value: serde_json::Value =
                serde_json::from_str(text).expect("accepted props must be valid JSON");
            assert!(value.is_object(), "only objects are accepted as props");
            // Absent or null closeText falls back to the default label.
            match value.get("closeText") {
                None | Some(serde_json::Value::Null) => {
                    assert_eq!(config.close_text, DEFAULT_CLOSE_TEXT);
                }
                Some(serde_json::Value::String(text)) => assert_eq!(&config.close_text, text),
                Some(_) => {}
            }
        }
        Err(ConfigError::Parse(_)) => {
            assert!(serde_json::from_str::<serde_json::Value>(text).is_err());
        }
        Err(ConfigError::InvalidField { .. }) => {}
    }
});
