use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::TokenId;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encoding behaviour that the vocabulary file itself does not record
///
/// Every field is optional in JSON; missing fields take the defaults below.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    /// Emit the `" "` piece before non-empty text, when the vocabulary has one
    pub add_dummy_prefix: bool,
    /// Encode unknown code points as `<0xHH>` byte pieces
    pub byte_fallback: bool,
    /// Id emitted for input nothing else can cover; `None` means use the
    /// `<unk>` piece if present, otherwise drop the input
    pub unk_id: Option<TokenId>,
    /// Reported in metadata only; the tokenizer never emits it
    pub pad_id: Option<TokenId>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            add_dummy_prefix: true,
            byte_fallback: true,
            unk_id: None,
            pad_id: None,
        }
    }
}

impl TokenizerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let config = TokenizerConfig::from_json_str(r#"{ "unk_id": 0 }"#).unwrap();
        assert_eq!(
            config,
            TokenizerConfig {
                unk_id: Some(0),
                ..TokenizerConfig::default()
            }
        );
    }

    #[test]
    fn test_empty_object_is_default() {
        let config = TokenizerConfig::from_json_str("{}").unwrap();
        assert_eq!(config, TokenizerConfig::default());
        assert!(config.add_dummy_prefix);
        assert!(config.byte_fallback);
    }

    #[test]
    fn test_rejects_wrong_types() {
        let result = TokenizerConfig::from_json_str(r#"{ "byte_fallback": "yes" }"#);
        assert!(matches!(result, Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokenizer.json");
        fs::write(&path, r#"{ "add_dummy_prefix": false, "pad_id": 3 }"#).unwrap();

        let config = TokenizerConfig::from_json_file(&path).unwrap();
        assert!(!config.add_dummy_prefix);
        assert_eq!(config.pad_id, Some(3));
        assert!(matches!(
            TokenizerConfig::from_json_file(dir.path().join("missing.json")),
            Err(ConfigError::Io(_))
        ));
    }
}
