/// Tokenizer module for converting text to token IDs and vice versa
///
/// `BpeTokenizer` is the loaded/unloaded front end the inference pipeline
/// talks to; `BpeEngine` holds the merge algorithm over a loaded vocabulary.
pub mod base;
pub mod bpe;
pub mod bpe_tokenizer;
pub mod config;
pub mod error;

pub use base::Tokenizer;
pub use bpe::BpeEngine;
pub use bpe_tokenizer::BpeTokenizer;
pub use config::{ConfigError, TokenizerConfig};
pub use error::{ErrorKind, TokenizerError};
