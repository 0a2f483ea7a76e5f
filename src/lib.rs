//! llama2-style byte-pair-encoding tokenizer.
//!
//! Loads a binary vocabulary (pieces plus merge scores), encodes text into
//! token ids and decodes ids back into piece bytes.

pub mod common;
pub mod model_loader;
pub mod tokenizer;

pub use common::{SpecialTokenIds, TokenId, TokenizerMetadata};
pub use model_loader::{ParseError, VocabularyTable};
pub use tokenizer::{BpeTokenizer, ErrorKind, Tokenizer, TokenizerConfig, TokenizerError};
