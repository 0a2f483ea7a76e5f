use std::path::Path;

use crate::common::TokenId;

use super::error::TokenizerError;

/// The calls an inference pipeline makes into a tokenizer
pub trait Tokenizer {
    /// Replace the current vocabulary with the one at `path`
    fn load(&mut self, path: &Path) -> Result<(), TokenizerError>;

    /// Encode `text`, wrapped in `bos` leading BOS ids and `eos` trailing EOS ids
    fn encode(&self, text: &str, bos: usize, eos: usize) -> Result<Vec<TokenId>, TokenizerError>;

    /// Bytes of a single token; `prev_token` is accepted for interface compatibility
    fn decode(&self, prev_token: TokenId, token: TokenId) -> Result<Vec<u8>, TokenizerError>;

    fn vocab_size(&self) -> u64;

    fn bos_tok(&self) -> u64;

    fn eos_tok(&self) -> u64;
}
