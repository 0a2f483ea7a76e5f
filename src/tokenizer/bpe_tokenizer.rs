use std::path::Path;

use log::{error, info};

use crate::common::{SpecialTokenIds, TokenId, TokenizerMetadata};
use crate::model_loader::{parse_vocabulary, VocabularyTable};

use super::base::Tokenizer;
use super::bpe::BpeEngine;
use super::config::TokenizerConfig;
use super::error::TokenizerError;

#[derive(Debug, Clone, Default)]
enum TokenizerState {
    #[default]
    Unloaded,
    Loaded(BpeEngine),
}

/// BPE tokenizer for the inference engine
///
/// Starts unloaded. Every `encode`/`decode` call fails with
/// `TokenizerError::NotSupported` until a vocabulary has been loaded, and
/// the metadata accessors report 0.
///
/// # Thread Safety
/// `load` takes `&mut self`; `encode` and `decode` only read. A loaded
/// tokenizer can be shared across threads behind an `Arc` with no locking.
/// There is no process-wide instance: callers own theirs and pass it along.
#[derive(Debug, Clone, Default)]
pub struct BpeTokenizer {
    config: TokenizerConfig,
    state: TokenizerState,
}

impl BpeTokenizer {
    /// Unloaded tokenizer with the default encoding settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Unloaded tokenizer with explicit encoding settings
    pub fn with_config(config: TokenizerConfig) -> Self {
        Self {
            config,
            state: TokenizerState::Unloaded,
        }
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self.state, TokenizerState::Loaded(_))
    }

    /// Load a vocabulary file, replacing any vocabulary already loaded
    ///
    /// # Arguments
    /// * `path` - Path to the binary vocabulary (see `parse_vocabulary` for the layout)
    ///
    /// # Errors
    /// * `TokenizerError::IoFailure` if the file cannot be opened or read
    /// * `TokenizerError::Corrupt` if the file is not a valid vocabulary
    ///
    /// On error the tokenizer keeps whatever state it had before the call.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> Result<(), TokenizerError> {
        let path = path.as_ref();
        let table = match parse_vocabulary(path) {
            Ok(table) => table,
            Err(err) => {
                error!("Failed to load vocabulary {}: {}", path.display(), err);
                return Err(err.into());
            }
        };
        info!(
            "Loaded vocabulary {}: vocab_size={}, bos={}, eos={}",
            path.display(),
            table.vocab_size(),
            table.bos_id(),
            table.eos_id()
        );
        self.install(table);
        Ok(())
    }

    /// Install an already-built vocabulary, replacing any vocabulary already loaded
    pub fn load_table(&mut self, table: VocabularyTable) {
        info!(
            "Installed vocabulary: vocab_size={}, bos={}, eos={}",
            table.vocab_size(),
            table.bos_id(),
            table.eos_id()
        );
        self.install(table);
    }

    fn install(&mut self, table: VocabularyTable) {
        self.state = TokenizerState::Loaded(BpeEngine::new(table, &self.config));
    }

    fn engine(&self) -> Result<&BpeEngine, TokenizerError> {
        match &self.state {
            TokenizerState::Loaded(engine) => Ok(engine),
            TokenizerState::Unloaded => {
                Err(TokenizerError::not_supported("tokenizer is not loaded"))
            }
        }
    }

    fn table(&self) -> Option<&VocabularyTable> {
        match &self.state {
            TokenizerState::Loaded(engine) => Some(engine.table()),
            TokenizerState::Unloaded => None,
        }
    }

    /// Encode text into token ids
    ///
    /// # Arguments
    /// * `text` - The input text to tokenize
    /// * `bos` - Number of BOS ids to prepend
    /// * `eos` - Number of EOS ids to append
    ///
    /// # Errors
    /// `TokenizerError::NotSupported` if no vocabulary is loaded, or if the
    /// requested BOS/EOS counts make the output too large to allocate.
    pub fn encode(
        &self,
        text: &str,
        bos: usize,
        eos: usize,
    ) -> Result<Vec<TokenId>, TokenizerError> {
        let engine = self.engine()?;
        let table = engine.table();

        let too_long = || {
            TokenizerError::not_supported(format!(
                "cannot encode with {} BOS and {} EOS tokens: output too large",
                bos, eos
            ))
        };
        let specials = bos.checked_add(eos).ok_or_else(too_long)?;

        let body = engine.segment(text);
        let total = specials.checked_add(body.len()).ok_or_else(too_long)?;
        let mut tokens = Vec::new();
        tokens.try_reserve_exact(total).map_err(|_| too_long())?;
        tokens.extend(std::iter::repeat_n(table.bos_id(), bos));
        tokens.extend(body);
        tokens.extend(std::iter::repeat_n(table.eos_id(), eos));
        Ok(tokens)
    }

    /// Decode one token id into its piece bytes
    ///
    /// `prev_token` is ignored; callers decoding a sequence pass the previous
    /// id for compatibility with the pipeline's calling convention.
    ///
    /// # Errors
    /// `TokenizerError::NotSupported` if no vocabulary is loaded, or if
    /// `token >= vocab_size()`.
    pub fn decode(&self, _prev_token: TokenId, token: TokenId) -> Result<Vec<u8>, TokenizerError> {
        let engine = self.engine()?;
        engine.detokenize(token).ok_or_else(|| {
            TokenizerError::not_supported(format!(
                "token {} is out of range for vocab_size {}",
                token,
                engine.table().vocab_size()
            ))
        })
    }

    /// Decode a whole sequence, replacing invalid UTF-8 with U+FFFD
    ///
    /// # Errors
    /// The first error `decode` reports.
    pub fn decode_all(&self, tokens: &[TokenId]) -> Result<String, TokenizerError> {
        let mut bytes = Vec::new();
        let mut prev = self.bos_tok();
        for &token in tokens {
            bytes.extend(self.decode(prev, token)?);
            prev = token;
        }
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Number of pieces in the loaded vocabulary, 0 when unloaded
    pub fn vocab_size(&self) -> u64 {
        self.table().map_or(0, VocabularyTable::vocab_size)
    }

    pub fn bos_tok(&self) -> u64 {
        self.table().map_or(0, VocabularyTable::bos_id)
    }

    pub fn eos_tok(&self) -> u64 {
        self.table().map_or(0, VocabularyTable::eos_id)
    }

    pub fn max_token_length(&self) -> u32 {
        self.table().map_or(0, VocabularyTable::max_token_length)
    }

    pub fn special_tokens(&self) -> SpecialTokenIds {
        SpecialTokenIds {
            bos_id: self.bos_tok(),
            eos_id: self.eos_tok(),
            unk_id: match &self.state {
                TokenizerState::Loaded(engine) => engine.unk_id(),
                TokenizerState::Unloaded => self.config.unk_id,
            },
            pad_id: self.config.pad_id,
        }
    }

    pub fn metadata(&self) -> TokenizerMetadata {
        TokenizerMetadata {
            loaded: self.is_loaded(),
            vocab_size: self.vocab_size(),
            max_token_length: self.max_token_length(),
            special_tokens: self.special_tokens(),
        }
    }

    /// Raw piece bytes for `token`, without byte-piece decoding
    pub fn piece(&self, token: TokenId) -> Option<&[u8]> {
        self.table()?.piece(token)
    }

    pub fn token_id(&self, piece: &[u8]) -> Option<TokenId> {
        self.table()?.id_of(piece)
    }
}

impl Tokenizer for BpeTokenizer {
    fn load(&mut self, path: &Path) -> Result<(), TokenizerError> {
        BpeTokenizer::load(self, path)
    }

    fn encode(&self, text: &str, bos: usize, eos: usize) -> Result<Vec<TokenId>, TokenizerError> {
        BpeTokenizer::encode(self, text, bos, eos)
    }

    fn decode(&self, prev_token: TokenId, token: TokenId) -> Result<Vec<u8>, TokenizerError> {
        BpeTokenizer::decode(self, prev_token, token)
    }

    fn vocab_size(&self) -> u64 {
        BpeTokenizer::vocab_size(self)
    }

    fn bos_tok(&self) -> u64 {
        BpeTokenizer::bos_tok(self)
    }

    fn eos_tok(&self) -> u64 {
        BpeTokenizer::eos_tok(self)
    }
}
