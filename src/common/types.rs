use serde::Serialize;

/// Token identifier handed to the inference runtime
pub type TokenId = u64;

/// Fixed-size header at the start of a vocabulary file
///
/// Layout on disk is four little-endian `u32` values in field order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VocabularyHeader {
    pub vocab_size: u32,
    pub bos_id: u32,
    pub eos_id: u32,
    /// Longest piece in bytes; 0 disables the length check
    pub max_token_length: u32,
}

impl VocabularyHeader {
    /// Size of the encoded header in bytes
    pub const ENCODED_LEN: u64 = 16;
}

/// One vocabulary record
#[derive(Debug, Clone, PartialEq)]
pub struct VocabularyEntry {
    /// Dense id, equal to the record's position in the file
    pub id: TokenId,
    /// Raw piece bytes (usually UTF-8, but byte-fallback pieces are ASCII escapes)
    pub piece: Vec<u8>,
    /// Merge priority: the higher the score, the earlier the piece is formed
    pub score: f32,
}

/// Sentinel ids the tokenizer returns around encoded sequences
///
/// `bos_id` and `eos_id` come straight from the vocabulary header and are
/// not guaranteed to name a real piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SpecialTokenIds {
    pub bos_id: TokenId,
    pub eos_id: TokenId,
    pub unk_id: Option<TokenId>,
    pub pad_id: Option<TokenId>,
}

/// Snapshot of the loaded tokenizer, exported by the CLI as JSON
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TokenizerMetadata {
    pub loaded: bool,
    pub vocab_size: u64,
    pub max_token_length: u32,
    #[serde(flatten)]
    pub special_tokens: SpecialTokenIds,
}
