pub mod types;

pub use types::{SpecialTokenIds, TokenId, TokenizerMetadata, VocabularyEntry, VocabularyHeader};
