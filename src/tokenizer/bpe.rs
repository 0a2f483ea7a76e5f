use log::{debug, warn};

use crate::common::TokenId;
use crate::model_loader::VocabularyTable;

use super::config::TokenizerConfig;

/// Score-priority BPE over a loaded vocabulary
///
/// Segmentation works on UTF-8 code points: each code point starts as its own
/// symbol, then adjacent symbols are merged whenever their concatenation is a
/// vocabulary piece. The pair whose merged piece has the highest score goes
/// first; equal scores resolve to the leftmost pair.
///
/// Code points missing from the vocabulary use, in order: the `<0xHH>` byte
/// pieces (if byte fallback is on), the unknown id, or are dropped.
#[derive(Debug, Clone)]
pub struct BpeEngine {
    table: VocabularyTable,
    add_dummy_prefix: bool,
    byte_fallback: bool,
    space_id: Option<TokenId>,
    unk_id: Option<TokenId>,
    byte_ids: [Option<TokenId>; 256],
}

impl BpeEngine {
    pub fn new(table: VocabularyTable, config: &TokenizerConfig) -> Self {
        let space_id = table.id_of(b" ");
        let unk_id = config.unk_id.or_else(|| table.id_of(b"<unk>"));
        let byte_ids: [Option<TokenId>; 256] =
            std::array::from_fn(|b| table.id_of(byte_piece(b as u8).as_bytes()));

        debug!(
            "BPE engine ready: {} pieces, {} byte-fallback pieces, unk={:?}, space={:?}",
            table.vocab_size(),
            byte_ids.iter().filter(|id| id.is_some()).count(),
            unk_id,
            space_id
        );

        Self {
            table,
            add_dummy_prefix: config.add_dummy_prefix,
            byte_fallback: config.byte_fallback,
            space_id,
            unk_id,
            byte_ids,
        }
    }

    pub fn table(&self) -> &VocabularyTable {
        &self.table
    }

    pub fn unk_id(&self) -> Option<TokenId> {
        self.unk_id
    }

    /// Split `text` into vocabulary ids, left to right
    pub fn segment(&self, text: &str) -> Vec<TokenId> {
        if text.is_empty() {
            return Vec::new();
        }

        let mut symbols: Vec<TokenId> = Vec::with_capacity(text.len() + 1);
        if self.add_dummy_prefix {
            if let Some(id) = self.space_id {
                symbols.push(id);
            }
        }

        let mut buf = [0u8; 4];
        for ch in text.chars() {
            let bytes = ch.encode_utf8(&mut buf).as_bytes();
            match self.table.id_of(bytes) {
                Some(id) => symbols.push(id),
                None => self.push_unknown(ch, bytes, &mut symbols),
            }
        }

        self.merge(&mut symbols);
        symbols
    }

    fn push_unknown(&self, ch: char, bytes: &[u8], symbols: &mut Vec<TokenId>) {
        if !self.byte_fallback {
            match self.unk_id {
                Some(id) => symbols.push(id),
                None => warn!("Dropping {:?}: not in vocabulary and no unknown token", ch),
            }
            return;
        }

        for &b in bytes {
            match self.byte_ids[b as usize].or(self.unk_id) {
                Some(id) => symbols.push(id),
                None => warn!(
                    "Dropping byte 0x{:02X} of {:?}: no byte piece and no unknown token",
                    b, ch
                ),
            }
        }
    }

    fn merge(&self, symbols: &mut Vec<TokenId>) {
        let mut joined: Vec<u8> = Vec::with_capacity(2 * self.table.max_token_length() as usize);
        loop {
            // (position, merged id, merged score)
            let mut best: Option<(usize, TokenId, f32)> = None;
            for (i, pair) in symbols.windows(2).enumerate() {
                // A configured unk id may not name a piece; such symbols never merge
                let (Some(left), Some(right)) =
                    (self.table.piece(pair[0]), self.table.piece(pair[1]))
                else {
                    continue;
                };
                joined.clear();
                joined.extend_from_slice(left);
                joined.extend_from_slice(right);

                let Some(entry) = self.table.id_of(&joined).and_then(|id| self.table.entry(id))
                else {
                    continue;
                };
                // Strictly greater keeps the leftmost pair on ties
                if best.is_none_or(|(_, _, score)| entry.score > score) {
                    best = Some((i, entry.id, entry.score));
                }
            }

            let Some((index, id, _)) = best else {
                break;
            };
            symbols[index] = id;
            symbols.remove(index + 1);
        }
    }

    /// Bytes of a single id's piece; `<0xHH>` pieces decode to the raw byte
    pub fn detokenize(&self, id: TokenId) -> Option<Vec<u8>> {
        let piece = self.table.piece(id)?;
        Some(match parse_byte_piece(piece) {
            Some(b) => vec![b],
            None => piece.to_vec(),
        })
    }
}

/// Piece text for a raw byte, e.g. `<0x0A>` for a newline
pub fn byte_piece(b: u8) -> String {
    format!("<0x{:02X}>", b)
}

/// Inverse of [`byte_piece`]; accepts either hex case
pub fn parse_byte_piece(piece: &[u8]) -> Option<u8> {
    match piece {
        [b'<', b'0', b'x', hi, lo, b'>'] if hi.is_ascii_hexdigit() && lo.is_ascii_hexdigit() => {
            let hex = [*hi, *lo];
            u8::from_str_radix(std::str::from_utf8(&hex).ok()?, 16).ok()
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_table(with_unk: bool) -> VocabularyTable {
        let mut pieces = vec![
            ("<unk>", 0.0),
            ("<s>", 0.0),
            ("</s>", 0.0),
            ("<0x0A>", 0.0),
            ("<0xE2>", 0.0),
            ("<0x82>", 0.0),
            ("<0xAC>", 0.0),
            (" ", -1.0),
            ("a", -2.0),
            ("b", -3.0),
            ("c", -4.0),
            ("ab", 5.0),
            ("bc", 5.0),
            (" a", 2.0),
            ("é", -5.0),
        ];
        if !with_unk {
            pieces[0].0 = "<pad>";
        }
        VocabularyTable::build(1, 2, pieces).unwrap()
    }

    fn engine(config: TokenizerConfig) -> BpeEngine {
        BpeEngine::new(test_table(true), &config)
    }

    fn no_prefix() -> TokenizerConfig {
        TokenizerConfig {
            add_dummy_prefix: false,
            ..TokenizerConfig::default()
        }
    }

    #[test]
    fn test_empty_text_has_no_tokens() {
        assert!(engine(TokenizerConfig::default()).segment("").is_empty());
    }

    #[test]
    fn test_dummy_prefix_is_emitted_first() {
        let engine = engine(TokenizerConfig::default());
        // " a" (2.0) loses to "ab" (5.0) even though it is further left
        assert_eq!(engine.segment("ab"), vec![7, 11]);
        assert_eq!(engine.segment("c"), vec![7, 10]);
        // With nothing better to merge, " a" forms
        assert_eq!(engine.segment("a"), vec![13]);
    }

    #[test]
    fn test_equal_scores_merge_leftmost_pair() {
        let engine = engine(no_prefix());
        // "ab" and "bc" both score 5.0; the leftmost wins and blocks "bc"
        assert_eq!(engine.segment("abc"), vec![11, 10]);
        assert_eq!(engine.segment("bca"), vec![12, 8]);
    }

    #[test]
    fn test_merges_repeat_across_the_input() {
        let engine = engine(no_prefix());
        assert_eq!(engine.segment("abab"), vec![11, 11]);
        assert_eq!(engine.segment("aab"), vec![8, 11]);
    }

    #[test]
    fn test_multibyte_code_point_in_vocabulary() {
        let engine = engine(no_prefix());
        assert_eq!(engine.segment("é"), vec![14]);
    }

    #[test]
    fn test_unknown_code_point_uses_byte_pieces() {
        let engine = engine(no_prefix());
        assert_eq!(engine.segment("€"), vec![4, 5, 6]);
        assert_eq!(engine.segment("a\n"), vec![8, 3]);
    }

    #[test]
    fn test_byte_without_piece_falls_back_to_unk() {
        let engine = engine(no_prefix());
        // 'z' is 0x7A and there is no <0x7A> piece
        assert_eq!(engine.segment("z"), vec![0]);
        assert_eq!(engine.unk_id(), Some(0));
    }

    #[test]
    fn test_without_byte_fallback_one_unk_per_code_point() {
        let engine = engine(TokenizerConfig {
            byte_fallback: false,
            ..no_prefix()
        });
        assert_eq!(engine.segment("€a"), vec![0, 8]);
    }

    #[test]
    fn test_unknown_is_dropped_without_unk_token() {
        let engine = BpeEngine::new(test_table(false), &no_prefix());
        assert_eq!(engine.unk_id(), None);
        assert_eq!(engine.segment("zaz"), vec![8]);
        // Byte pieces still apply
        assert_eq!(engine.segment("\n"), vec![3]);
    }

    #[test]
    fn test_configured_unk_id_overrides_piece_lookup() {
        let engine = engine(TokenizerConfig {
            unk_id: Some(99),
            ..no_prefix()
        });
        // 99 names no piece, so it is emitted but never merged
        assert_eq!(engine.segment("za"), vec![99, 8]);
    }

    #[test]
    fn test_empty_vocabulary_segments_to_nothing() {
        let engine = BpeEngine::new(VocabularyTable::default(), &TokenizerConfig::default());
        assert!(engine.segment("hello world").is_empty());
    }

    #[test]
    fn test_detokenize_pieces() {
        let engine = engine(TokenizerConfig::default());
        assert_eq!(engine.detokenize(11), Some(b"ab".to_vec()));
        assert_eq!(engine.detokenize(3), Some(vec![b'\n']));
        assert_eq!(engine.detokenize(4), Some(vec![0xE2]));
        assert_eq!(engine.detokenize(0), Some(b"<unk>".to_vec()));
        assert_eq!(engine.detokenize(15), None);
    }

    #[test]
    fn test_byte_piece_parsing() {
        assert_eq!(byte_piece(10), "<0x0A>");
        assert_eq!(parse_byte_piece(b"<0x0A>"), Some(10));
        assert_eq!(parse_byte_piece(b"<0xff>"), Some(255));
        assert_eq!(parse_byte_piece(b"<0x+F>"), None);
        assert_eq!(parse_byte_piece(b"<0xZZ>"), None);
        assert_eq!(parse_byte_piece(b"<0x0A"), None);
        assert_eq!(parse_byte_piece(b"0x0A"), None);
    }
}
