use std::collections::HashMap;

use crate::common::{TokenId, VocabularyEntry, VocabularyHeader};

use super::error::ParseError;

/// In-memory vocabulary: pieces, scores and both lookup directions
///
/// Built once per load and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VocabularyTable {
    header: VocabularyHeader,
    entries: Vec<VocabularyEntry>,
    piece_to_id: HashMap<Vec<u8>, TokenId>,
}

impl VocabularyTable {
    /// Validate decoded records against their header and index them
    ///
    /// # Errors
    /// `ParseError::Corrupt` if the record count differs from
    /// `header.vocab_size`, a piece exceeds `max_token_length` (when non-zero),
    /// a piece is repeated, or a score is NaN.
    pub fn new(header: VocabularyHeader, records: Vec<(Vec<u8>, f32)>) -> Result<Self, ParseError> {
        if records.len() as u64 != u64::from(header.vocab_size) {
            return Err(ParseError::corrupt(format!(
                "header declares {} pieces but {} were provided",
                header.vocab_size,
                records.len()
            )));
        }

        let mut entries = Vec::with_capacity(records.len());
        let mut piece_to_id = HashMap::with_capacity(records.len());
        for (index, (piece, score)) in records.into_iter().enumerate() {
            let id = index as TokenId;
            if header.max_token_length > 0
                && piece.len() as u64 > u64::from(header.max_token_length)
            {
                return Err(ParseError::corrupt(format!(
                    "piece {} is {} bytes, longer than max_token_length {}",
                    id,
                    piece.len(),
                    header.max_token_length
                )));
            }
            if score.is_nan() {
                return Err(ParseError::corrupt(format!("piece {} has a NaN score", id)));
            }
            if let Some(previous) = piece_to_id.insert(piece.clone(), id) {
                return Err(ParseError::corrupt(format!(
                    "piece {:?} appears at ids {} and {}",
                    String::from_utf8_lossy(&piece),
                    previous,
                    id
                )));
            }
            entries.push(VocabularyEntry { id, piece, score });
        }

        Ok(Self {
            header,
            entries,
            piece_to_id,
        })
    }

    /// Build a table from pieces in id order, deriving the header
    pub fn build<I, P>(bos_id: u32, eos_id: u32, records: I) -> Result<Self, ParseError>
    where
        I: IntoIterator<Item = (P, f32)>,
        P: Into<Vec<u8>>,
    {
        let records: Vec<(Vec<u8>, f32)> = records
            .into_iter()
            .map(|(piece, score)| (piece.into(), score))
            .collect();
        let vocab_size = u32::try_from(records.len())
            .map_err(|_| ParseError::corrupt("more pieces than fit in a u32 vocab_size"))?;
        let longest = records.iter().map(|(piece, _)| piece.len()).max().unwrap_or(0);
        let max_token_length = u32::try_from(longest)
            .map_err(|_| ParseError::corrupt("piece longer than fits in a u32 length"))?;

        let header = VocabularyHeader {
            vocab_size,
            bos_id,
            eos_id,
            max_token_length,
        };
        Self::new(header, records)
    }

    pub fn header(&self) -> &VocabularyHeader {
        &self.header
    }

    pub fn vocab_size(&self) -> u64 {
        self.entries.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn bos_id(&self) -> TokenId {
        TokenId::from(self.header.bos_id)
    }

    pub fn eos_id(&self) -> TokenId {
        TokenId::from(self.header.eos_id)
    }

    pub fn max_token_length(&self) -> u32 {
        self.header.max_token_length
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    pub fn entry(&self, id: TokenId) -> Option<&VocabularyEntry> {
        usize::try_from(id).ok().and_then(|index| self.entries.get(index))
    }

    pub fn piece(&self, id: TokenId) -> Option<&[u8]> {
        self.entry(id).map(|entry| entry.piece.as_slice())
    }

    pub fn score(&self, id: TokenId) -> Option<f32> {
        self.entry(id).map(|entry| entry.score)
    }

    pub fn id_of(&self, piece: &[u8]) -> Option<TokenId> {
        self.piece_to_id.get(piece).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_indexes_both_directions() {
        let table = VocabularyTable::build(1, 2, [("a", 0.0), ("b", -1.0), ("ab", 3.0)]).unwrap();

        assert_eq!(table.vocab_size(), 3);
        assert_eq!(table.bos_id(), 1);
        assert_eq!(table.eos_id(), 2);
        assert_eq!(table.max_token_length(), 2);
        assert_eq!(table.piece(2), Some(&b"ab"[..]));
        assert_eq!(table.score(1), Some(-1.0));
        assert_eq!(table.id_of(b"b"), Some(1));
        assert_eq!(table.id_of(b"ba"), None);
        assert_eq!(table.piece(3), None);
        assert_eq!(table.piece(u64::MAX), None);
    }

    #[test]
    fn test_empty_table_is_valid() {
        let table = VocabularyTable::new(VocabularyHeader::default(), Vec::new()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.vocab_size(), 0);
        assert_eq!(table.bos_id(), 0);
        assert_eq!(table.eos_id(), 0);
    }

    #[test]
    fn test_count_mismatch_is_corrupt() {
        let header = VocabularyHeader {
            vocab_size: 2,
            ..Default::default()
        };
        let result = VocabularyTable::new(header, vec![(b"a".to_vec(), 0.0)]);
        assert!(matches!(result, Err(ParseError::Corrupt(_))));
    }

    #[test]
    fn test_duplicate_piece_is_corrupt() {
        let result = VocabularyTable::build(0, 0, [("x", 0.0), ("x", 1.0)]);
        assert!(matches!(result, Err(ParseError::Corrupt(_))));
    }

    #[test]
    fn test_nan_score_is_corrupt() {
        let result = VocabularyTable::build(0, 0, [("x", f32::NAN)]);
        assert!(matches!(result, Err(ParseError::Corrupt(_))));
    }

    #[test]
    fn test_piece_longer_than_header_limit_is_corrupt() {
        let header = VocabularyHeader {
            vocab_size: 1,
            max_token_length: 2,
            ..Default::default()
        };
        let result = VocabularyTable::new(header, vec![(b"abc".to_vec(), 0.0)]);
        assert!(matches!(result, Err(ParseError::Corrupt(_))));
    }
}
