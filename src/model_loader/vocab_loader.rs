use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Seek, Write};
use std::path::Path;

use log::debug;

use crate::common::VocabularyHeader;

use super::error::ParseError;
use super::io::{write_f32, write_u32, Reader};
use super::table::VocabularyTable;

/// Read a vocabulary file from disk
///
/// # Format
/// All integers are little-endian.
///
/// ```text
/// u32 vocab_size
/// u32 bos_id
/// u32 eos_id
/// u32 max_token_length
/// vocab_size × { f32 score, u32 len, [u8; len] piece }
/// ```
///
/// The file must end right after the last record. An all-zero header with
/// no records is a valid, empty vocabulary.
///
/// # Errors
/// * `ParseError::Io` if the file cannot be opened or read
/// * `ParseError::Corrupt` if the contents do not match the layout above
pub fn parse_vocabulary<P: AsRef<Path>>(path: P) -> Result<VocabularyTable, ParseError> {
    let path = path.as_ref();
    // The handle is dropped when this scope ends, on success and on every error path
    let file = File::open(path)?;
    let table = read_vocabulary(BufReader::new(file))?;
    debug!(
        "Parsed {} pieces from {}",
        table.vocab_size(),
        path.display()
    );
    Ok(table)
}

/// Parse a vocabulary from any seekable buffered source
pub fn read_vocabulary<R: BufRead + Seek>(buffer: R) -> Result<VocabularyTable, ParseError> {
    let mut reader = Reader::new(buffer, 0);

    let header = read_header(&mut reader)?;

    // Cap the up-front reservation; a lying header must not drive allocation
    let mut records = Vec::with_capacity((header.vocab_size as usize).min(1 << 16));
    for index in 0..header.vocab_size {
        let score = reader.read_f32()?;
        let piece = reader.read_piece().map_err(|err| match err {
            ParseError::Corrupt(msg) => ParseError::Corrupt(format!("record {}: {}", index, msg)),
            other => other,
        })?;
        records.push((piece, score));
    }

    if !reader.at_end()? {
        return Err(ParseError::corrupt(format!(
            "unexpected trailing bytes after record {} at byte {}",
            header.vocab_size,
            reader.position()
        )));
    }

    VocabularyTable::new(header, records)
}

fn read_header<R: BufRead + Seek>(reader: &mut Reader<R>) -> Result<VocabularyHeader, ParseError> {
    let header_bytes = reader.read_bytes(VocabularyHeader::ENCODED_LEN).map_err(|err| match err {
        ParseError::Corrupt(_) => ParseError::corrupt(format!(
            "header needs {} bytes",
            VocabularyHeader::ENCODED_LEN
        )),
        other => other,
    })?;

    let field = |index: usize| {
        let start = index * 4;
        u32::from_le_bytes([
            header_bytes[start],
            header_bytes[start + 1],
            header_bytes[start + 2],
            header_bytes[start + 3],
        ])
    };
    Ok(VocabularyHeader {
        vocab_size: field(0),
        bos_id: field(1),
        eos_id: field(2),
        max_token_length: field(3),
    })
}

/// Serialize `table` in the layout `parse_vocabulary` reads
pub fn write_vocabulary<P: AsRef<Path>>(
    table: &VocabularyTable,
    path: P,
) -> Result<(), ParseError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    encode_vocabulary(table, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn encode_vocabulary<W: Write>(
    table: &VocabularyTable,
    writer: &mut W,
) -> Result<(), ParseError> {
    let header = table.header();
    write_u32(writer, header.vocab_size)?;
    write_u32(writer, header.bos_id)?;
    write_u32(writer, header.eos_id)?;
    write_u32(writer, header.max_token_length)?;

    for entry in table.entries() {
        let len = u32::try_from(entry.piece.len())
            .map_err(|_| ParseError::corrupt(format!("piece {} is too long to encode", entry.id)))?;
        write_f32(writer, entry.score)?;
        write_u32(writer, len)?;
        writer.write_all(&entry.piece)?;
    }
    Ok(())
}
