use std::io::{self, BufRead, Read, Seek, SeekFrom, Write};

use super::error::ParseError;

/// Little-endian cursor over a vocabulary file
///
/// Every read advances `pos`. Reads are sequential; the underlying buffer is
/// only seeked on the first read and after a failed one. Running out of bytes
/// mid-field is reported as `ParseError::Corrupt`; any other I/O failure stays
/// `ParseError::Io`.
pub struct Reader<R: BufRead + Seek> {
    buffer: R,
    pos: u64,
    needs_seek: bool,
}

impl<R: BufRead + Seek> Reader<R> {
    pub fn new(buffer: R, initial_pos: u64) -> Self {
        Reader {
            buffer,
            pos: initial_pos,
            needs_seek: true,
        }
    }

    fn sync(&mut self) -> Result<(), ParseError> {
        if self.needs_seek {
            self.buffer.seek(SeekFrom::Start(self.pos))?;
            self.needs_seek = false;
        }
        Ok(())
    }

    pub fn position(&self) -> u64 {
        self.pos
    }

    pub fn read_bytes(&mut self, size: u64) -> Result<Vec<u8>, ParseError> {
        self.sync()?;
        // Grow with the data actually present so a bogus length cannot force a huge allocation
        let mut vec = Vec::new();
        let read = (&mut self.buffer).take(size).read_to_end(&mut vec);
        if read.is_err() || (vec.len() as u64) < size {
            // The buffer moved past `pos`; realign before the next read
            self.needs_seek = true;
        }
        read?;
        if (vec.len() as u64) < size {
            return Err(ParseError::corrupt(format!(
                "truncated at byte {}: wanted {} bytes, found {}",
                self.pos,
                size,
                vec.len()
            )));
        }
        self.pos += size;
        Ok(vec)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ParseError> {
        let bytes = self.read_bytes(N as u64)?;
        bytes
            .try_into()
            .map_err(|_| ParseError::corrupt(format!("expected {} bytes at {}", N, self.pos)))
    }

    pub fn read_u32(&mut self) -> Result<u32, ParseError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_f32(&mut self) -> Result<f32, ParseError> {
        Ok(f32::from_le_bytes(self.read_array()?))
    }

    /// Length-prefixed byte string: a `u32` length followed by that many bytes
    pub fn read_piece(&mut self) -> Result<Vec<u8>, ParseError> {
        let len = self.read_u32()?;
        self.read_bytes(u64::from(len))
    }

    /// True once no bytes remain past the current position
    pub fn at_end(&mut self) -> Result<bool, ParseError> {
        self.sync()?;
        Ok(self.buffer.fill_buf()?.is_empty())
    }
}

pub fn write_u32<W: Write>(writer: &mut W, value: u32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}

pub fn write_f32<W: Write>(writer: &mut W, value: f32) -> io::Result<()> {
    writer.write_all(&value.to_le_bytes())
}
