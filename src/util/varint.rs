//! Variable-length integer encoding utilities.
//!
//! This module provides efficient variable-length integer encoding and
//! decoding using 7 bits per byte with a continuation bit, allowing
//! efficient encoding of small numbers. All postings values (deltas,
//! lengths, file offsets) go through these routines.

use std::io::{self, Read, Write};

use byteorder::ReadBytesExt;

use crate::error::{Result, SepIndexError};

/// Write a variable-length encoded u32 to a writer.
///
/// Returns the number of bytes written.
pub fn write_u32<W: Write + ?Sized>(writer: &mut W, value: u32) -> Result<usize> {
    let mut val = value;
    let mut written = 0;

    loop {
        let mut byte = (val & 0x7F) as u8;
        val >>= 7;

        if val != 0 {
            byte |= 0x80; // Set continuation bit
        }

        writer.write_all(&[byte])?;
        written += 1;

        if val == 0 {
            return Ok(written);
        }
    }
}

/// Write a variable-length encoded u64 to a writer.
///
/// Returns the number of bytes written.
pub fn write_u64<W: Write + ?Sized>(writer: &mut W, value: u64) -> Result<usize> {
    let mut val = value;
    let mut written = 0;

    loop {
        let mut byte = (val & 0x7F) as u8;
        val >>= 7;

        if val != 0 {
            byte |= 0x80;
        }

        writer.write_all(&[byte])?;
        written += 1;

        if val == 0 {
            return Ok(written);
        }
    }
}

/// Read a variable-length encoded u32 from a reader.
pub fn read_u32<R: Read + ?Sized>(reader: &mut R) -> Result<u32> {
    let mut result = 0u32;
    let mut shift = 0;

    loop {
        if shift >= 32 {
            return Err(SepIndexError::corruption("VarInt overflow"));
        }

        let byte = reader.read_u8().map_err(map_eof)?;
        result |= ((byte & 0x7F) as u32) << shift;

        if (byte & 0x80) == 0 {
            return Ok(result);
        }

        shift += 7;
    }
}

/// Read a variable-length encoded u64 from a reader.
pub fn read_u64<R: Read + ?Sized>(reader: &mut R) -> Result<u64> {
    let mut result = 0u64;
    let mut shift = 0;

    loop {
        if shift >= 64 {
            return Err(SepIndexError::corruption("VarInt overflow"));
        }

        let byte = reader.read_u8().map_err(map_eof)?;
        result |= ((byte & 0x7F) as u64) << shift;

        if (byte & 0x80) == 0 {
            return Ok(result);
        }

        shift += 7;
    }
}

// Reading past a stream's declared bounds is corruption, not a plain I/O
// failure.
fn map_eof(err: io::Error) -> SepIndexError {
    if err.kind() == io::ErrorKind::UnexpectedEof {
        SepIndexError::corruption("unexpected end of stream")
    } else {
        SepIndexError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_u32_roundtrip() {
        for value in [0u32, 1, 127, 128, 300, 16383, 16384, u32::MAX] {
            let mut buf = Vec::new();
            write_u32(&mut buf, value).unwrap();
            let decoded = read_u32(&mut Cursor::new(&buf)).unwrap();
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn test_u64_roundtrip() {
        for value in [0u64, 1, 127, 128, 1 << 35, u64::MAX] {
            let mut buf = Vec::new();
            write_u64(&mut buf, value).unwrap();
            let decoded = read_u64(&mut Cursor::new(&buf)).unwrap();
            assert_eq!(decoded, value);
        }
    }

    #[test]
    fn test_small_values_are_one_byte() {
        for value in 0u32..128 {
            let mut buf = Vec::new();
            assert_eq!(write_u32(&mut buf, value).unwrap(), 1);
        }
    }

    #[test]
    fn test_truncated_input_is_corruption() {
        // Continuation bit set but no following byte.
        let buf = vec![0x80u8];
        let err = read_u32(&mut Cursor::new(&buf)).unwrap_err();
        assert!(matches!(err, SepIndexError::Corruption(_)));
    }
}
