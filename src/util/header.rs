//! Codec file headers.
//!
//! Every binary stream written by this crate starts with a short header: a
//! length-prefixed codec name tag followed by a fixed-width version. The
//! reader side validates both before trusting anything that follows.

use std::io::{Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Result, SepIndexError};
use crate::util::varint;

// Upper bound on a codec name tag; anything longer is not one of ours.
const MAX_CODEC_LEN: u32 = 128;

/// Write a codec header: name tag then version.
pub fn write_header<W: Write + ?Sized>(out: &mut W, codec: &str, version: u32) -> Result<()> {
    varint::write_u32(out, codec.len() as u32)?;
    out.write_all(codec.as_bytes())?;
    out.write_u32::<LittleEndian>(version)?;
    Ok(())
}

/// Validate a codec header and return the version found.
pub fn check_header<R: Read + ?Sized>(input: &mut R, codec: &str, expected: u32) -> Result<u32> {
    let len = varint::read_u32(input)?;
    if len > MAX_CODEC_LEN || len as usize != codec.len() {
        return Err(SepIndexError::corruption(format!(
            "codec header mismatch: expected '{codec}'"
        )));
    }

    let mut tag = vec![0u8; len as usize];
    input.read_exact(&mut tag)?;
    if tag != codec.as_bytes() {
        return Err(SepIndexError::corruption(format!(
            "codec header mismatch: expected '{codec}', found '{}'",
            String::from_utf8_lossy(&tag)
        )));
    }

    let version = input.read_u32::<LittleEndian>()?;
    if version != expected {
        return Err(SepIndexError::corruption(format!(
            "version mismatch for codec '{codec}': expected {expected}, found {version}"
        )));
    }

    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_header_roundtrip() {
        let mut buf = Vec::new();
        write_header(&mut buf, "TestCodec", 3).unwrap();
        let version = check_header(&mut Cursor::new(&buf), "TestCodec", 3).unwrap();
        assert_eq!(version, 3);
    }

    #[test]
    fn test_wrong_codec_name() {
        let mut buf = Vec::new();
        write_header(&mut buf, "TestCodec", 3).unwrap();
        let err = check_header(&mut Cursor::new(&buf), "OtherCodec", 3).unwrap_err();
        assert!(err.to_string().contains("codec header mismatch"));
    }

    #[test]
    fn test_wrong_version() {
        let mut buf = Vec::new();
        write_header(&mut buf, "TestCodec", 3).unwrap();
        let err = check_header(&mut Cursor::new(&buf), "TestCodec", 4).unwrap_err();
        assert!(err.to_string().contains("version mismatch"));
    }
}
