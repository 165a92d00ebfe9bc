//! Variable-length integer stream encoding.
//!
//! The simplest concrete encoding: each value is written as a VarInt, one
//! after another, behind a codec header. Bookmarks are byte offsets into
//! the stream.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::error::Result;
use crate::int_stream::{
    InputBookmark, IntIndexInput, IntIndexOutput, IntReader, IntStreamFactory, OutputBookmark,
};
use crate::storage::{Storage, StorageInput, StorageOutput};
use crate::util::{header, varint};

const CODEC_NAME: &str = "PlainInt";
const VERSION_CURRENT: u32 = 1;

/// Factory for VarInt-encoded integer streams.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainIntStreamFactory;

impl PlainIntStreamFactory {
    /// Create a new factory.
    pub fn new() -> Self {
        PlainIntStreamFactory
    }
}

impl IntStreamFactory for PlainIntStreamFactory {
    type Output = PlainIntOutput;
    type Input = PlainIntInput;

    fn create_output(&self, storage: &dyn Storage, name: &str) -> Result<Self::Output> {
        let mut out = storage.create_output(name)?;
        header::write_header(&mut out, CODEC_NAME, VERSION_CURRENT)?;
        Ok(PlainIntOutput { out })
    }

    fn open_input(&self, storage: &dyn Storage, name: &str) -> Result<Self::Input> {
        let mut input = storage.open_input(name)?;
        header::check_header(&mut input, CODEC_NAME, VERSION_CURRENT)?;
        let data_start = input.stream_position()?;
        Ok(PlainIntInput { input, data_start })
    }
}

/// Writer for a VarInt integer stream.
#[derive(Debug)]
pub struct PlainIntOutput {
    out: Box<dyn StorageOutput>,
}

impl PlainIntOutput {
    fn position(&self) -> Result<u64> {
        self.out.position()
    }
}

impl IntIndexOutput for PlainIntOutput {
    type Bookmark = PlainOutputBookmark;

    fn write(&mut self, value: u32) -> Result<()> {
        varint::write_u32(&mut self.out, value)?;
        Ok(())
    }

    fn index(&self) -> Self::Bookmark {
        PlainOutputBookmark { fp: 0, last_fp: 0 }
    }

    fn close(&mut self) -> Result<()> {
        self.out.close()
    }
}

/// A byte offset into a [`PlainIntOutput`] stream.
#[derive(Debug, Clone)]
pub struct PlainOutputBookmark {
    fp: u64,
    last_fp: u64,
}

impl OutputBookmark<PlainIntOutput> for PlainOutputBookmark {
    fn mark(&mut self, output: &PlainIntOutput) -> Result<()> {
        self.fp = output.position()?;
        Ok(())
    }

    fn copy_from(&mut self, other: &Self, copy_last: bool) {
        self.fp = other.fp;
        if copy_last {
            self.last_fp = other.fp;
        }
    }

    fn write(&mut self, sink: &mut dyn Write, absolute: bool) -> Result<()> {
        if absolute {
            varint::write_u64(sink, self.fp)?;
        } else {
            varint::write_u64(sink, self.fp - self.last_fp)?;
        }
        self.last_fp = self.fp;
        Ok(())
    }
}

/// Reader side of a VarInt integer stream.
#[derive(Debug)]
pub struct PlainIntInput {
    input: Box<dyn StorageInput>,
    data_start: u64,
}

impl IntIndexInput for PlainIntInput {
    type Reader = PlainIntReader;
    type Bookmark = PlainInputBookmark;

    fn reader(&self) -> Result<Self::Reader> {
        let mut input = self.input.clone_input()?;
        input.seek(SeekFrom::Start(self.data_start))?;
        Ok(PlainIntReader { input })
    }

    fn index(&self) -> Self::Bookmark {
        PlainInputBookmark { fp: self.data_start }
    }

    fn close(&mut self) -> Result<()> {
        self.input.close()
    }
}

/// Decoding cursor over a VarInt integer stream.
#[derive(Debug)]
pub struct PlainIntReader {
    input: Box<dyn StorageInput>,
}

impl IntReader for PlainIntReader {
    fn next(&mut self) -> Result<u32> {
        varint::read_u32(&mut self.input)
    }
}

/// A deserialized byte offset into a VarInt integer stream.
#[derive(Debug, Clone)]
pub struct PlainInputBookmark {
    fp: u64,
}

impl InputBookmark<PlainIntReader> for PlainInputBookmark {
    fn read(&mut self, source: &mut dyn Read, absolute: bool) -> Result<()> {
        if absolute {
            self.fp = varint::read_u64(source)?;
        } else {
            self.fp += varint::read_u64(source)?;
        }
        Ok(())
    }

    fn seek(&self, reader: &mut PlainIntReader) -> Result<()> {
        reader.input.seek(SeekFrom::Start(self.fp))?;
        Ok(())
    }

    fn copy_from(&mut self, other: &Self) {
        self.fp = other.fp;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    #[test]
    fn test_stream_roundtrip() {
        let storage = MemoryStorage::new();
        let factory = PlainIntStreamFactory::new();

        let mut out = factory.create_output(&storage, "seg.doc").unwrap();
        for value in [3u32, 0, 17, 100_000] {
            out.write(value).unwrap();
        }
        out.close().unwrap();

        let input = factory.open_input(&storage, "seg.doc").unwrap();
        let mut reader = input.reader().unwrap();
        assert_eq!(reader.next().unwrap(), 3);
        assert_eq!(reader.next().unwrap(), 0);
        assert_eq!(reader.next().unwrap(), 17);
        assert_eq!(reader.next().unwrap(), 100_000);
    }

    #[test]
    fn test_bookmark_seek() {
        let storage = MemoryStorage::new();
        let factory = PlainIntStreamFactory::new();

        let mut out = factory.create_output(&storage, "seg.frq").unwrap();
        out.write(1).unwrap();
        out.write(2).unwrap();

        // Mark the position before the third value.
        let mut mark = out.index();
        mark.mark(&out).unwrap();
        out.write(300).unwrap();
        out.write(4).unwrap();
        out.close().unwrap();

        let mut marked_bytes = Vec::new();
        mark.write(&mut marked_bytes, true).unwrap();

        let input = factory.open_input(&storage, "seg.frq").unwrap();
        let mut bookmark = input.index();
        bookmark
            .read(&mut std::io::Cursor::new(&marked_bytes), true)
            .unwrap();

        let mut reader = input.reader().unwrap();
        bookmark.seek(&mut reader).unwrap();
        assert_eq!(reader.next().unwrap(), 300);
        assert_eq!(reader.next().unwrap(), 4);
    }

    #[test]
    fn test_bookmark_delta_encoding() {
        let storage = MemoryStorage::new();
        let factory = PlainIntStreamFactory::new();

        let mut out = factory.create_output(&storage, "seg.pos").unwrap();
        let mut mark = out.index();

        mark.mark(&out).unwrap();
        let mut sink = Vec::new();
        mark.write(&mut sink, true).unwrap();
        let absolute_len = sink.len();

        for _ in 0..64 {
            out.write(200).unwrap();
        }
        mark.mark(&out).unwrap();
        mark.write(&mut sink, false).unwrap();
        out.close().unwrap();

        // Replay the absolute then delta records on the reader side.
        let input = factory.open_input(&storage, "seg.pos").unwrap();
        let mut cursor = std::io::Cursor::new(&sink);
        let mut bookmark = input.index();
        bookmark.read(&mut cursor, true).unwrap();
        let first_fp = bookmark.fp;
        bookmark.read(&mut cursor, false).unwrap();
        assert_eq!(bookmark.fp - first_fp, 128); // 64 two-byte VarInts
        assert!(absolute_len > 0);
    }

    #[test]
    fn test_copy_from_resets_delta_base() {
        let storage = MemoryStorage::new();
        let factory = PlainIntStreamFactory::new();

        let mut out = factory.create_output(&storage, "seg.tmp").unwrap();
        out.write(9).unwrap();

        let mut base = out.index();
        base.mark(&out).unwrap();

        let mut copy = out.index();
        copy.copy_from(&base, true);

        // With the delta base equal to the position, the first delta is 0.
        let mut sink = Vec::new();
        copy.write(&mut sink, false).unwrap();
        assert_eq!(sink, vec![0]);
        out.close().unwrap();
    }
}
