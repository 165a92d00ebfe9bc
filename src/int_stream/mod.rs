//! Abstraction over streams of unsigned integers.
//!
//! The postings codec never touches raw bytes for its doc, freq and
//! position data. It writes through [`IntIndexOutput`] and reads through
//! [`IntIndexInput`], so the on-disk integer encoding can be swapped by
//! providing a different [`IntStreamFactory`]. Bookmarks capture stream
//! positions as values; they can be serialized as absolute offsets or as
//! deltas against the previously written bookmark, and later seek a reader
//! back to the captured spot.

pub mod plain;

pub use plain::PlainIntStreamFactory;

use std::io::{Read, Write};

use crate::error::Result;
use crate::storage::Storage;

/// Creates matched integer stream writers and readers.
///
/// A factory pins down one concrete encoding. All streams of a segment
/// must be produced and consumed by the same factory type.
pub trait IntStreamFactory {
    /// The writer side of the encoding.
    type Output: IntIndexOutput;
    /// The reader side of the encoding.
    type Input: IntIndexInput;

    /// Create a named integer stream for writing.
    fn create_output(&self, storage: &dyn Storage, name: &str) -> Result<Self::Output>;

    /// Open a previously written integer stream for reading.
    fn open_input(&self, storage: &dyn Storage, name: &str) -> Result<Self::Input>;
}

/// A writable stream of unsigned integers.
pub trait IntIndexOutput {
    /// Bookmark type capturing positions in this stream.
    type Bookmark: OutputBookmark<Self>;

    /// Append one integer to the stream.
    fn write(&mut self, value: u32) -> Result<()>;

    /// Create a fresh, unpositioned bookmark for this stream.
    fn index(&self) -> Self::Bookmark;

    /// Flush and close the stream.
    fn close(&mut self) -> Result<()>;
}

/// A position in an [`IntIndexOutput`], serializable into a byte sink.
///
/// Bookmarks are plain values. Copying one never aliases another; each
/// carries its own notion of the last position it serialized, which is
/// what makes delta encoding per consumer possible.
pub trait OutputBookmark<O: ?Sized>: Clone {
    /// Capture the stream's current position.
    fn mark(&mut self, output: &O) -> Result<()>;

    /// Copy another bookmark's position. When `copy_last` is set the
    /// delta base is also reset to that position, so the next serialized
    /// delta is measured from it.
    fn copy_from(&mut self, other: &Self, copy_last: bool);

    /// Serialize the position, absolute or as a delta from the last
    /// position this bookmark serialized.
    fn write(&mut self, sink: &mut dyn Write, absolute: bool) -> Result<()>;
}

/// A readable stream of unsigned integers.
pub trait IntIndexInput {
    /// Cursor type that decodes integers.
    type Reader: IntReader;
    /// Bookmark type capturing positions in this stream.
    type Bookmark: InputBookmark<Self::Reader>;

    /// Create an independent cursor over the stream, positioned at the
    /// first integer.
    fn reader(&self) -> Result<Self::Reader>;

    /// Create a fresh, unpositioned bookmark for this stream.
    fn index(&self) -> Self::Bookmark;

    /// Close the stream.
    fn close(&mut self) -> Result<()>;
}

/// A decoding cursor over an integer stream.
pub trait IntReader {
    /// Decode the next integer.
    fn next(&mut self) -> Result<u32>;
}

/// A deserialized position in an [`IntIndexInput`].
pub trait InputBookmark<R>: Clone {
    /// Deserialize a position, absolute or as a delta applied to the
    /// position currently held.
    fn read(&mut self, source: &mut dyn Read, absolute: bool) -> Result<()>;

    /// Reposition a reader at the held position.
    fn seek(&self, reader: &mut R) -> Result<()>;

    /// Copy another bookmark's position.
    fn copy_from(&mut self, other: &Self);
}
