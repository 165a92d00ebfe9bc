//! Separate-file postings codec.
//!
//! Postings for a segment are spread over independent streams rather than
//! interleaved into one file: document deltas, frequencies and position
//! deltas each live in their own integer stream, payload bytes in a raw
//! byte stream, and a multi-level skip list in another. Term metadata
//! bookmarks each stream so a term can be located in all of them at once.
//!
//! Streams per segment:
//!
//! - `.doc` document id deltas
//! - `.frq` term frequencies (omitted for docs-only fields)
//! - `.pos` position deltas (only for positional fields)
//! - `.pyl` raw payload bytes
//! - `.skp` multi-level skip data

pub mod reader;
pub mod skip_reader;
pub mod skip_writer;
pub mod writer;

pub use reader::{SepDocsAndPositionsEnum, SepDocsEnum, SepPostingsReader, SepTermState};
pub use skip_reader::SepSkipReader;
pub use skip_writer::SepSkipWriter;
pub use writer::{SepPostingsWriter, SepTermWriteState};

use crate::int_stream::{IntIndexInput, IntIndexOutput, IntStreamFactory};

/// Sentinel document id returned once an enumerator is exhausted.
pub const NO_MORE_DOCS: u32 = u32::MAX;

/// Extension of the document stream.
pub const DOC_EXTENSION: &str = "doc";
/// Extension of the frequency stream.
pub const FREQ_EXTENSION: &str = "frq";
/// Extension of the position stream.
pub const POS_EXTENSION: &str = "pos";
/// Extension of the payload byte stream.
pub const PAYLOAD_EXTENSION: &str = "pyl";
/// Extension of the skip-list stream.
pub const SKIP_EXTENSION: &str = "skp";

pub(crate) const CODEC: &str = "SepPostings";
pub(crate) const VERSION_CURRENT: u32 = 0;

/// Number of documents between skip entries at the lowest level.
pub const DEFAULT_SKIP_INTERVAL: u32 = 16;

/// Hard cap on skip-list depth.
pub(crate) const MAX_SKIP_LEVELS: u32 = 10;

/// Build the name of one postings stream file.
///
/// The suffix distinguishes multiple postings sets within one segment and
/// may be empty.
pub fn file_name(segment: &str, suffix: &str, extension: &str) -> String {
    if suffix.is_empty() {
        format!("{segment}.{extension}")
    } else {
        format!("{segment}_{suffix}.{extension}")
    }
}

/// Floor of log_base(x), counted by repeated division.
pub(crate) fn ilog(mut x: u32, base: u32) -> u32 {
    debug_assert!(base > 1);
    let mut log = 0;
    while x >= base {
        x /= base;
        log += 1;
    }
    log
}

/// Identity and shape of the segment a postings set belongs to.
#[derive(Debug, Clone)]
pub struct SegmentState {
    /// Segment name, the stem of every stream file name.
    pub segment: String,
    /// Distinguishes postings sets within the segment; may be empty.
    pub suffix: String,
    /// Total number of documents in the segment.
    pub doc_count: u32,
    /// Whether the field being read or written records frequencies.
    pub has_freqs: bool,
    /// Whether the field being read or written records positions.
    pub has_positions: bool,
}

/// The output bookmark type of a factory's writer stream.
pub type OutputBookmarkOf<F> =
    <<F as IntStreamFactory>::Output as IntIndexOutput>::Bookmark;

/// The input bookmark type of a factory's reader stream.
pub type InputBookmarkOf<F> =
    <<F as IntStreamFactory>::Input as IntIndexInput>::Bookmark;

/// The decoding cursor type of a factory's reader stream.
pub type IntReaderOf<F> = <<F as IntStreamFactory>::Input as IntIndexInput>::Reader;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_name() {
        assert_eq!(file_name("_0", "", "doc"), "_0.doc");
        assert_eq!(file_name("_0", "body", "skp"), "_0_body.skp");
    }

    #[test]
    fn test_ilog() {
        assert_eq!(ilog(0, 16), 0);
        assert_eq!(ilog(15, 16), 0);
        assert_eq!(ilog(16, 16), 1);
        assert_eq!(ilog(255, 16), 1);
        assert_eq!(ilog(256, 16), 2);
        assert_eq!(ilog(4096, 16), 3);
    }
}
