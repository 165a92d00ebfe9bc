//! Multi-level skip list writer.
//!
//! While a term's postings are written, an entry is buffered every
//! `skip_interval` documents. Level 0 holds every entry; level `n` holds
//! every `skip_interval`-th entry of level `n - 1`. Higher levels are
//! written first so a reader can skim them without touching the lower
//! ones, and every entry above level 0 carries a pointer to its child
//! entry one level down.
//!
//! Each entry records the document id delta and the positions of the doc,
//! freq and pos streams at that point, as bookmark deltas against the
//! previous entry of the same level. For payload fields the entry also
//! tracks the payload byte offset and the current payload length, the
//! length only when it changed.

use std::io::Write;

use crate::error::Result;
use crate::int_stream::{IntIndexOutput, IntStreamFactory, OutputBookmark};
use crate::postings::{OutputBookmarkOf, ilog};
use crate::schema::IndexOptions;
use crate::storage::StorageOutput;
use crate::util::varint;

/// Level buffers and the structural mechanics shared by any skip entry
/// format: level count, entry cadence, child pointers and final layout.
#[derive(Debug)]
pub(crate) struct SkipBuffers {
    buffers: Vec<Vec<u8>>,
    skip_interval: u32,
    num_levels: usize,
}

impl SkipBuffers {
    pub(crate) fn new(skip_interval: u32, max_levels: u32, doc_count: u32) -> Self {
        let num_levels = Self::levels_for(skip_interval, max_levels, doc_count);
        SkipBuffers {
            buffers: vec![Vec::new(); num_levels],
            skip_interval,
            num_levels,
        }
    }

    /// How many levels a stream over `doc_count` documents can usefully
    /// have.
    fn levels_for(skip_interval: u32, max_levels: u32, doc_count: u32) -> usize {
        let levels = if doc_count <= skip_interval {
            1
        } else {
            (1 + ilog(doc_count / skip_interval, skip_interval)).min(max_levels)
        };
        levels.max(1) as usize
    }

    pub(crate) fn num_levels(&self) -> usize {
        self.num_levels
    }

    /// Drop all buffered entries, ready for the next term.
    pub(crate) fn reset(&mut self) {
        for buffer in &mut self.buffers {
            buffer.clear();
        }
    }

    /// Buffer one skip entry. `df` is the number of documents written so
    /// far; the entry reaches every level whose cadence divides it.
    /// `write_entry` serializes the entry payload for one level.
    pub(crate) fn buffer_skip(
        &mut self,
        df: u32,
        mut write_entry: impl FnMut(usize, &mut Vec<u8>) -> Result<()>,
    ) -> Result<()> {
        debug_assert_eq!(df % self.skip_interval, 0);

        let mut entry_levels = 1;
        let mut d = df / self.skip_interval;
        while d % self.skip_interval == 0 && entry_levels < self.num_levels {
            entry_levels += 1;
            d /= self.skip_interval;
        }

        let mut child_pointer = 0u64;
        for level in 0..entry_levels {
            write_entry(level, &mut self.buffers[level])?;
            let new_child_pointer = self.buffers[level].len() as u64;
            if level != 0 {
                // Points at the matching entry's trailer in the level below.
                varint::write_u64(&mut self.buffers[level], child_pointer)?;
            }
            child_pointer = new_child_pointer;
        }
        Ok(())
    }

    /// Flush the buffered levels, highest first, each non-empty upper
    /// level preceded by its byte length.
    pub(crate) fn write_to(&self, out: &mut dyn Write) -> Result<()> {
        for level in (1..self.num_levels).rev() {
            let buffer = &self.buffers[level];
            if !buffer.is_empty() {
                varint::write_u64(out, buffer.len() as u64)?;
                out.write_all(buffer)?;
            }
        }
        out.write_all(&self.buffers[0])?;
        Ok(())
    }
}

/// Builds the skip list for one term while its postings are written.
pub struct SepSkipWriter<F: IntStreamFactory> {
    buffers: SkipBuffers,
    index_options: IndexOptions,

    doc_bookmarks: Vec<OutputBookmarkOf<F>>,
    freq_bookmarks: Option<Vec<OutputBookmarkOf<F>>>,
    pos_bookmarks: Option<Vec<OutputBookmarkOf<F>>>,

    last_doc: Vec<u32>,
    last_payload_length: Vec<Option<u32>>,
    last_payload_pointer: Vec<u64>,

    cur_doc: u32,
    cur_store_payloads: bool,
    cur_payload_length: Option<u32>,
    cur_payload_pointer: u64,
}

impl<F: IntStreamFactory> SepSkipWriter<F> {
    pub fn new(
        skip_interval: u32,
        max_levels: u32,
        doc_count: u32,
        doc_out: &F::Output,
        freq_out: Option<&F::Output>,
        pos_out: Option<&F::Output>,
    ) -> Self {
        let buffers = SkipBuffers::new(skip_interval, max_levels, doc_count);
        let levels = buffers.num_levels();
        SepSkipWriter {
            buffers,
            index_options: IndexOptions::Docs,
            doc_bookmarks: (0..levels).map(|_| doc_out.index()).collect(),
            freq_bookmarks: freq_out.map(|out| (0..levels).map(|_| out.index()).collect()),
            pos_bookmarks: pos_out.map(|out| (0..levels).map(|_| out.index()).collect()),
            last_doc: vec![0; levels],
            last_payload_length: vec![None; levels],
            last_payload_pointer: vec![0; levels],
            cur_doc: 0,
            cur_store_payloads: false,
            cur_payload_length: None,
            cur_payload_pointer: 0,
        }
    }

    /// Set the index options of the field currently being written.
    pub fn set_index_options(&mut self, index_options: IndexOptions) {
        self.index_options = index_options;
    }

    /// Record the state the next buffered entry will capture: the last
    /// document written, the payload length in effect and the payload
    /// stream position.
    pub fn set_skip_data(
        &mut self,
        doc: u32,
        store_payloads: bool,
        payload_length: Option<u32>,
        payload_pointer: u64,
    ) {
        self.cur_doc = doc;
        self.cur_store_payloads = store_payloads;
        self.cur_payload_length = payload_length;
        self.cur_payload_pointer = payload_pointer;
    }

    /// Start a new term. The per-level delta bases are rewound to the
    /// term's stream start positions.
    pub fn reset_skip(
        &mut self,
        doc_base: &OutputBookmarkOf<F>,
        freq_base: Option<&OutputBookmarkOf<F>>,
        pos_base: Option<&OutputBookmarkOf<F>>,
        payload_pointer: u64,
    ) {
        self.buffers.reset();
        self.last_doc.fill(0);
        // None forces the first payload entry to carry its length.
        self.last_payload_length.fill(None);
        self.last_payload_pointer.fill(payload_pointer);

        for bookmark in &mut self.doc_bookmarks {
            bookmark.copy_from(doc_base, true);
        }
        if let (Some(bookmarks), Some(base)) = (self.freq_bookmarks.as_mut(), freq_base) {
            for bookmark in bookmarks {
                bookmark.copy_from(base, true);
            }
        }
        if let (Some(bookmarks), Some(base)) = (self.pos_bookmarks.as_mut(), pos_base) {
            for bookmark in bookmarks {
                bookmark.copy_from(base, true);
            }
        }
    }

    /// Buffer one skip entry after `df` documents of the current term.
    pub fn buffer_skip(
        &mut self,
        df: u32,
        doc_out: &F::Output,
        freq_out: Option<&F::Output>,
        pos_out: Option<&F::Output>,
    ) -> Result<()> {
        let Self {
            buffers,
            index_options,
            doc_bookmarks,
            freq_bookmarks,
            pos_bookmarks,
            last_doc,
            last_payload_length,
            last_payload_pointer,
            cur_doc,
            cur_store_payloads,
            cur_payload_length,
            cur_payload_pointer,
        } = self;

        buffers.buffer_skip(df, |level, buf| {
            if *cur_store_payloads {
                let delta = *cur_doc - last_doc[level];
                if *cur_payload_length == last_payload_length[level] {
                    varint::write_u32(buf, delta << 1)?;
                } else {
                    varint::write_u32(buf, (delta << 1) | 1)?;
                    varint::write_u32(buf, cur_payload_length.unwrap_or(0))?;
                    last_payload_length[level] = *cur_payload_length;
                }
            } else {
                varint::write_u32(buf, *cur_doc - last_doc[level])?;
            }

            if index_options.has_freqs()
                && let (Some(bookmarks), Some(out)) = (freq_bookmarks.as_mut(), freq_out)
            {
                bookmarks[level].mark(out)?;
                bookmarks[level].write(buf, false)?;
            }
            doc_bookmarks[level].mark(doc_out)?;
            doc_bookmarks[level].write(buf, false)?;
            if index_options.has_positions()
                && let (Some(bookmarks), Some(out)) = (pos_bookmarks.as_mut(), pos_out)
            {
                bookmarks[level].mark(out)?;
                bookmarks[level].write(buf, false)?;
                if *cur_store_payloads {
                    varint::write_u64(buf, *cur_payload_pointer - last_payload_pointer[level])?;
                }
            }

            last_doc[level] = *cur_doc;
            last_payload_pointer[level] = *cur_payload_pointer;
            Ok(())
        })
    }

    /// Flush the buffered skip list into the skip stream and return the
    /// offset it starts at.
    pub fn write_skip(&mut self, out: &mut dyn StorageOutput) -> Result<u64> {
        let skip_pointer = out.position()?;
        self.buffers.write_to(out)?;
        Ok(skip_pointer)
    }
}
