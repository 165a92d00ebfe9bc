//! Multi-level skip list reader.
//!
//! Mirrors [`SepSkipWriter`](crate::postings::SepSkipWriter). `skip_to`
//! starts at the highest useful level and walks entries until one reaches
//! past the target, then drops a level through the stored child pointer
//! and repeats. What remains is the state of the last entry at level 0
//! before the target: bookmark positions for the doc, freq and pos
//! streams, the payload offset and length, and how many documents the
//! caller may consider consumed.

use std::io::{Seek, SeekFrom};

use crate::error::{Result, SepIndexError};
use crate::int_stream::{InputBookmark, IntStreamFactory};
use crate::postings::{InputBookmarkOf, NO_MORE_DOCS, ilog};
use crate::schema::IndexOptions;
use crate::storage::StorageInput;
use crate::util::varint;

/// Navigates one term's skip list.
pub struct SepSkipReader<F: IntStreamFactory> {
    streams: Vec<Option<Box<dyn StorageInput>>>,
    skip_interval: Vec<u64>,
    max_levels: usize,
    num_levels: usize,
    doc_count: u32,
    have_skipped: bool,

    skip_pointer: Vec<u64>,
    skip_doc: Vec<u32>,
    num_skipped: Vec<u64>,
    child_pointer: Vec<u64>,

    last_doc: u32,
    last_child_pointer: u64,

    index_options: IndexOptions,
    stores_payloads: bool,

    doc_bookmarks: Vec<InputBookmarkOf<F>>,
    freq_bookmarks: Option<Vec<InputBookmarkOf<F>>>,
    pos_bookmarks: Option<Vec<InputBookmarkOf<F>>>,
    payload_pointer: Vec<u64>,
    payload_length: Vec<u32>,

    last_doc_bookmark: InputBookmarkOf<F>,
    last_freq_bookmark: Option<InputBookmarkOf<F>>,
    last_pos_bookmark: Option<InputBookmarkOf<F>>,
    last_payload_pointer: u64,
    last_payload_length: u32,
}

impl<F: IntStreamFactory> SepSkipReader<F> {
    /// Create a reader over a clone of the segment's skip stream. The
    /// bookmark arguments are unpositioned templates for the streams the
    /// segment actually has.
    pub fn new(
        stream: Box<dyn StorageInput>,
        skip_interval: u32,
        max_levels: u32,
        doc_template: InputBookmarkOf<F>,
        freq_template: Option<InputBookmarkOf<F>>,
        pos_template: Option<InputBookmarkOf<F>>,
    ) -> Self {
        let max_levels = max_levels as usize;
        let mut intervals = Vec::with_capacity(max_levels);
        let mut interval = skip_interval as u64;
        for _ in 0..max_levels {
            intervals.push(interval);
            interval *= skip_interval as u64;
        }

        let mut streams: Vec<Option<Box<dyn StorageInput>>> =
            (0..max_levels).map(|_| None).collect();
        streams[0] = Some(stream);

        SepSkipReader {
            streams,
            skip_interval: intervals,
            max_levels,
            num_levels: 0,
            doc_count: 0,
            have_skipped: false,
            skip_pointer: vec![0; max_levels],
            skip_doc: vec![0; max_levels],
            num_skipped: vec![0; max_levels],
            child_pointer: vec![0; max_levels],
            last_doc: 0,
            last_child_pointer: 0,
            index_options: IndexOptions::Docs,
            stores_payloads: false,
            doc_bookmarks: vec![doc_template.clone(); max_levels],
            freq_bookmarks: freq_template
                .as_ref()
                .map(|template| vec![template.clone(); max_levels]),
            pos_bookmarks: pos_template
                .as_ref()
                .map(|template| vec![template.clone(); max_levels]),
            payload_pointer: vec![0; max_levels],
            payload_length: vec![0; max_levels],
            last_doc_bookmark: doc_template,
            last_freq_bookmark: freq_template,
            last_pos_bookmark: pos_template,
            last_payload_pointer: 0,
            last_payload_length: 0,
        }
    }

    /// Point the reader at one term's skip data.
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        &mut self,
        skip_pointer: u64,
        doc_base: &InputBookmarkOf<F>,
        freq_base: Option<&InputBookmarkOf<F>>,
        pos_base: Option<&InputBookmarkOf<F>>,
        payload_base_pointer: u64,
        doc_freq: u32,
        stores_payloads: bool,
        index_options: IndexOptions,
    ) {
        debug_assert!(!stores_payloads || index_options.has_positions());

        self.skip_pointer[0] = skip_pointer;
        self.doc_count = doc_freq;
        self.skip_doc.fill(0);
        self.num_skipped.fill(0);
        self.child_pointer.fill(0);
        self.have_skipped = false;
        self.last_doc = 0;
        self.last_child_pointer = 0;
        for stream in self.streams.iter_mut().skip(1) {
            *stream = None;
        }

        self.index_options = index_options;
        self.stores_payloads = stores_payloads;
        self.last_payload_pointer = payload_base_pointer;
        self.last_payload_length = 0;
        self.payload_pointer.fill(payload_base_pointer);
        self.payload_length.fill(0);

        for bookmark in &mut self.doc_bookmarks {
            bookmark.copy_from(doc_base);
        }
        self.last_doc_bookmark.copy_from(doc_base);
        if let (Some(bookmarks), Some(base)) = (self.freq_bookmarks.as_mut(), freq_base) {
            for bookmark in bookmarks.iter_mut() {
                bookmark.copy_from(base);
            }
        }
        if let (Some(last), Some(base)) = (self.last_freq_bookmark.as_mut(), freq_base) {
            last.copy_from(base);
        }
        if let (Some(bookmarks), Some(base)) = (self.pos_bookmarks.as_mut(), pos_base) {
            for bookmark in bookmarks.iter_mut() {
                bookmark.copy_from(base);
            }
        }
        if let (Some(last), Some(base)) = (self.last_pos_bookmark.as_mut(), pos_base) {
            last.copy_from(base);
        }
    }

    /// Skip entries until the last one before `target`. Returns the
    /// number of the last document the caller may treat as consumed,
    /// which can be -1 when no entry precedes the target.
    pub fn skip_to(&mut self, target: u32) -> Result<i64> {
        if !self.have_skipped {
            self.load_skip_levels()?;
            self.have_skipped = true;
        }

        // Find the highest level with an entry still before the target.
        let mut level = 0;
        while level < self.num_levels.saturating_sub(1) && target > self.skip_doc[level + 1] {
            level += 1;
        }

        loop {
            if target > self.skip_doc[level] {
                if !self.load_next_skip(level)? {
                    continue;
                }
            } else {
                if level > 0 && self.last_child_pointer > self.stream_position(level - 1)? {
                    self.seek_child(level - 1)?;
                }
                if level == 0 {
                    break;
                }
                level -= 1;
            }
        }

        Ok(self.num_skipped[0] as i64 - self.skip_interval[0] as i64 - 1)
    }

    /// Document id of the last skip entry consumed.
    pub fn doc(&self) -> u32 {
        self.last_doc
    }

    /// Doc stream position of the last skip entry consumed.
    pub fn doc_index(&self) -> &InputBookmarkOf<F> {
        &self.last_doc_bookmark
    }

    /// Freq stream position of the last skip entry consumed.
    pub fn freq_index(&self) -> Option<&InputBookmarkOf<F>> {
        self.last_freq_bookmark.as_ref()
    }

    /// Position stream position of the last skip entry consumed.
    pub fn pos_index(&self) -> Option<&InputBookmarkOf<F>> {
        self.last_pos_bookmark.as_ref()
    }

    /// Payload stream offset of the last skip entry consumed.
    pub fn payload_pointer(&self) -> u64 {
        self.last_payload_pointer
    }

    /// Payload length in effect at the last skip entry consumed.
    pub fn payload_length(&self) -> u32 {
        self.last_payload_length
    }

    /// Split the serialized levels into per-level cursors. Upper levels
    /// come first, each prefixed by its byte length; the bytes after them
    /// belong to level 0.
    fn load_skip_levels(&mut self) -> Result<()> {
        self.num_levels = (ilog(self.doc_count, self.skip_interval[0] as u32) as usize)
            .clamp(1, self.max_levels);

        let mut base = self.take_stream(0)?;
        let result = (|| -> Result<()> {
            base.seek(SeekFrom::Start(self.skip_pointer[0]))?;
            for level in (1..self.num_levels).rev() {
                let length = varint::read_u64(&mut base)?;
                self.skip_pointer[level] = base.stream_position()?;
                let mut level_stream = base.clone_input()?;
                level_stream.seek(SeekFrom::Start(self.skip_pointer[level]))?;
                self.streams[level] = Some(level_stream);
                base.seek(SeekFrom::Current(length as i64))?;
            }
            self.skip_pointer[0] = base.stream_position()?;
            Ok(())
        })();
        self.streams[0] = Some(base);
        result
    }

    /// Advance one entry at `level`. Returns false once the level is
    /// exhausted for this term.
    fn load_next_skip(&mut self, level: usize) -> Result<bool> {
        // The state of the entry we are leaving becomes the result state.
        self.set_last_skip_data(level);

        self.num_skipped[level] += self.skip_interval[level];
        if self.num_skipped[level] > self.doc_count as u64 {
            self.skip_doc[level] = NO_MORE_DOCS;
            if self.num_levels > level {
                self.num_levels = level;
            }
            return Ok(false);
        }

        let delta = self.read_skip_data(level)?;
        self.skip_doc[level] += delta;
        if level != 0 {
            let mut stream = self.take_stream(level)?;
            let pointer = varint::read_u64(&mut stream);
            self.streams[level] = Some(stream);
            self.child_pointer[level] = pointer? + self.skip_pointer[level - 1];
        }
        Ok(true)
    }

    /// Reposition `level` at the child of the entry just consumed one
    /// level up.
    fn seek_child(&mut self, level: usize) -> Result<()> {
        let mut stream = self.take_stream(level)?;
        let result = (|| -> Result<()> {
            stream.seek(SeekFrom::Start(self.last_child_pointer))?;
            if level > 0 {
                let pointer = varint::read_u64(&mut stream)?;
                self.child_pointer[level] = pointer + self.skip_pointer[level - 1];
            }
            Ok(())
        })();
        self.streams[level] = Some(stream);
        result?;

        self.num_skipped[level] = self.num_skipped[level + 1] - self.skip_interval[level + 1];
        self.skip_doc[level] = self.last_doc;
        if let Some(bookmarks) = self.freq_bookmarks.as_mut()
            && let Some(last) = self.last_freq_bookmark.as_ref()
        {
            bookmarks[level].copy_from(last);
        }
        self.doc_bookmarks[level].copy_from(&self.last_doc_bookmark);
        if let Some(bookmarks) = self.pos_bookmarks.as_mut()
            && let Some(last) = self.last_pos_bookmark.as_ref()
        {
            bookmarks[level].copy_from(last);
        }
        self.payload_pointer[level] = self.last_payload_pointer;
        self.payload_length[level] = self.last_payload_length;
        Ok(())
    }

    /// Capture the state at `level` as the result state and push it down
    /// one level, where the walk will resume.
    fn set_last_skip_data(&mut self, level: usize) {
        self.last_doc = self.skip_doc[level];
        self.last_child_pointer = self.child_pointer[level];
        self.last_payload_pointer = self.payload_pointer[level];
        self.last_payload_length = self.payload_length[level];

        self.last_doc_bookmark.copy_from(&self.doc_bookmarks[level]);
        if let (Some(last), Some(bookmarks)) =
            (self.last_freq_bookmark.as_mut(), self.freq_bookmarks.as_ref())
        {
            last.copy_from(&bookmarks[level]);
        }
        if let (Some(last), Some(bookmarks)) =
            (self.last_pos_bookmark.as_mut(), self.pos_bookmarks.as_ref())
        {
            last.copy_from(&bookmarks[level]);
        }

        if level > 0 {
            if let Some(bookmarks) = self.freq_bookmarks.as_mut() {
                let source = bookmarks[level].clone();
                bookmarks[level - 1].copy_from(&source);
            }
            let source = self.doc_bookmarks[level].clone();
            self.doc_bookmarks[level - 1].copy_from(&source);
            if let Some(bookmarks) = self.pos_bookmarks.as_mut() {
                let source = bookmarks[level].clone();
                bookmarks[level - 1].copy_from(&source);
            }
            self.payload_pointer[level - 1] = self.payload_pointer[level];
            self.payload_length[level - 1] = self.payload_length[level];
        }
    }

    /// Decode one skip entry at `level` and return its doc delta.
    fn read_skip_data(&mut self, level: usize) -> Result<u32> {
        let mut stream = self.take_stream(level)?;
        let result = self.read_skip_entry(level, &mut stream);
        self.streams[level] = Some(stream);
        result
    }

    fn read_skip_entry(
        &mut self,
        level: usize,
        stream: &mut Box<dyn StorageInput>,
    ) -> Result<u32> {
        let delta = if self.stores_payloads {
            let code = varint::read_u32(stream)?;
            if code & 1 != 0 {
                self.payload_length[level] = varint::read_u32(stream)?;
            }
            code >> 1
        } else {
            varint::read_u32(stream)?
        };

        if self.index_options.has_freqs()
            && let Some(bookmarks) = self.freq_bookmarks.as_mut()
        {
            bookmarks[level].read(&mut **stream, false)?;
        }
        self.doc_bookmarks[level].read(&mut **stream, false)?;
        if self.index_options.has_positions()
            && let Some(bookmarks) = self.pos_bookmarks.as_mut()
        {
            bookmarks[level].read(&mut **stream, false)?;
            if self.stores_payloads {
                self.payload_pointer[level] += varint::read_u64(stream)?;
            }
        }
        Ok(delta)
    }

    fn stream_position(&mut self, level: usize) -> Result<u64> {
        match self.streams[level].as_mut() {
            Some(stream) => Ok(stream.stream_position()?),
            None => Err(SepIndexError::corruption("skip level stream not loaded")),
        }
    }

    fn take_stream(&mut self, level: usize) -> Result<Box<dyn StorageInput>> {
        self.streams[level]
            .take()
            .ok_or_else(|| SepIndexError::corruption("skip level stream not loaded"))
    }
}
