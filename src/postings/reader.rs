//! Postings reader.
//!
//! Opens the streams written by [`SepPostingsWriter`] and hands out
//! per-term enumerators. The reader itself is immutable after `init` and
//! can be shared across threads; every enumerator owns cloned cursors
//! over the underlying streams, so enumerators never contend.

use std::io::{Read, Seek, SeekFrom};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use bit_vec::BitVec;

use crate::error::{Result, SepIndexError};
use crate::int_stream::{InputBookmark, IntIndexInput, IntReader, IntStreamFactory};
use crate::postings::{
    CODEC, DEFAULT_SKIP_INTERVAL, DOC_EXTENSION, FREQ_EXTENSION, InputBookmarkOf, IntReaderOf,
    MAX_SKIP_LEVELS, NO_MORE_DOCS, PAYLOAD_EXTENSION, POS_EXTENSION, SKIP_EXTENSION, SegmentState,
    SepSkipReader, VERSION_CURRENT, file_name,
};
use crate::schema::FieldInfo;
use crate::storage::{Storage, StorageInput};
use crate::util::{header, varint};

/// Where one term lives in every stream, on the reading side.
///
/// Created unpositioned by [`SepPostingsReader::new_term_state`]; the
/// caller sets `doc_freq` before each `decode_term` call, because the
/// presence of a skip offset in the encoded form depends on it.
pub struct SepTermState<F: IntStreamFactory> {
    /// Number of documents the term occurs in.
    pub doc_freq: u32,
    doc_bookmark: InputBookmarkOf<F>,
    freq_bookmark: Option<InputBookmarkOf<F>>,
    pos_bookmark: Option<InputBookmarkOf<F>>,
    payload_fp: u64,
    skip_fp: u64,
}

impl<F: IntStreamFactory> Clone for SepTermState<F> {
    fn clone(&self) -> Self {
        SepTermState {
            doc_freq: self.doc_freq,
            doc_bookmark: self.doc_bookmark.clone(),
            freq_bookmark: self.freq_bookmark.clone(),
            pos_bookmark: self.pos_bookmark.clone(),
            payload_fp: self.payload_fp,
            skip_fp: self.skip_fp,
        }
    }
}

static NEXT_SESSION: AtomicU64 = AtomicU64::new(1);

/// Reads postings for one segment.
pub struct SepPostingsReader<F: IntStreamFactory> {
    doc_in: F::Input,
    freq_in: Option<F::Input>,
    pos_in: Option<F::Input>,
    payload_in: Option<Box<dyn StorageInput>>,
    skip_in: Box<dyn StorageInput>,

    skip_interval: u32,
    max_skip_levels: u32,
    skip_minimum: u32,

    // Enumerators remember which reader built them; reuse across readers
    // would seek cursors over the wrong streams.
    session: u64,
}

impl<F: IntStreamFactory> SepPostingsReader<F> {
    /// Open the segment's stream files, mirroring what the writer
    /// created for these segment flags.
    pub fn open(storage: &dyn Storage, factory: &F, segment: &SegmentState) -> Result<Self> {
        let doc_in = factory.open_input(
            storage,
            &file_name(&segment.segment, &segment.suffix, DOC_EXTENSION),
        )?;
        let freq_in = if segment.has_freqs {
            Some(factory.open_input(
                storage,
                &file_name(&segment.segment, &segment.suffix, FREQ_EXTENSION),
            )?)
        } else {
            None
        };
        let (pos_in, payload_in) = if segment.has_positions {
            let pos = factory.open_input(
                storage,
                &file_name(&segment.segment, &segment.suffix, POS_EXTENSION),
            )?;
            let mut payload = storage.open_input(&file_name(
                &segment.segment,
                &segment.suffix,
                PAYLOAD_EXTENSION,
            ))?;
            header::check_header(&mut payload, CODEC, VERSION_CURRENT)?;
            (Some(pos), Some(payload))
        } else {
            (None, None)
        };
        let mut skip_in = storage.open_input(&file_name(
            &segment.segment,
            &segment.suffix,
            SKIP_EXTENSION,
        ))?;
        header::check_header(&mut skip_in, CODEC, VERSION_CURRENT)?;

        Ok(SepPostingsReader {
            doc_in,
            freq_in,
            pos_in,
            payload_in,
            skip_in,
            skip_interval: DEFAULT_SKIP_INTERVAL,
            max_skip_levels: MAX_SKIP_LEVELS,
            skip_minimum: DEFAULT_SKIP_INTERVAL,
            session: NEXT_SESSION.fetch_add(1, Ordering::Relaxed),
        })
    }

    /// Validate the term metadata header written by the writer's `init`
    /// and adopt its skip constants.
    pub fn init(&mut self, terms_in: &mut dyn Read) -> Result<()> {
        header::check_header(terms_in, CODEC, VERSION_CURRENT)?;
        self.skip_interval = varint::read_u32(terms_in)?;
        self.max_skip_levels = varint::read_u32(terms_in)?;
        self.skip_minimum = varint::read_u32(terms_in)?;
        if self.skip_interval < 2 || self.max_skip_levels == 0 {
            return Err(SepIndexError::corruption(format!(
                "invalid skip constants: interval={}, levels={}",
                self.skip_interval, self.max_skip_levels
            )));
        }
        Ok(())
    }

    /// Create an unpositioned term state for this segment's streams.
    pub fn new_term_state(&self) -> SepTermState<F> {
        SepTermState {
            doc_freq: 0,
            doc_bookmark: self.doc_in.index(),
            freq_bookmark: self.freq_in.as_ref().map(|input| input.index()),
            pos_bookmark: self.pos_in.as_ref().map(|input| input.index()),
            payload_fp: 0,
            skip_fp: 0,
        }
    }

    /// Decode one term's stream positions, mirroring the writer's
    /// `encode_term`. `state.doc_freq` must already hold the term's
    /// document frequency.
    pub fn decode_term(
        &self,
        source: &mut dyn Read,
        field: &FieldInfo,
        state: &mut SepTermState<F>,
        absolute: bool,
    ) -> Result<()> {
        state.doc_bookmark.read(source, absolute)?;
        if field.index_options.has_freqs() {
            state
                .freq_bookmark
                .as_mut()
                .ok_or_else(|| frequency_stream_missing(&field.name))?
                .read(source, absolute)?;
            if field.index_options.has_positions() {
                state
                    .pos_bookmark
                    .as_mut()
                    .ok_or_else(|| position_stream_missing(&field.name))?
                    .read(source, absolute)?;
                if field.store_payloads {
                    if absolute {
                        state.payload_fp = varint::read_u64(source)?;
                    } else {
                        state.payload_fp += varint::read_u64(source)?;
                    }
                }
            }
        }
        if state.doc_freq >= self.skip_minimum {
            if absolute {
                state.skip_fp = varint::read_u64(source)?;
            } else {
                state.skip_fp += varint::read_u64(source)?;
            }
        } else if absolute {
            state.skip_fp = 0;
        }
        Ok(())
    }

    /// Return a document enumerator over one term. A compatible `reuse`
    /// enumerator is recycled instead of allocating new cursors.
    pub fn docs(
        &self,
        field: &FieldInfo,
        state: &SepTermState<F>,
        live_docs: Option<Arc<BitVec>>,
        reuse: Option<SepDocsEnum<F>>,
    ) -> Result<SepDocsEnum<F>> {
        let mut docs_enum = match reuse {
            Some(existing) if existing.session == self.session => existing,
            _ => self.make_docs_enum()?,
        };
        docs_enum.init(field, state, live_docs)?;
        Ok(docs_enum)
    }

    /// Return a document-and-positions enumerator over one term. The
    /// field must index positions.
    pub fn docs_and_positions(
        &self,
        field: &FieldInfo,
        state: &SepTermState<F>,
        live_docs: Option<Arc<BitVec>>,
        reuse: Option<SepDocsAndPositionsEnum<F>>,
    ) -> Result<SepDocsAndPositionsEnum<F>> {
        if !field.index_options.has_positions() {
            return Err(SepIndexError::invalid_argument(format!(
                "field '{}' does not index positions",
                field.name
            )));
        }
        let mut positions_enum = match reuse {
            Some(existing) if existing.session == self.session => existing,
            _ => self.make_positions_enum()?,
        };
        positions_enum.init(field, state, live_docs)?;
        Ok(positions_enum)
    }

    /// This codec stores no per-file checksums, so there is nothing to
    /// verify; always succeeds.
    pub fn check_integrity(&self) -> Result<()> {
        Ok(())
    }

    /// Close every stream. All are attempted; the first error wins.
    pub fn close(&mut self) -> Result<()> {
        let mut first_error = None;
        let mut note = |result: Result<()>| {
            if let Err(err) = result
                && first_error.is_none()
            {
                first_error = Some(err);
            }
        };

        note(self.doc_in.close());
        if let Some(input) = self.freq_in.as_mut() {
            note(input.close());
        }
        if let Some(input) = self.pos_in.as_mut() {
            note(input.close());
        }
        if let Some(input) = self.payload_in.as_mut() {
            note(input.close());
        }
        note(self.skip_in.close());

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn make_docs_enum(&self) -> Result<SepDocsEnum<F>> {
        Ok(SepDocsEnum {
            session: self.session,
            skip_interval: self.skip_interval,
            max_skip_levels: self.max_skip_levels,
            skip_minimum: self.skip_minimum,
            doc_reader: self.doc_in.reader()?,
            freq_reader: match self.freq_in.as_ref() {
                Some(input) => Some(input.reader()?),
                None => None,
            },
            doc_bookmark: self.doc_in.index(),
            freq_bookmark: self.freq_in.as_ref().map(|input| input.index()),
            // Never seeked by this enumerator, but the skipper needs it
            // to parse positional skip entries.
            pos_bookmark: self.pos_in.as_ref().map(|input| input.index()),
            skip_stream: Some(self.skip_in.clone_input()?),
            skipper: None,
            skipped: false,
            live_docs: None,
            omit_freqs: true,
            store_payloads: false,
            has_positions: false,
            doc_freq: 0,
            skip_fp: 0,
            count: 0,
            doc: -1,
            accum: 0,
            freq: 1,
        })
    }

    fn make_positions_enum(&self) -> Result<SepDocsAndPositionsEnum<F>> {
        let freq_in = self
            .freq_in
            .as_ref()
            .ok_or_else(|| frequency_stream_missing("segment"))?;
        let pos_in = self
            .pos_in
            .as_ref()
            .ok_or_else(|| position_stream_missing("segment"))?;
        let payload_in = self
            .payload_in
            .as_ref()
            .ok_or_else(|| SepIndexError::invalid_argument("segment has no payload stream"))?;

        Ok(SepDocsAndPositionsEnum {
            session: self.session,
            skip_interval: self.skip_interval,
            max_skip_levels: self.max_skip_levels,
            skip_minimum: self.skip_minimum,
            doc_reader: self.doc_in.reader()?,
            freq_reader: freq_in.reader()?,
            pos_reader: pos_in.reader()?,
            payload_in: payload_in.clone_input()?,
            doc_bookmark: self.doc_in.index(),
            freq_bookmark: freq_in.index(),
            pos_bookmark: pos_in.index(),
            skip_stream: Some(self.skip_in.clone_input()?),
            skipper: None,
            skipped: false,
            live_docs: None,
            store_payloads: false,
            doc_freq: 0,
            skip_fp: 0,
            payload_fp: 0,
            count: 0,
            doc: -1,
            accum: 0,
            freq: 1,
            position: 0,
            payload_length: 0,
            pending_pos_count: 0,
            pending_payload_bytes: 0,
            payload_pending: false,
            pos_seek_pending: true,
        })
    }
}

fn frequency_stream_missing(name: &str) -> SepIndexError {
    SepIndexError::invalid_argument(format!("'{name}': frequency stream missing"))
}

fn position_stream_missing(name: &str) -> SepIndexError {
    SepIndexError::invalid_argument(format!("'{name}': position stream missing"))
}

/// Iterates the documents of one term.
pub struct SepDocsEnum<F: IntStreamFactory> {
    session: u64,
    skip_interval: u32,
    max_skip_levels: u32,
    skip_minimum: u32,

    doc_reader: IntReaderOf<F>,
    freq_reader: Option<IntReaderOf<F>>,

    // Term-start positions, the skipper's delta bases.
    doc_bookmark: InputBookmarkOf<F>,
    freq_bookmark: Option<InputBookmarkOf<F>>,
    pos_bookmark: Option<InputBookmarkOf<F>>,

    skip_stream: Option<Box<dyn StorageInput>>,
    skipper: Option<SepSkipReader<F>>,
    skipped: bool,

    live_docs: Option<Arc<BitVec>>,
    omit_freqs: bool,
    store_payloads: bool,
    has_positions: bool,

    doc_freq: u32,
    skip_fp: u64,
    count: i64,
    doc: i64,
    accum: u32,
    freq: u32,
}

impl<F: IntStreamFactory> SepDocsEnum<F> {
    fn init(
        &mut self,
        field: &FieldInfo,
        state: &SepTermState<F>,
        live_docs: Option<Arc<BitVec>>,
    ) -> Result<()> {
        self.live_docs = live_docs;
        self.omit_freqs = !field.index_options.has_freqs();
        self.has_positions = field.index_options.has_positions();
        self.store_payloads = field.store_payloads && self.has_positions;

        self.doc_bookmark.copy_from(&state.doc_bookmark);
        self.doc_bookmark.seek(&mut self.doc_reader)?;
        if !self.omit_freqs {
            let bookmark = self
                .freq_bookmark
                .as_mut()
                .ok_or_else(|| frequency_stream_missing(&field.name))?;
            bookmark.copy_from(
                state
                    .freq_bookmark
                    .as_ref()
                    .ok_or_else(|| frequency_stream_missing(&field.name))?,
            );
            let reader = self
                .freq_reader
                .as_mut()
                .ok_or_else(|| frequency_stream_missing(&field.name))?;
            bookmark.seek(reader)?;
        }
        if let (Some(bookmark), Some(source)) =
            (self.pos_bookmark.as_mut(), state.pos_bookmark.as_ref())
        {
            bookmark.copy_from(source);
        }

        self.doc_freq = state.doc_freq;
        self.skip_fp = state.skip_fp;
        self.count = 0;
        self.doc = -1;
        self.accum = 0;
        self.freq = 1;
        self.skipped = false;
        Ok(())
    }

    /// Frequency of the term in the current document; 1 when the field
    /// omits frequencies.
    pub fn freq(&self) -> u32 {
        self.freq
    }

    /// Advance to the next live document, or [`NO_MORE_DOCS`].
    pub fn next_doc(&mut self) -> Result<u32> {
        loop {
            if self.count == self.doc_freq as i64 {
                self.doc = NO_MORE_DOCS as i64;
                return Ok(NO_MORE_DOCS);
            }
            self.count += 1;
            self.accum += self.doc_reader.next()?;
            if !self.omit_freqs {
                self.freq = self
                    .freq_reader
                    .as_mut()
                    .ok_or_else(|| frequency_stream_missing("enum"))?
                    .next()?;
            }

            if is_live(self.live_docs.as_deref(), self.accum) {
                break;
            }
        }
        self.doc = self.accum as i64;
        Ok(self.accum)
    }

    /// Advance to the first live document at or past `target`, using
    /// skip data when the jump is big enough to pay for it.
    pub fn advance(&mut self, target: u32) -> Result<u32> {
        if target as i64 - self.skip_interval as i64 >= self.doc
            && self.doc_freq >= self.skip_minimum
        {
            if self.skipper.is_none() {
                let stream = self
                    .skip_stream
                    .take()
                    .ok_or_else(|| SepIndexError::invalid_argument("skip stream already taken"))?;
                self.skipper = Some(SepSkipReader::new(
                    stream,
                    self.skip_interval,
                    self.max_skip_levels,
                    self.doc_bookmark.clone(),
                    self.freq_bookmark.clone(),
                    self.pos_bookmark.clone(),
                ));
            }
            if let Some(skipper) = self.skipper.as_mut() {
                if !self.skipped {
                    skipper.init(
                        self.skip_fp,
                        &self.doc_bookmark,
                        self.freq_bookmark.as_ref(),
                        self.pos_bookmark.as_ref(),
                        0,
                        self.doc_freq,
                        self.store_payloads,
                        index_options_for(self.omit_freqs, self.has_positions),
                    );
                    self.skipped = true;
                }

                let new_count = skipper.skip_to(target)?;
                if new_count > self.count {
                    if !self.omit_freqs
                        && let (Some(bookmark), Some(reader)) =
                            (skipper.freq_index(), self.freq_reader.as_mut())
                    {
                        bookmark.seek(reader)?;
                    }
                    skipper.doc_index().seek(&mut self.doc_reader)?;
                    self.count = new_count;
                    self.accum = skipper.doc();
                    self.doc = self.accum as i64;
                }
            }
        }

        loop {
            let doc = self.next_doc()?;
            if doc == NO_MORE_DOCS || doc >= target {
                return Ok(doc);
            }
        }
    }
}

/// Iterates the documents and positions of one term.
pub struct SepDocsAndPositionsEnum<F: IntStreamFactory> {
    session: u64,
    skip_interval: u32,
    max_skip_levels: u32,
    skip_minimum: u32,

    doc_reader: IntReaderOf<F>,
    freq_reader: IntReaderOf<F>,
    pos_reader: IntReaderOf<F>,
    payload_in: Box<dyn StorageInput>,

    doc_bookmark: InputBookmarkOf<F>,
    freq_bookmark: InputBookmarkOf<F>,
    pos_bookmark: InputBookmarkOf<F>,

    skip_stream: Option<Box<dyn StorageInput>>,
    skipper: Option<SepSkipReader<F>>,
    skipped: bool,

    live_docs: Option<Arc<BitVec>>,
    store_payloads: bool,

    doc_freq: u32,
    skip_fp: u64,
    payload_fp: u64,
    count: i64,
    doc: i64,
    accum: u32,
    freq: u32,

    position: u32,
    payload_length: u32,
    pending_pos_count: u64,
    pending_payload_bytes: u64,
    payload_pending: bool,
    // The position cursor trails the document cursor; it is only seeked
    // when positions are actually asked for.
    pos_seek_pending: bool,
}

impl<F: IntStreamFactory> SepDocsAndPositionsEnum<F> {
    fn init(
        &mut self,
        field: &FieldInfo,
        state: &SepTermState<F>,
        live_docs: Option<Arc<BitVec>>,
    ) -> Result<()> {
        self.live_docs = live_docs;
        self.store_payloads = field.store_payloads;

        self.doc_bookmark.copy_from(&state.doc_bookmark);
        self.doc_bookmark.seek(&mut self.doc_reader)?;
        self.freq_bookmark.copy_from(
            state
                .freq_bookmark
                .as_ref()
                .ok_or_else(|| frequency_stream_missing(&field.name))?,
        );
        self.freq_bookmark.seek(&mut self.freq_reader)?;
        self.pos_bookmark.copy_from(
            state
                .pos_bookmark
                .as_ref()
                .ok_or_else(|| position_stream_missing(&field.name))?,
        );
        self.pos_seek_pending = true;
        self.payload_pending = false;

        self.payload_fp = state.payload_fp;
        self.skip_fp = state.skip_fp;
        self.doc_freq = state.doc_freq;
        self.count = 0;
        self.doc = -1;
        self.accum = 0;
        self.freq = 1;
        self.position = 0;
        self.payload_length = 0;
        self.pending_pos_count = 0;
        self.pending_payload_bytes = 0;
        self.skipped = false;
        Ok(())
    }

    /// Frequency of the term in the current document.
    pub fn freq(&self) -> u32 {
        self.freq
    }

    /// Advance to the next live document, or [`NO_MORE_DOCS`].
    pub fn next_doc(&mut self) -> Result<u32> {
        loop {
            if self.count == self.doc_freq as i64 {
                self.doc = NO_MORE_DOCS as i64;
                return Ok(NO_MORE_DOCS);
            }
            self.count += 1;
            self.accum += self.doc_reader.next()?;
            self.freq = self.freq_reader.next()?;
            // Positions of skipped-over documents are consumed lazily by
            // next_position.
            self.pending_pos_count += self.freq as u64;

            if is_live(self.live_docs.as_deref(), self.accum) {
                break;
            }
        }
        self.position = 0;
        self.doc = self.accum as i64;
        Ok(self.accum)
    }

    /// Advance to the first live document at or past `target`.
    pub fn advance(&mut self, target: u32) -> Result<u32> {
        if target as i64 - self.skip_interval as i64 >= self.doc
            && self.doc_freq >= self.skip_minimum
        {
            if self.skipper.is_none() {
                let stream = self
                    .skip_stream
                    .take()
                    .ok_or_else(|| SepIndexError::invalid_argument("skip stream already taken"))?;
                self.skipper = Some(SepSkipReader::new(
                    stream,
                    self.skip_interval,
                    self.max_skip_levels,
                    self.doc_bookmark.clone(),
                    Some(self.freq_bookmark.clone()),
                    Some(self.pos_bookmark.clone()),
                ));
            }
            if let Some(skipper) = self.skipper.as_mut() {
                if !self.skipped {
                    skipper.init(
                        self.skip_fp,
                        &self.doc_bookmark,
                        Some(&self.freq_bookmark),
                        Some(&self.pos_bookmark),
                        self.payload_fp,
                        self.doc_freq,
                        self.store_payloads,
                        crate::schema::IndexOptions::DocsAndFreqsAndPositions,
                    );
                    self.skipped = true;
                }

                let new_count = skipper.skip_to(target)?;
                if new_count > self.count {
                    if let Some(bookmark) = skipper.freq_index() {
                        bookmark.seek(&mut self.freq_reader)?;
                    }
                    skipper.doc_index().seek(&mut self.doc_reader)?;
                    // Positions are not seeked here; a caller skipping
                    // through many documents may never ask for them.
                    if let Some(bookmark) = skipper.pos_index() {
                        self.pos_bookmark.copy_from(bookmark);
                    }
                    self.pos_seek_pending = true;
                    self.count = new_count;
                    self.accum = skipper.doc();
                    self.doc = self.accum as i64;

                    self.payload_fp = skipper.payload_pointer();
                    self.payload_length = skipper.payload_length();
                    self.pending_pos_count = 0;
                    self.pending_payload_bytes = 0;
                    self.payload_pending = false;
                }
            }
        }

        loop {
            let doc = self.next_doc()?;
            if doc == NO_MORE_DOCS || doc >= target {
                return Ok(doc);
            }
        }
    }

    /// Next position of the term in the current document. Must be called
    /// at most `freq()` times per document.
    pub fn next_position(&mut self) -> Result<u32> {
        if self.pos_seek_pending {
            self.pos_bookmark.seek(&mut self.pos_reader)?;
            self.payload_in.seek(SeekFrom::Start(self.payload_fp))?;
            self.pos_seek_pending = false;
        }

        // Catch up over positions of documents that were iterated past
        // without reading their positions.
        while self.pending_pos_count > self.freq as u64 {
            let code = self.pos_reader.next()?;
            if self.store_payloads && (code & 1) != 0 {
                self.payload_length = self.pos_reader.next()?;
            }
            self.pending_pos_count -= 1;
            self.position = 0;
            self.pending_payload_bytes += self.payload_length as u64;
        }

        if self.pending_pos_count == 0 {
            return Err(SepIndexError::invalid_argument(
                "next_position called more than freq() times",
            ));
        }

        let code = self.pos_reader.next()?;
        if self.store_payloads {
            if (code & 1) != 0 {
                self.payload_length = self.pos_reader.next()?;
            }
            self.position += code >> 1;
            self.pending_payload_bytes += self.payload_length as u64;
            self.payload_pending = self.payload_length > 0;
        } else {
            self.position += code;
        }
        self.pending_pos_count -= 1;
        Ok(self.position)
    }

    /// Payload of the current position, or `None` when the position has
    /// none. Consumes the payload; a second call returns `None`.
    pub fn payload(&mut self) -> Result<Option<Vec<u8>>> {
        if !self.payload_pending || self.pending_payload_bytes == 0 {
            return Ok(None);
        }

        // Skip over payload bytes of positions that were never asked for.
        let length = self.payload_length as u64;
        if self.pending_payload_bytes > length {
            self.payload_in
                .seek(SeekFrom::Current((self.pending_payload_bytes - length) as i64))?;
        }

        let mut bytes = vec![0u8; self.payload_length as usize];
        self.payload_in.read_exact(&mut bytes)?;
        self.pending_payload_bytes = 0;
        Ok(Some(bytes))
    }
}

fn is_live(live_docs: Option<&BitVec>, doc: u32) -> bool {
    match live_docs {
        Some(bits) => bits.get(doc as usize).unwrap_or(true),
        None => true,
    }
}

fn index_options_for(omit_freqs: bool, has_positions: bool) -> crate::schema::IndexOptions {
    use crate::schema::IndexOptions;
    if has_positions {
        IndexOptions::DocsAndFreqsAndPositions
    } else if omit_freqs {
        IndexOptions::Docs
    } else {
        IndexOptions::DocsAndFreqs
    }
}
