//! Postings writer.
//!
//! Writes one segment's postings into separate streams: document deltas,
//! frequencies and position deltas through the integer stream abstraction,
//! payload bytes and skip data as raw byte streams. Calls follow a strict
//! order per term: `start_term`, then for each document `start_doc`
//! followed by its `add_position`/`finish_doc` calls, then `finish_term`
//! and `encode_term`.

use std::io::Write;

use crate::error::{Result, SepIndexError};
use crate::int_stream::{IntIndexOutput, IntStreamFactory, OutputBookmark};
use crate::postings::{
    CODEC, DOC_EXTENSION, FREQ_EXTENSION, MAX_SKIP_LEVELS, OutputBookmarkOf, PAYLOAD_EXTENSION,
    POS_EXTENSION, SKIP_EXTENSION, SegmentState, SepSkipWriter, VERSION_CURRENT, file_name,
};
use crate::schema::{FieldInfo, IndexOptions};
use crate::storage::{Storage, StorageOutput};
use crate::util::{header, varint};

/// Where one finished term lives in every stream.
///
/// Produced by [`SepPostingsWriter::finish_term`] and serialized by
/// [`SepPostingsWriter::encode_term`]. Plain value; holding one never
/// pins writer state.
pub struct SepTermWriteState<F: IntStreamFactory> {
    doc_bookmark: OutputBookmarkOf<F>,
    freq_bookmark: Option<OutputBookmarkOf<F>>,
    pos_bookmark: Option<OutputBookmarkOf<F>>,
    payload_fp: u64,
    skip_fp: Option<u64>,
}

impl<F: IntStreamFactory> SepTermWriteState<F> {
    /// Whether the term wrote skip data.
    pub fn has_skip_data(&self) -> bool {
        self.skip_fp.is_some()
    }
}

impl<F: IntStreamFactory> Clone for SepTermWriteState<F> {
    fn clone(&self) -> Self {
        SepTermWriteState {
            doc_bookmark: self.doc_bookmark.clone(),
            freq_bookmark: self.freq_bookmark.clone(),
            pos_bookmark: self.pos_bookmark.clone(),
            payload_fp: self.payload_fp,
            skip_fp: self.skip_fp,
        }
    }
}

/// Writes postings for one segment.
pub struct SepPostingsWriter<F: IntStreamFactory> {
    doc_out: F::Output,
    freq_out: Option<F::Output>,
    pos_out: Option<F::Output>,
    payload_out: Option<Box<dyn StorageOutput>>,
    skip_out: Box<dyn StorageOutput>,

    // Term-start positions, marked by start_term.
    doc_bookmark: OutputBookmarkOf<F>,
    freq_bookmark: Option<OutputBookmarkOf<F>>,
    pos_bookmark: Option<OutputBookmarkOf<F>>,

    skip_writer: SepSkipWriter<F>,
    skip_interval: u32,
    skip_minimum: u32,

    index_options: IndexOptions,
    store_payloads: bool,

    df: u32,
    last_doc_id: u32,
    last_position: u32,
    last_payload_length: Option<u32>,
    payload_start: u64,

    // Delta bases for encode_term.
    enc_doc_bookmark: OutputBookmarkOf<F>,
    enc_freq_bookmark: Option<OutputBookmarkOf<F>>,
    enc_pos_bookmark: Option<OutputBookmarkOf<F>>,
    last_payload_fp: u64,
    last_skip_fp: u64,
}

impl<F: IntStreamFactory> SepPostingsWriter<F> {
    /// Create the segment's stream files. The frequency stream is only
    /// created when the segment indexes frequencies, the position and
    /// payload streams only when it indexes positions.
    pub fn new(
        storage: &dyn Storage,
        factory: &F,
        segment: &SegmentState,
        skip_interval: u32,
    ) -> Result<Self> {
        if skip_interval < 2 {
            return Err(SepIndexError::invalid_argument(format!(
                "skip interval must be at least 2, got {skip_interval}"
            )));
        }

        let doc_out = factory.create_output(
            storage,
            &file_name(&segment.segment, &segment.suffix, DOC_EXTENSION),
        )?;
        let freq_out = if segment.has_freqs {
            Some(factory.create_output(
                storage,
                &file_name(&segment.segment, &segment.suffix, FREQ_EXTENSION),
            )?)
        } else {
            None
        };
        let (pos_out, payload_out) = if segment.has_positions {
            let pos = factory.create_output(
                storage,
                &file_name(&segment.segment, &segment.suffix, POS_EXTENSION),
            )?;
            let mut payload = storage.create_output(&file_name(
                &segment.segment,
                &segment.suffix,
                PAYLOAD_EXTENSION,
            ))?;
            header::write_header(&mut payload, CODEC, VERSION_CURRENT)?;
            (Some(pos), Some(payload))
        } else {
            (None, None)
        };
        let mut skip_out = storage.create_output(&file_name(
            &segment.segment,
            &segment.suffix,
            SKIP_EXTENSION,
        ))?;
        header::write_header(&mut skip_out, CODEC, VERSION_CURRENT)?;

        let skip_writer = SepSkipWriter::new(
            skip_interval,
            MAX_SKIP_LEVELS,
            segment.doc_count,
            &doc_out,
            freq_out.as_ref(),
            pos_out.as_ref(),
        );

        let doc_bookmark = doc_out.index();
        let freq_bookmark = freq_out.as_ref().map(|out| out.index());
        let pos_bookmark = pos_out.as_ref().map(|out| out.index());
        let enc_doc_bookmark = doc_out.index();
        let enc_freq_bookmark = freq_out.as_ref().map(|out| out.index());
        let enc_pos_bookmark = pos_out.as_ref().map(|out| out.index());

        Ok(SepPostingsWriter {
            doc_out,
            freq_out,
            pos_out,
            payload_out,
            skip_out,
            doc_bookmark,
            freq_bookmark,
            pos_bookmark,
            skip_writer,
            skip_interval,
            skip_minimum: skip_interval,
            index_options: IndexOptions::Docs,
            store_payloads: false,
            df: 0,
            last_doc_id: 0,
            last_position: 0,
            last_payload_length: None,
            payload_start: 0,
            enc_doc_bookmark,
            enc_freq_bookmark,
            enc_pos_bookmark,
            last_payload_fp: 0,
            last_skip_fp: 0,
        })
    }

    /// Write the codec header and skip constants into the term metadata
    /// stream. The reader validates these before decoding any term.
    pub fn init(&self, terms_out: &mut dyn Write) -> Result<()> {
        header::write_header(terms_out, CODEC, VERSION_CURRENT)?;
        varint::write_u32(terms_out, self.skip_interval)?;
        varint::write_u32(terms_out, MAX_SKIP_LEVELS)?;
        varint::write_u32(terms_out, self.skip_minimum)?;
        Ok(())
    }

    /// Switch to a field. Also resets the term encoding delta context, so
    /// the first term after this call must be encoded absolute.
    pub fn set_field(&mut self, field: &FieldInfo) -> Result<()> {
        if field.index_options.has_offsets() {
            return Err(SepIndexError::unsupported(format!(
                "field '{}': offsets are not supported by this codec",
                field.name
            )));
        }
        if field.index_options.has_freqs() && self.freq_out.is_none() {
            return Err(SepIndexError::invalid_argument(format!(
                "field '{}' indexes frequencies but the segment has no frequency stream",
                field.name
            )));
        }
        if field.index_options.has_positions() && self.pos_out.is_none() {
            return Err(SepIndexError::invalid_argument(format!(
                "field '{}' indexes positions but the segment has no position stream",
                field.name
            )));
        }

        self.index_options = field.index_options;
        self.store_payloads = field.store_payloads && field.index_options.has_positions();
        self.skip_writer.set_index_options(field.index_options);

        self.enc_doc_bookmark = self.doc_out.index();
        self.enc_freq_bookmark = self.freq_out.as_ref().map(|out| out.index());
        self.enc_pos_bookmark = self.pos_out.as_ref().map(|out| out.index());
        self.last_payload_fp = 0;
        self.last_skip_fp = 0;
        Ok(())
    }

    /// Begin a term: mark where it starts in every stream.
    pub fn start_term(&mut self) -> Result<()> {
        self.doc_bookmark.mark(&self.doc_out)?;
        if self.index_options.has_freqs()
            && let (Some(bookmark), Some(out)) = (self.freq_bookmark.as_mut(), self.freq_out.as_ref())
        {
            bookmark.mark(out)?;
        }
        if self.index_options.has_positions() {
            if let (Some(bookmark), Some(out)) = (self.pos_bookmark.as_mut(), self.pos_out.as_ref())
            {
                bookmark.mark(out)?;
            }
            self.payload_start = match self.payload_out.as_ref() {
                Some(out) => out.position()?,
                None => 0,
            };
            self.last_payload_length = None;
        }

        self.skip_writer.reset_skip(
            &self.doc_bookmark,
            if self.index_options.has_freqs() {
                self.freq_bookmark.as_ref()
            } else {
                None
            },
            if self.index_options.has_positions() {
                self.pos_bookmark.as_ref()
            } else {
                None
            },
            self.payload_start,
        );

        self.df = 0;
        self.last_doc_id = 0;
        Ok(())
    }

    /// Add a document to the current term. Ids must be strictly
    /// increasing within the term.
    pub fn start_doc(&mut self, doc_id: u32, freq: u32) -> Result<()> {
        if self.df > 0 && doc_id <= self.last_doc_id {
            return Err(SepIndexError::corruption(format!(
                "docs out of order: {doc_id} <= {}",
                self.last_doc_id
            )));
        }

        self.df += 1;
        if self.df % self.skip_interval == 0 {
            // The entry captures the stream state before this document:
            // the previous doc id and the positions about to be written to.
            let payload_fp = match self.payload_out.as_ref() {
                Some(out) => out.position()?,
                None => 0,
            };
            self.skip_writer.set_skip_data(
                self.last_doc_id,
                self.store_payloads,
                self.last_payload_length,
                payload_fp,
            );
            self.skip_writer.buffer_skip(
                self.df,
                &self.doc_out,
                self.freq_out.as_ref(),
                self.pos_out.as_ref(),
            )?;
        }

        let delta = doc_id - self.last_doc_id;
        self.last_doc_id = doc_id;
        self.doc_out.write(delta)?;
        if self.index_options.has_freqs() {
            self.freq_out
                .as_mut()
                .ok_or_else(|| SepIndexError::invalid_argument("frequency stream missing"))?
                .write(freq)?;
        }
        self.last_position = 0;
        Ok(())
    }

    /// Add one position of the current document, with its payload if the
    /// field stores payloads. Positions must not decrease.
    pub fn add_position(&mut self, position: u32, payload: Option<&[u8]>) -> Result<()> {
        if !self.index_options.has_positions() {
            return Err(SepIndexError::invalid_argument(
                "field does not index positions",
            ));
        }
        if position < self.last_position {
            return Err(SepIndexError::corruption(format!(
                "positions out of order: {position} < {}",
                self.last_position
            )));
        }
        let delta = position - self.last_position;
        self.last_position = position;

        let pos_out = self
            .pos_out
            .as_mut()
            .ok_or_else(|| SepIndexError::invalid_argument("position stream missing"))?;

        if self.store_payloads {
            let payload = payload.unwrap_or(&[]);
            let payload_length = payload.len() as u32;
            if Some(payload_length) == self.last_payload_length {
                pos_out.write(delta << 1)?;
            } else {
                // Length changed; flag it and write the new length.
                self.last_payload_length = Some(payload_length);
                pos_out.write((delta << 1) | 1)?;
                pos_out.write(payload_length)?;
            }
            if payload_length > 0 {
                self.payload_out
                    .as_mut()
                    .ok_or_else(|| SepIndexError::invalid_argument("payload stream missing"))?
                    .write_all(payload)?;
            }
        } else {
            pos_out.write(delta)?;
        }
        Ok(())
    }

    /// End the current document.
    pub fn finish_doc(&mut self) -> Result<()> {
        self.last_position = 0;
        Ok(())
    }

    /// End the current term, flushing its skip data when large enough,
    /// and return the term's immutable stream state.
    pub fn finish_term(&mut self) -> Result<SepTermWriteState<F>> {
        if self.df == 0 {
            return Err(SepIndexError::invalid_argument(
                "term finished without documents",
            ));
        }

        let mut doc_bookmark = self.doc_out.index();
        doc_bookmark.copy_from(&self.doc_bookmark, false);

        let freq_bookmark = if self.index_options.has_freqs() {
            match (self.freq_out.as_ref(), self.freq_bookmark.as_ref()) {
                (Some(out), Some(term_bookmark)) => {
                    let mut bookmark = out.index();
                    bookmark.copy_from(term_bookmark, false);
                    Some(bookmark)
                }
                _ => None,
            }
        } else {
            None
        };
        let pos_bookmark = if self.index_options.has_positions() {
            match (self.pos_out.as_ref(), self.pos_bookmark.as_ref()) {
                (Some(out), Some(term_bookmark)) => {
                    let mut bookmark = out.index();
                    bookmark.copy_from(term_bookmark, false);
                    Some(bookmark)
                }
                _ => None,
            }
        } else {
            None
        };

        let skip_fp = if self.df >= self.skip_minimum {
            Some(self.skip_writer.write_skip(&mut self.skip_out)?)
        } else {
            None
        };

        let state = SepTermWriteState {
            doc_bookmark,
            freq_bookmark,
            pos_bookmark,
            payload_fp: self.payload_start,
            skip_fp,
        };

        self.df = 0;
        self.last_doc_id = 0;
        Ok(state)
    }

    /// Serialize a term state into the term metadata stream, delta
    /// encoded against the previously encoded term unless `absolute`.
    pub fn encode_term(
        &mut self,
        state: &SepTermWriteState<F>,
        out: &mut dyn Write,
        absolute: bool,
    ) -> Result<()> {
        if absolute {
            self.last_payload_fp = 0;
            self.last_skip_fp = 0;
        }

        self.enc_doc_bookmark.copy_from(&state.doc_bookmark, false);
        self.enc_doc_bookmark.write(out, absolute)?;
        if self.index_options.has_freqs() {
            if let (Some(enc), Some(bookmark)) =
                (self.enc_freq_bookmark.as_mut(), state.freq_bookmark.as_ref())
            {
                enc.copy_from(bookmark, false);
                enc.write(out, absolute)?;
            }
            if self.index_options.has_positions() {
                if let (Some(enc), Some(bookmark)) =
                    (self.enc_pos_bookmark.as_mut(), state.pos_bookmark.as_ref())
                {
                    enc.copy_from(bookmark, false);
                    enc.write(out, absolute)?;
                }
                if self.store_payloads {
                    if absolute {
                        varint::write_u64(out, state.payload_fp)?;
                    } else {
                        varint::write_u64(out, state.payload_fp - self.last_payload_fp)?;
                    }
                    self.last_payload_fp = state.payload_fp;
                }
            }
        }
        if let Some(skip_fp) = state.skip_fp {
            if absolute {
                varint::write_u64(out, skip_fp)?;
            } else {
                varint::write_u64(out, skip_fp - self.last_skip_fp)?;
            }
            self.last_skip_fp = skip_fp;
        }
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

        note(self.doc_out.close());
        if let Some(out) = self.freq_out.as_mut() {
            note(out.close());
        }
        if let Some(out) = self.pos_out.as_mut() {
            note(out.close());
        }
        if let Some(out) = self.payload_out.as_mut() {
            note(out.close());
        }
        note(self.skip_out.close());

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::int_stream::PlainIntStreamFactory;
    use crate::storage::MemoryStorage;

    fn segment(has_freqs: bool, has_positions: bool) -> SegmentState {
        SegmentState {
            segment: "_0".to_string(),
            suffix: String::new(),
            doc_count: 100,
            has_freqs,
            has_positions,
        }
    }

    fn writer(
        storage: &MemoryStorage,
        has_freqs: bool,
        has_positions: bool,
    ) -> SepPostingsWriter<PlainIntStreamFactory> {
        SepPostingsWriter::new(
            storage,
            &PlainIntStreamFactory::new(),
            &segment(has_freqs, has_positions),
            16,
        )
        .unwrap()
    }

    #[test]
    fn test_rejects_offsets() {
        let storage = MemoryStorage::new();
        let mut writer = writer(&storage, true, true);
        let field = FieldInfo::new(
            "body",
            IndexOptions::DocsAndFreqsAndPositionsAndOffsets,
            false,
        );
        let err = writer.set_field(&field).unwrap_err();
        assert!(matches!(err, SepIndexError::Unsupported(_)));
    }

    #[test]
    fn test_rejects_out_of_order_docs() {
        let storage = MemoryStorage::new();
        let mut writer = writer(&storage, true, false);
        writer
            .set_field(&FieldInfo::new("f", IndexOptions::DocsAndFreqs, false))
            .unwrap();
        writer.start_term().unwrap();
        writer.start_doc(5, 1).unwrap();
        writer.finish_doc().unwrap();
        let err = writer.start_doc(5, 1).unwrap_err();
        assert!(matches!(err, SepIndexError::Corruption(_)));
    }

    #[test]
    fn test_rejects_decreasing_positions() {
        let storage = MemoryStorage::new();
        let mut writer = writer(&storage, true, true);
        writer
            .set_field(&FieldInfo::new(
                "f",
                IndexOptions::DocsAndFreqsAndPositions,
                false,
            ))
            .unwrap();
        writer.start_term().unwrap();
        writer.start_doc(0, 2).unwrap();
        writer.add_position(4, None).unwrap();
        let err = writer.add_position(3, None).unwrap_err();
        assert!(matches!(err, SepIndexError::Corruption(_)));
    }

    #[test]
    fn test_skip_data_presence_follows_doc_freq() {
        let storage = MemoryStorage::new();
        let mut writer = writer(&storage, true, false);
        writer
            .set_field(&FieldInfo::new("f", IndexOptions::DocsAndFreqs, false))
            .unwrap();

        // 15 documents: below the skip minimum, no skip data.
        writer.start_term().unwrap();
        for doc in 0..15 {
            writer.start_doc(doc, 1).unwrap();
            writer.finish_doc().unwrap();
        }
        let state = writer.finish_term().unwrap();
        assert!(!state.has_skip_data());

        // 16 documents: exactly at the minimum.
        writer.start_term().unwrap();
        for doc in 0..16 {
            writer.start_doc(doc, 1).unwrap();
            writer.finish_doc().unwrap();
        }
        let state = writer.finish_term().unwrap();
        assert!(state.has_skip_data());
    }

    #[test]
    fn test_finish_term_without_docs_fails() {
        let storage = MemoryStorage::new();
        let mut writer = writer(&storage, false, false);
        writer
            .set_field(&FieldInfo::new("f", IndexOptions::Docs, false))
            .unwrap();
        writer.start_term().unwrap();
        assert!(writer.finish_term().is_err());
    }

    #[test]
    fn test_positions_rejected_for_docs_only_field() {
        let storage = MemoryStorage::new();
        let mut writer = writer(&storage, false, false);
        writer
            .set_field(&FieldInfo::new("f", IndexOptions::Docs, false))
            .unwrap();
        writer.start_term().unwrap();
        writer.start_doc(0, 1).unwrap();
        assert!(writer.add_position(0, None).is_err());
    }
}
