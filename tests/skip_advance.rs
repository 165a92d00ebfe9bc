//! Skip-list correctness: advance() must land exactly where a linear
//! scan would, at every document frequency and skip depth.

use std::io::Cursor;
use std::sync::Arc;

use bit_vec::BitVec;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use sepindex::int_stream::PlainIntStreamFactory;
use sepindex::postings::{NO_MORE_DOCS, SegmentState, SepPostingsReader, SepPostingsWriter};
use sepindex::schema::{FieldInfo, IndexOptions};
use sepindex::storage::MemoryStorage;

const SKIP_INTERVAL: u32 = 16;

struct Fixture {
    storage: MemoryStorage,
    seg: SegmentState,
    field: FieldInfo,
    terms_out: Vec<u8>,
    // Offset where the encoded term starts, past the header written by
    // the writer's init.
    term_data_start: u64,
    doc_freq: u32,
}

impl Fixture {
    /// Index one term occurring in `doc_ids` with frequency
    /// `freq_of(doc)`, positions `doc % 5` and `doc % 5 + 2` (payload =
    /// the doc id's little-endian bytes) when the field is positional.
    fn build(doc_ids: &[u32], index_options: IndexOptions, store_payloads: bool) -> Fixture {
        let storage = MemoryStorage::new();
        let doc_count = doc_ids.last().copied().unwrap_or(0) + 1;
        let seg = SegmentState {
            segment: "_0".to_string(),
            suffix: String::new(),
            doc_count,
            has_freqs: index_options.has_freqs(),
            has_positions: index_options.has_positions(),
        };
        let field = FieldInfo::new("body", index_options, store_payloads);

        let factory = PlainIntStreamFactory::new();
        let mut writer =
            SepPostingsWriter::new(&storage, &factory, &seg, SKIP_INTERVAL).unwrap();
        let mut terms_out = Vec::new();
        writer.init(&mut terms_out).unwrap();
        let term_data_start = terms_out.len() as u64;
        writer.set_field(&field).unwrap();

        writer.start_term().unwrap();
        for &doc in doc_ids {
            let freq = if index_options.has_positions() {
                2
            } else {
                freq_of(doc)
            };
            writer.start_doc(doc, freq).unwrap();
            if index_options.has_positions() {
                let payload = doc.to_le_bytes();
                let payload = store_payloads.then_some(&payload[..]);
                writer.add_position(doc % 5, payload).unwrap();
                writer.add_position(doc % 5 + 2, payload).unwrap();
            }
            writer.finish_doc().unwrap();
        }
        let state = writer.finish_term().unwrap();
        writer.encode_term(&state, &mut terms_out, true).unwrap();
        writer.close().unwrap();

        Fixture {
            storage,
            seg,
            field,
            terms_out,
            term_data_start,
            doc_freq: doc_ids.len() as u32,
        }
    }

    fn reader(&self) -> SepPostingsReader<PlainIntStreamFactory> {
        let factory = PlainIntStreamFactory::new();
        let mut reader = SepPostingsReader::open(&self.storage, &factory, &self.seg).unwrap();
        let mut cursor = Cursor::new(self.terms_out.clone());
        reader.init(&mut cursor).unwrap();
        reader
    }

    fn term_state(
        &self,
        reader: &SepPostingsReader<PlainIntStreamFactory>,
    ) -> sepindex::postings::SepTermState<PlainIntStreamFactory> {
        let mut state = reader.new_term_state();
        state.doc_freq = self.doc_freq;
        let mut cursor = Cursor::new(self.terms_out.clone());
        cursor.set_position(self.term_data_start);
        reader
            .decode_term(&mut cursor, &self.field, &mut state, true)
            .unwrap();
        state
    }
}

fn freq_of(doc: u32) -> u32 {
    doc % 3 + 1
}

#[test]
fn test_worked_example_forty_docs() {
    let doc_ids: Vec<u32> = (0..40).collect();
    let fixture = Fixture::build(&doc_ids, IndexOptions::DocsAndFreqs, false);

    let reader = fixture.reader();
    let state = fixture.term_state(&reader);
    let mut docs_enum = reader.docs(&fixture.field, &state, None, None).unwrap();

    assert_eq!(docs_enum.advance(33).unwrap(), 33);
    assert_eq!(docs_enum.freq(), freq_of(33));
    assert_eq!(docs_enum.next_doc().unwrap(), 34);
    assert_eq!(docs_enum.advance(999).unwrap(), NO_MORE_DOCS);
}

#[test]
fn test_advance_at_skip_minimum_boundary() {
    // 15 documents: no skip data, advance scans linearly.
    let doc_ids: Vec<u32> = (0..15).collect();
    let fixture = Fixture::build(&doc_ids, IndexOptions::DocsAndFreqs, false);
    let reader = fixture.reader();
    let state = fixture.term_state(&reader);
    let mut docs_enum = reader.docs(&fixture.field, &state, None, None).unwrap();
    assert_eq!(docs_enum.advance(10).unwrap(), 10);
    assert_eq!(docs_enum.advance(14).unwrap(), 14);
    assert_eq!(docs_enum.advance(15).unwrap(), NO_MORE_DOCS);

    // 16 documents: exactly one skip entry.
    let doc_ids: Vec<u32> = (0..16).collect();
    let fixture = Fixture::build(&doc_ids, IndexOptions::DocsAndFreqs, false);
    let reader = fixture.reader();
    let state = fixture.term_state(&reader);
    let mut docs_enum = reader.docs(&fixture.field, &state, None, None).unwrap();
    assert_eq!(docs_enum.advance(15).unwrap(), 15);
    assert_eq!(docs_enum.next_doc().unwrap(), NO_MORE_DOCS);
}

#[test]
fn test_advance_matches_linear_scan_randomized() {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let mut doc_ids = Vec::new();
    let mut doc = 0u32;
    for _ in 0..400 {
        doc += rng.random_range(1..=5);
        doc_ids.push(doc);
    }
    let fixture = Fixture::build(&doc_ids, IndexOptions::DocsAndFreqs, false);
    let reader = fixture.reader();

    for _ in 0..20 {
        let state = fixture.term_state(&reader);
        let mut docs_enum = reader.docs(&fixture.field, &state, None, None).unwrap();
        let mut current: i64 = -1;
        loop {
            let target = (current + rng.random_range(1..=60)) as u32;
            let expected = doc_ids
                .iter()
                .copied()
                .find(|&d| d as i64 > current && d >= target)
                .unwrap_or(NO_MORE_DOCS);
            let got = docs_enum.advance(target).unwrap();
            assert_eq!(got, expected, "target={target} current={current}");
            if got == NO_MORE_DOCS {
                break;
            }
            assert_eq!(docs_enum.freq(), freq_of(got));
            current = got as i64;
        }
    }
}

#[test]
fn test_advance_through_deep_skip_levels() {
    // 5000 documents give a three-level skip list with interval 16.
    let doc_ids: Vec<u32> = (0..5000).collect();
    let fixture = Fixture::build(&doc_ids, IndexOptions::DocsAndFreqs, false);
    let reader = fixture.reader();
    let state = fixture.term_state(&reader);

    let mut docs_enum = reader.docs(&fixture.field, &state, None, None).unwrap();
    assert_eq!(docs_enum.advance(4990).unwrap(), 4990);
    assert_eq!(docs_enum.freq(), freq_of(4990));
    assert_eq!(docs_enum.next_doc().unwrap(), 4991);
    assert_eq!(docs_enum.advance(5000).unwrap(), NO_MORE_DOCS);

    // Several hops through the same enumerator.
    let mut docs_enum = reader.docs(&fixture.field, &state, None, None).unwrap();
    for target in [100u32, 1000, 1001, 3500, 4999] {
        assert_eq!(docs_enum.advance(target).unwrap(), target);
    }
}

#[test]
fn test_advance_with_positions_and_payloads() {
    let doc_ids: Vec<u32> = (0..200).collect();
    let fixture = Fixture::build(&doc_ids, IndexOptions::DocsAndFreqsAndPositions, true);
    let reader = fixture.reader();
    let state = fixture.term_state(&reader);

    let mut positions_enum = reader
        .docs_and_positions(&fixture.field, &state, None, None)
        .unwrap();
    assert_eq!(positions_enum.advance(150).unwrap(), 150);
    assert_eq!(positions_enum.freq(), 2);
    assert_eq!(positions_enum.next_position().unwrap(), 150 % 5);
    assert_eq!(
        positions_enum.payload().unwrap(),
        Some(150u32.to_le_bytes().to_vec())
    );
    assert_eq!(positions_enum.next_position().unwrap(), 150 % 5 + 2);
    assert_eq!(
        positions_enum.payload().unwrap(),
        Some(150u32.to_le_bytes().to_vec())
    );

    // Positions keep working after a second skip.
    assert_eq!(positions_enum.advance(190).unwrap(), 190);
    assert_eq!(positions_enum.next_position().unwrap(), 190 % 5);
    assert_eq!(
        positions_enum.payload().unwrap(),
        Some(190u32.to_le_bytes().to_vec())
    );
}

#[test]
fn test_advance_skips_deleted_documents() {
    let doc_ids: Vec<u32> = (0..100).collect();
    let fixture = Fixture::build(&doc_ids, IndexOptions::DocsAndFreqs, false);
    let reader = fixture.reader();
    let state = fixture.term_state(&reader);

    let mut live = BitVec::from_elem(100, true);
    live.set(80, false);
    live.set(81, false);

    let mut docs_enum = reader
        .docs(&fixture.field, &state, Some(Arc::new(live)), None)
        .unwrap();
    assert_eq!(docs_enum.advance(80).unwrap(), 82);
}
