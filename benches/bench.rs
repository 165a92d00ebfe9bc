use std::hint::black_box;
use std::io::Cursor;

use criterion::{Criterion, criterion_group, criterion_main};

use sepindex::int_stream::PlainIntStreamFactory;
use sepindex::postings::{NO_MORE_DOCS, SegmentState, SepPostingsReader, SepPostingsWriter};
use sepindex::schema::{FieldInfo, IndexOptions};
use sepindex::storage::MemoryStorage;

const DOC_COUNT: u32 = 10_000;

struct Segment {
    storage: MemoryStorage,
    seg: SegmentState,
    field: FieldInfo,
    terms_out: Vec<u8>,
    term_data_start: u64,
}

fn build_segment() -> Segment {
    let storage = MemoryStorage::new();
    let seg = SegmentState {
        segment: "_0".to_string(),
        suffix: String::new(),
        doc_count: DOC_COUNT,
        has_freqs: true,
        has_positions: false,
    };
    let field = FieldInfo::new("body", IndexOptions::DocsAndFreqs, false);
    let factory = PlainIntStreamFactory::new();

    let mut writer = SepPostingsWriter::new(&storage, &factory, &seg, 16).unwrap();
    let mut terms_out = Vec::new();
    writer.init(&mut terms_out).unwrap();
    let term_data_start = terms_out.len() as u64;
    writer.set_field(&field).unwrap();

    writer.start_term().unwrap();
    for doc in 0..DOC_COUNT {
        writer.start_doc(doc, doc % 7 + 1).unwrap();
        writer.finish_doc().unwrap();
    }
    let state = writer.finish_term().unwrap();
    writer.encode_term(&state, &mut terms_out, true).unwrap();
    writer.close().unwrap();

    Segment {
        storage,
        seg,
        field,
        terms_out,
        term_data_start,
    }
}

fn bench_postings(c: &mut Criterion) {
    let segment = build_segment();
    let factory = PlainIntStreamFactory::new();
    let mut reader =
        SepPostingsReader::open(&segment.storage, &factory, &segment.seg).unwrap();
    let mut cursor = Cursor::new(segment.terms_out.clone());
    reader.init(&mut cursor).unwrap();

    let term_state = {
        let mut state = reader.new_term_state();
        state.doc_freq = DOC_COUNT;
        let mut cursor = Cursor::new(segment.terms_out.clone());
        cursor.set_position(segment.term_data_start);
        reader
            .decode_term(&mut cursor, &segment.field, &mut state, true)
            .unwrap();
        state
    };

    c.bench_function("next_doc_full_scan", |b| {
        b.iter(|| {
            let mut docs_enum = reader
                .docs(&segment.field, &term_state, None, None)
                .unwrap();
            let mut total = 0u64;
            loop {
                let doc = docs_enum.next_doc().unwrap();
                if doc == NO_MORE_DOCS {
                    break;
                }
                total += doc as u64;
            }
            black_box(total)
        })
    });

    c.bench_function("advance_strided", |b| {
        b.iter(|| {
            let mut docs_enum = reader
                .docs(&segment.field, &term_state, None, None)
                .unwrap();
            let mut total = 0u64;
            let mut target = 0u32;
            loop {
                target += 97;
                let doc = docs_enum.advance(target).unwrap();
                if doc == NO_MORE_DOCS {
                    break;
                }
                total += doc as u64;
            }
            black_box(total)
        })
    });
}

criterion_group!(benches, bench_postings);
criterion_main!(benches);
