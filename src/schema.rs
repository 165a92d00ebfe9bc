//! Per-field indexing options.
//!
//! A field declares how much positional detail its postings carry. The
//! postings writer and reader consult these options to decide which streams
//! a term uses and how its entries are laid out.

/// How much information a field's postings record.
///
/// Each variant includes everything the previous one does. Offsets are part
/// of the public vocabulary but this codec does not store them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IndexOptions {
    /// Only document ids.
    Docs,
    /// Document ids and term frequencies.
    DocsAndFreqs,
    /// Document ids, frequencies and positions.
    DocsAndFreqsAndPositions,
    /// Document ids, frequencies, positions and character offsets.
    DocsAndFreqsAndPositionsAndOffsets,
}

impl IndexOptions {
    /// Whether postings for this option carry term frequencies.
    pub fn has_freqs(self) -> bool {
        self >= IndexOptions::DocsAndFreqs
    }

    /// Whether postings for this option carry positions.
    pub fn has_positions(self) -> bool {
        self >= IndexOptions::DocsAndFreqsAndPositions
    }

    /// Whether postings for this option carry character offsets.
    pub fn has_offsets(self) -> bool {
        self >= IndexOptions::DocsAndFreqsAndPositionsAndOffsets
    }
}

/// Metadata describing a single indexed field.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// The field name.
    pub name: String,
    /// How much postings detail the field records.
    pub index_options: IndexOptions,
    /// Whether per-position payloads are stored for this field.
    pub store_payloads: bool,
}

impl FieldInfo {
    /// Create a field description.
    pub fn new(name: impl Into<String>, index_options: IndexOptions, store_payloads: bool) -> Self {
        FieldInfo {
            name: name.into(),
            index_options,
            store_payloads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_are_cumulative() {
        assert!(!IndexOptions::Docs.has_freqs());
        assert!(!IndexOptions::Docs.has_positions());

        assert!(IndexOptions::DocsAndFreqs.has_freqs());
        assert!(!IndexOptions::DocsAndFreqs.has_positions());

        assert!(IndexOptions::DocsAndFreqsAndPositions.has_freqs());
        assert!(IndexOptions::DocsAndFreqsAndPositions.has_positions());
        assert!(!IndexOptions::DocsAndFreqsAndPositions.has_offsets());

        assert!(IndexOptions::DocsAndFreqsAndPositionsAndOffsets.has_offsets());
    }

    #[test]
    fn test_field_info() {
        let field = FieldInfo::new("body", IndexOptions::DocsAndFreqsAndPositions, true);
        assert_eq!(field.name, "body");
        assert!(field.store_payloads);
    }
}
