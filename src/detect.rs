//! Format detection: locate the compressed payload inside a track file.
//!
//! Track containers carry no length prefix for their header, so the payload
//! boundary is found by a bounded scan for one of two magic sequences:
//!
//! | Variant    | Marker               | Payload starts at |
//! |------------|----------------------|-------------------|
//! | Tagged     | `"LZMA"`             | marker + 4        |
//! | Untagged   | `5D 00 00 02 00`     | marker            |
//!
//! The tagged marker is always tested first and wins whenever it is present,
//! wherever the untagged sequence may sit.  Only the first
//! [`SEARCH_WINDOW`] bytes are examined; files whose marker lies further in
//! are reported as [`DetectedFormat::Unrecognized`].

use serde::Serialize;

/// How far into the file the markers are searched for.
pub const SEARCH_WINDOW: usize = 200;

/// Text marker that precedes the payload in tagged files.
pub const TAG_MARKER: &[u8; 4] = b"LZMA";

/// LZMA1 properties (lc=3 lp=0 pb=2, 128 KiB dictionary) that open the
/// payload of untagged files.
pub const PROPERTIES_MARKER: [u8; 5] = [0x5D, 0x00, 0x00, 0x02, 0x00];

/// Terminator of the container header in decompressed track files.
pub const HEADER_END_MARKER: [u8; 5] = *b"HEND\0";

/// Result of scanning the search window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum DetectedFormat {
    /// `offset` is the index of the `LZMA` text marker.
    TaggedCompressed { offset: usize },
    /// `offset` is the index of the properties sequence, which is also the
    /// first payload byte.
    UntaggedCompressed { offset: usize },
    Unrecognized,
}

impl DetectedFormat {
    /// Index of the first payload byte, or `None` for unrecognized input.
    pub fn payload_start(self) -> Option<usize> {
        match self {
            DetectedFormat::TaggedCompressed { offset }   => Some(offset + TAG_MARKER.len()),
            DetectedFormat::UntaggedCompressed { offset } => Some(offset),
            DetectedFormat::Unrecognized                  => None,
        }
    }

    pub fn is_compressed(self) -> bool {
        !matches!(self, DetectedFormat::Unrecognized)
    }

    /// Short name for diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            DetectedFormat::TaggedCompressed { .. }   => "tagged",
            DetectedFormat::UntaggedCompressed { .. } => "untagged",
            DetectedFormat::Unrecognized              => "unrecognized",
        }
    }
}

/// The slice of `bytes` that detection looks at.
#[inline]
pub fn search_window(bytes: &[u8]) -> &[u8] {
    &bytes[..bytes.len().min(SEARCH_WINDOW)]
}

/// Classify `bytes` by scanning the search window.  Total and bounded: never
/// reads past `SEARCH_WINDOW` and never fails.
pub fn detect(bytes: &[u8]) -> DetectedFormat {
    let window = search_window(bytes);

    if let Some(offset) = find(window, TAG_MARKER) {
        return DetectedFormat::TaggedCompressed { offset };
    }
    if let Some(offset) = find(window, &PROPERTIES_MARKER) {
        return DetectedFormat::UntaggedCompressed { offset };
    }
    DetectedFormat::Unrecognized
}

/// True when the search window contains the `HEND` header terminator, i.e.
/// the file looks like an already-decompressed track.
pub fn looks_decompressed(bytes: &[u8]) -> bool {
    find(search_window(bytes), &HEADER_END_MARKER).is_some()
}

/// First index of `needle` in `haystack`.
fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_prefix(prefix: &[u8], rest: &[u8]) -> Vec<u8> {
        let mut v = prefix.to_vec();
        v.extend_from_slice(rest);
        v
    }

    #[test]
    fn tagged_marker_reports_its_own_index() {
        let bytes = with_prefix(b"HEADERDATA", b"LZMA\x5d\x00\x00\x02\x00\x10\x00\x00\x00");
        let fmt = detect(&bytes);
        assert_eq!(fmt, DetectedFormat::TaggedCompressed { offset: 10 });
        assert_eq!(fmt.payload_start(), Some(14));
    }

    #[test]
    fn untagged_sequence_starts_payload() {
        let bytes = with_prefix(&[0xAB; 37], &[0x5D, 0x00, 0x00, 0x02, 0x00, 1, 2, 3, 4]);
        let fmt = detect(&bytes);
        assert_eq!(fmt, DetectedFormat::UntaggedCompressed { offset: 37 });
        assert_eq!(fmt.payload_start(), Some(37));
    }

    #[test]
    fn tagged_wins_even_when_untagged_comes_first() {
        let mut bytes = vec![0u8; 4];
        bytes.extend_from_slice(&PROPERTIES_MARKER);
        bytes.extend_from_slice(&[0x11; 20]);
        bytes.extend_from_slice(TAG_MARKER);
        assert_eq!(detect(&bytes), DetectedFormat::TaggedCompressed { offset: 29 });
    }

    #[test]
    fn nothing_found_is_unrecognized() {
        let bytes = vec![0x42u8; 512];
        assert_eq!(detect(&bytes), DetectedFormat::Unrecognized);
        assert_eq!(DetectedFormat::Unrecognized.payload_start(), None);
        assert!(!DetectedFormat::Unrecognized.is_compressed());
    }

    #[test]
    fn marker_beyond_window_is_ignored() {
        let bytes = with_prefix(&[0u8; SEARCH_WINDOW], TAG_MARKER);
        assert_eq!(detect(&bytes), DetectedFormat::Unrecognized);
    }

    #[test]
    fn marker_straddling_window_end_is_ignored() {
        let bytes = with_prefix(&[0u8; SEARCH_WINDOW - 2], TAG_MARKER);
        assert_eq!(detect(&bytes), DetectedFormat::Unrecognized);
    }

    #[test]
    fn marker_ending_exactly_at_window_end_matches() {
        let bytes = with_prefix(&[0u8; SEARCH_WINDOW - 4], TAG_MARKER);
        assert_eq!(
            detect(&bytes),
            DetectedFormat::TaggedCompressed { offset: SEARCH_WINDOW - 4 }
        );
    }

    #[test]
    fn short_and_empty_inputs_are_scanned_safely() {
        assert_eq!(detect(&[]), DetectedFormat::Unrecognized);
        assert_eq!(detect(b"LZM"), DetectedFormat::Unrecognized);
        assert_eq!(detect(b"LZMA"), DetectedFormat::TaggedCompressed { offset: 0 });
        assert_eq!(search_window(b"abc").len(), 3);
    }

    #[test]
    fn header_terminator_is_recognised() {
        let bytes = with_prefix(b"TRACKHDR", b"HEND\0raw track data");
        assert!(looks_decompressed(&bytes));
        assert!(!looks_decompressed(b"no terminator here"));
    }
}
