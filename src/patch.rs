//! Size-field widening: turn a track payload into an LZMA "alone" stream.
//!
//! Track payloads store the uncompressed size as a 32-bit little-endian
//! integer:
//!
//! ```text
//! [ properties (5 B) | size u32 LE (4 B) | range-coded body ... ]
//! ```
//!
//! The alone format wants 64 bits at the same place.  Inserting four zero
//! bytes after offset 9 zero-extends the field in place:
//!
//! ```text
//! [ properties (5 B) | size u32 LE | 00 00 00 00 | range-coded body ... ]
//!                      └──── size u64 LE (8 B) ────┘
//! ```
//!
//! Widening consumes a [`CompressedPayload`] and yields an [`AlonePayload`],
//! which has no widening operation of its own: a payload is patched exactly
//! once.

use byteorder::{LittleEndian, ReadBytesExt};

use crate::error::{Result, TrackError};

/// Length of the LZMA1 properties block.
pub const PROPERTIES_LEN: usize = 5;
/// End of the 32-bit size field; the filler is inserted here.
pub const SIZE_FIELD_END: usize = 9;
/// Header length of a widened payload (properties + u64 size).
pub const ALONE_HEADER_LEN: usize = 13;
/// High-order half of the widened size field.
pub const SIZE_FIELD_FILLER: [u8; 4] = [0x00; 4];

/// A payload as found in the track file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedPayload(Vec<u8>);

/// A payload whose size field has been widened; ready for the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlonePayload(Vec<u8>);

impl CompressedPayload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The 32-bit uncompressed size, if the payload is long enough to hold it.
    pub fn declared_size(&self) -> Option<u32> {
        declared_size(&self.0)
    }

    /// Insert `filler` after the 32-bit size field.
    ///
    /// # Errors
    /// [`TrackError::MalformedPayload`] when the payload is shorter than the
    /// properties block plus the size field.
    pub fn widen_size_field(mut self, filler: [u8; 4]) -> Result<AlonePayload> {
        if self.0.len() < SIZE_FIELD_END {
            return Err(TrackError::MalformedPayload {
                len:      self.0.len(),
                required: SIZE_FIELD_END,
            });
        }
        self.0.splice(SIZE_FIELD_END..SIZE_FIELD_END, filler);
        Ok(AlonePayload(self.0))
    }
}

/// Read the 32-bit size field of an unpatched payload.
pub fn declared_size(payload: &[u8]) -> Option<u32> {
    let mut field = payload.get(PROPERTIES_LEN..SIZE_FIELD_END)?;
    field.read_u32::<LittleEndian>().ok()
}

impl AlonePayload {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The 5-byte properties block.
    pub fn properties(&self) -> &[u8] {
        &self.0[..PROPERTIES_LEN]
    }

    /// The 64-bit uncompressed size from the widened header.
    pub fn declared_size(&self) -> u64 {
        let mut field = &self.0[PROPERTIES_LEN..ALONE_HEADER_LEN];
        // Widening guarantees at least ALONE_HEADER_LEN bytes.
        field.read_u64::<LittleEndian>().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROPS: [u8; 5] = [0x5D, 0x00, 0x00, 0x02, 0x00];

    fn payload(size: u32, body: &[u8]) -> CompressedPayload {
        let mut v = PROPS.to_vec();
        v.extend_from_slice(&size.to_le_bytes());
        v.extend_from_slice(body);
        CompressedPayload::new(v)
    }

    #[test]
    fn widening_inserts_filler_after_offset_nine() {
        let p = payload(0x0102_0304, b"\x00\xAA\xBB");
        let alone = p.widen_size_field(SIZE_FIELD_FILLER).unwrap();
        assert_eq!(
            alone.as_bytes(),
            &[
                0x5D, 0x00, 0x00, 0x02, 0x00,
                0x04, 0x03, 0x02, 0x01,
                0x00, 0x00, 0x00, 0x00,
                0x00, 0xAA, 0xBB,
            ]
        );
        assert_eq!(alone.properties(), &PROPS);
    }

    #[test]
    fn widening_preserves_size_value() {
        for size in [0u32, 1, 4096, 0x7FFF_FFFF, u32::MAX] {
            let p = payload(size, b"body");
            assert_eq!(p.declared_size(), Some(size));
            let alone = p.widen_size_field(SIZE_FIELD_FILLER).unwrap();
            assert_eq!(alone.declared_size(), size as u64);
        }
    }

    #[test]
    fn exactly_nine_bytes_is_enough() {
        let p = payload(7, &[]);
        let alone = p.widen_size_field(SIZE_FIELD_FILLER).unwrap();
        assert_eq!(alone.len(), ALONE_HEADER_LEN);
        assert_eq!(alone.declared_size(), 7);
    }

    #[test]
    fn short_payload_is_reported() {
        for len in 0..SIZE_FIELD_END {
            let p = CompressedPayload::new(vec![0x5D; len]);
            assert_eq!(p.declared_size(), None);
            match p.widen_size_field(SIZE_FIELD_FILLER) {
                Err(TrackError::MalformedPayload { len: got, required }) => {
                    assert_eq!(got, len);
                    assert_eq!(required, SIZE_FIELD_END);
                }
                other => panic!("expected MalformedPayload, got {other:?}"),
            }
        }
    }

    #[test]
    fn second_widening_shifts_the_body() {
        let once = payload(3, b"\x00\x01\x02\x03")
            .widen_size_field(SIZE_FIELD_FILLER)
            .unwrap();
        let twice = CompressedPayload::new(once.clone().into_bytes())
            .widen_size_field(SIZE_FIELD_FILLER)
            .unwrap();
        // The size still reads the same, but four stray zeros now precede
        // the body, so the stream is no longer the one that was encoded.
        assert_eq!(twice.declared_size(), once.declared_size());
        assert_ne!(&twice.as_bytes()[ALONE_HEADER_LEN..], &once.as_bytes()[ALONE_HEADER_LEN..]);
        assert_eq!(twice.len(), once.len() + SIZE_FIELD_FILLER.len());
    }
}
