use crate::detect::{looks_decompressed, DetectedFormat, SEARCH_WINDOW};
use crate::error::{Result, TrackError};

/// A track file cut at the payload boundary.  Both halves borrow from the
/// original bytes and together cover them exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackParts<'a> {
    /// Opaque container header.  Includes the `LZMA` marker for tagged files.
    pub header:  &'a [u8],
    /// Compressed payload, still carrying the 32-bit size field.
    pub payload: &'a [u8],
}

/// Split `bytes` according to `format`.
///
/// A tagged marker sitting at the very end of the file produces an empty
/// payload; rejecting it is left to the patcher.  Unrecognized input fails
/// with the already-decompressed hint taken from `bytes`.
pub fn split(bytes: &[u8], format: DetectedFormat) -> Result<TrackParts<'_>> {
    let start = format
        .payload_start()
        .ok_or_else(|| TrackError::FormatNotRecognized {
            window:               SEARCH_WINDOW,
            already_decompressed: looks_decompressed(bytes),
        })?
        .min(bytes.len());

    let (header, payload) = bytes.split_at(start);
    Ok(TrackParts { header, payload })
}
