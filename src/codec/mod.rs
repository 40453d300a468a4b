//! Decoder seam for the patched payload.
//!
//! The pipeline only ever hands the decoder a widened "alone" stream
//! (5-byte properties, 8-byte LE size, body).  Decoding itself is delegated
//! to `lzma-rs`; its errors are carried through verbatim as
//! [`CodecError::Decompression`].

use std::io::{self, Write};

use byteorder::{LittleEndian, ReadBytesExt};
use serde::Serialize;
use thiserror::Error;

// ── Error type ───────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum CodecError {
    #[error("Decompression error: {0}")]
    Decompression(String),
    /// Properties byte outside `0..225` or block shorter than 5 bytes.
    #[error("Invalid LZMA properties: {0}")]
    InvalidProperties(String),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

// ── Properties block ─────────────────────────────────────────────────────────

/// Largest valid properties byte: `(4 * 5 + 4) * 9 + 8`.
pub const MAX_PROPERTIES_BYTE: u8 = 224;

/// Decoded LZMA1 properties block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LzmaProperties {
    /// Literal context bits.
    pub lc:        u8,
    /// Literal position bits.
    pub lp:        u8,
    /// Position bits.
    pub pb:        u8,
    pub dict_size: u32,
}

impl LzmaProperties {
    /// Parse the first 5 bytes of `bytes`.
    pub fn parse(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < 5 {
            return Err(CodecError::InvalidProperties(format!(
                "need 5 bytes, got {}",
                bytes.len()
            )));
        }
        let mut d = bytes[0];
        if d > MAX_PROPERTIES_BYTE {
            return Err(CodecError::InvalidProperties(format!("properties byte {d:#04x}")));
        }
        let pb = d / 45;
        d -= pb * 45;
        let lp = d / 9;
        let lc = d - lp * 9;
        let dict_size = (&bytes[1..5]).read_u32::<LittleEndian>()?;
        Ok(Self { lc, lp, pb, dict_size })
    }

    /// Re-encode the properties byte.
    pub fn byte(&self) -> u8 {
        (self.pb * 5 + self.lp) * 9 + self.lc
    }
}

// ── Decoder trait ────────────────────────────────────────────────────────────

pub trait Decoder {
    fn name(&self) -> &'static str;

    /// Stream the decoded bytes of `data` into `out`.
    fn decompress_into(&self, data: &[u8], out: &mut dyn Write) -> Result<(), CodecError>;

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        self.decompress_into(data, &mut out)?;
        Ok(out)
    }
}

/// LZMA1 "alone" stream decoder backed by `lzma-rs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LzmaAloneDecoder;

impl Decoder for LzmaAloneDecoder {
    fn name(&self) -> &'static str { "lzma-alone" }

    fn decompress_into(&self, data: &[u8], mut out: &mut dyn Write) -> Result<(), CodecError> {
        lzma_rs::lzma_decompress(&mut io::Cursor::new(data), &mut out)
            .map_err(|e| CodecError::Decompression(e.to_string()))
    }
}
