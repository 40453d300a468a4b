//! High-level [`TrackFile`] API, the primary embedding surface.
//!
//! ```no_run
//! use trackunpack::track::{ExtractOptions, TrackFile};
//!
//! let track = TrackFile::open("tracks/track.trk")?;
//! println!("{} track", track.format().name());
//! let report = track.extract(&ExtractOptions::default())?;
//! println!("wrote {}", report.output.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Serialize;

use crate::codec::{CodecError, Decoder, LzmaAloneDecoder, LzmaProperties};
use crate::detect::{self, DetectedFormat, HEADER_END_MARKER};
use crate::error::{Result, TrackError};
use crate::naming;
use crate::patch::{self, AlonePayload, CompressedPayload, SIZE_FIELD_FILLER};
use crate::sink::ChecksumWriter;
use crate::split::{split, TrackParts};

/// Bytes of header shown by [`TrackFile::inspect`].
const HEADER_PREVIEW_LEN: usize = 16;

// ── ExtractOptions ────────────────────────────────────────────────────────────

/// Configuration for [`TrackFile::extract`].
#[derive(Debug, Clone, Default)]
pub struct ExtractOptions {
    /// Write `header ++ HEND\0` in front of the decompressed data.
    pub keep_header: bool,
}

// ── Reports ───────────────────────────────────────────────────────────────────

/// Detection summary returned by [`TrackFile::inspect`].
#[derive(Debug, Clone, Serialize)]
pub struct TrackInfo {
    pub name:                 String,
    pub size:                 usize,
    pub format:               DetectedFormat,
    pub payload_start:        Option<usize>,
    pub header_len:           Option<usize>,
    pub payload_len:          Option<usize>,
    /// Hex of the first header bytes.
    pub header_preview:       String,
    pub properties:           Option<LzmaProperties>,
    pub declared_size:        Option<u32>,
    pub already_decompressed: bool,
    pub output_name:          String,
}

/// Outcome of a successful [`TrackFile::extract`].
#[derive(Debug, Clone, Serialize)]
pub struct ExtractReport {
    pub input:         PathBuf,
    pub output:        PathBuf,
    pub format:        DetectedFormat,
    pub header_len:    usize,
    pub declared_size: u64,
    /// Everything written, including the header when it was kept.
    pub bytes_written: u64,
    pub crc32:         u32,
}

// ── TrackFile ─────────────────────────────────────────────────────────────────

/// An input track held in memory together with its detected format.
pub struct TrackFile {
    path:   PathBuf,
    name:   String,
    bytes:  Vec<u8>,
    format: DetectedFormat,
}

impl TrackFile {
    // ── Constructors ─────────────────────────────────────────────────────────

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_owned();
        let bytes = fs::read(&path).map_err(|source| TrackError::Read {
            path: path.clone(),
            source,
        })?;
        debug!("Read {} bytes from {}", bytes.len(), path.display());
        Ok(Self::from_bytes(path, bytes))
    }

    /// Wrap bytes that were read elsewhere.  `path` only determines the name
    /// and the output location.
    pub fn from_bytes<P: AsRef<Path>>(path: P, bytes: Vec<u8>) -> Self {
        let path = path.as_ref().to_owned();
        let name = naming::file_name(&path);
        let format = detect::detect(&bytes);
        debug!("Detected {} format for '{}' ({:?})", format.name(), name, format);
        Self { path, name, bytes, format }
    }

    // ── Accessors ────────────────────────────────────────────────────────────

    pub fn path(&self) -> &Path { &self.path }

    pub fn name(&self) -> &str { &self.name }

    pub fn bytes(&self) -> &[u8] { &self.bytes }

    pub fn format(&self) -> DetectedFormat { self.format }

    /// Where [`extract`](Self::extract) writes.
    pub fn output_path(&self) -> PathBuf {
        naming::output_path(&self.path)
    }

    // ── Pipeline stages ──────────────────────────────────────────────────────

    pub fn parts(&self) -> Result<TrackParts<'_>> {
        split(&self.bytes, self.format)
    }

    /// Split and widen; the result goes straight to a decoder.
    pub fn alone_payload(&self) -> Result<AlonePayload> {
        widen(&self.parts()?)
    }

    pub fn inspect(&self) -> TrackInfo {
        let parts = self.parts().ok();
        let header = parts.map(|p| p.header).unwrap_or(&[]);
        let payload = parts.map(|p| p.payload).unwrap_or(&[]);

        TrackInfo {
            name:                 self.name.clone(),
            size:                 self.bytes.len(),
            format:               self.format,
            payload_start:        self.format.payload_start(),
            header_len:           parts.map(|p| p.header.len()),
            payload_len:          parts.map(|p| p.payload.len()),
            header_preview:       hex::encode(&header[..header.len().min(HEADER_PREVIEW_LEN)]),
            properties:           LzmaProperties::parse(payload).ok(),
            declared_size:        patch::declared_size(payload),
            already_decompressed: !self.format.is_compressed()
                && detect::looks_decompressed(&self.bytes),
            output_name:          naming::decompressed_name(&self.name),
        }
    }

    /// Decompress into memory with the LZMA alone decoder.
    pub fn decompress(&self) -> Result<Vec<u8>> {
        self.decompress_with(&LzmaAloneDecoder)
    }

    pub fn decompress_with(&self, decoder: &dyn Decoder) -> Result<Vec<u8>> {
        let alone = self.alone_payload()?;
        Ok(decoder.decompress(alone.as_bytes())?)
    }

    /// Decompress into the sibling file named by [`output_path`](Self::output_path).
    pub fn extract(&self, opts: &ExtractOptions) -> Result<ExtractReport> {
        self.extract_to(&self.output_path(), &LzmaAloneDecoder, opts)
    }

    /// Decompress into `output`.
    ///
    /// The output file is only created once the payload has been located and
    /// widened, so unrecognized or malformed input never touches the disk.  A
    /// failure while streaming removes the partial file.
    pub fn extract_to(
        &self,
        output:  &Path,
        decoder: &dyn Decoder,
        opts:    &ExtractOptions,
    ) -> Result<ExtractReport> {
        let parts = self.parts()?;
        let alone = widen(&parts)?;

        if let Ok(props) = LzmaProperties::parse(alone.properties()) {
            debug!(
                "Properties lc={} lp={} pb={} dict={} B",
                props.lc, props.lp, props.pb, props.dict_size
            );
        }

        debug!("Decoding with {} into {}", decoder.name(), output.display());
        let header = opts.keep_header.then_some(parts.header);
        let (bytes_written, crc32) = write_output(output, header, &alone, decoder)?;

        info!(
            "{} → {} ({} bytes, crc32 {:08x})",
            self.path.display(),
            output.display(),
            bytes_written,
            crc32
        );

        Ok(ExtractReport {
            input:         self.path.clone(),
            output:        output.to_owned(),
            format:        self.format,
            header_len:    parts.header.len(),
            declared_size: alone.declared_size(),
            bytes_written,
            crc32,
        })
    }
}

fn widen(parts: &TrackParts<'_>) -> Result<AlonePayload> {
    let alone = CompressedPayload::new(parts.payload.to_vec())
        .widen_size_field(SIZE_FIELD_FILLER)?;
    debug!(
        "Header {} B, payload {} B, declared size {} B",
        parts.header.len(),
        parts.payload.len(),
        alone.declared_size()
    );
    Ok(alone)
}

// ── Output ────────────────────────────────────────────────────────────────────

fn write_output(
    output:  &Path,
    header:  Option<&[u8]>,
    payload: &AlonePayload,
    decoder: &dyn Decoder,
) -> Result<(u64, u32)> {
    let file = File::create(output).map_err(|source| TrackError::Write {
        path: output.to_owned(),
        source,
    })?;

    // The sink (and the file handle) is dropped inside `write_sink`, before
    // any cleanup.
    let written = write_sink(ChecksumWriter::new(BufWriter::new(file)), output, header, payload, decoder);
    if written.is_err() {
        if let Err(rm) = fs::remove_file(output) {
            warn!("Could not remove partial output {}: {rm}", output.display());
        }
    }
    written
}

/// Stream into `sink` and classify a failure: an error raised by the sink
/// itself is a write failure on `output`, anything else is the decoder's.
fn write_sink<W: Write>(
    mut sink: ChecksumWriter<W>,
    output:   &Path,
    header:   Option<&[u8]>,
    payload:  &AlonePayload,
    decoder:  &dyn Decoder,
) -> Result<(u64, u32)> {
    match stream_into(&mut sink, header, payload, decoder) {
        Ok(()) => Ok((sink.bytes_written(), sink.crc32())),
        Err(e) => Err(match sink.take_sink_error() {
            Some(source) => TrackError::Write { path: output.to_owned(), source },
            None         => TrackError::Decode(e),
        }),
    }
}

fn stream_into(
    sink:    &mut dyn Write,
    header:  Option<&[u8]>,
    payload: &AlonePayload,
    decoder: &dyn Decoder,
) -> std::result::Result<(), CodecError> {
    if let Some(header) = header {
        sink.write_all(header)?;
        sink.write_all(&HEADER_END_MARKER)?;
    }
    decoder.decompress_into(payload.as_bytes(), sink)?;
    sink.flush()?;
    Ok(())
}
