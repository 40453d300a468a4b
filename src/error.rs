//! Crate-wide error type.
//!
//! Every variant names the pipeline stage that failed so the CLI can print a
//! single line and exit non-zero.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::codec::CodecError;

pub type Result<T> = std::result::Result<T, TrackError>;

#[derive(Error, Debug)]
pub enum TrackError {
    #[error("Cannot read input {}: {source}", .path.display())]
    Read {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
    /// Neither marker was found inside the search window.
    #[error("Could not find start of compressed data in the first {window} bytes{}",
            decompressed_hint(.already_decompressed))]
    FormatNotRecognized {
        window:               usize,
        /// The window holds the `HEND` header terminator instead.
        already_decompressed: bool,
    },
    #[error("Malformed payload: {len} byte(s), at least {required} needed for the size field")]
    MalformedPayload { len: usize, required: usize },
    #[error("Decode failed: {0}")]
    Decode(#[from] CodecError),
    #[error("Cannot write output {}: {source}", .path.display())]
    Write {
        path:   PathBuf,
        #[source]
        source: io::Error,
    },
}

fn decompressed_hint(already_decompressed: &bool) -> &'static str {
    if *already_decompressed {
        " (file appears to be decompressed already)"
    } else {
        ""
    }
}
