pub mod error;
pub mod detect;
pub mod split;
pub mod patch;
pub mod codec;
pub mod sink;
pub mod naming;
pub mod track;

pub use error::{Result, TrackError};
pub use detect::{detect, DetectedFormat};
pub use split::{split, TrackParts};
pub use patch::{AlonePayload, CompressedPayload, SIZE_FIELD_FILLER};
pub use codec::{Decoder, LzmaAloneDecoder};
pub use naming::decompressed_name;
pub use track::{ExtractOptions, ExtractReport, TrackFile, TrackInfo};
