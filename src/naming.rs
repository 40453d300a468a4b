//! Output file naming.

use std::path::{Path, PathBuf};

pub const DECOMPRESSED_SUFFIX: &str = "_decompressed";
/// Used when the input has no usable file name.
pub const FALLBACK_NAME: &str = "decompressed";

/// Insert `_decompressed` before the extension of `name`.
///
/// Only the first dot separates stem from extension, so `a.b.c` becomes
/// `a_decompressed.b.c`.
pub fn decompressed_name(name: &str) -> String {
    if name.is_empty() {
        return FALLBACK_NAME.to_string();
    }
    match name.split_once('.') {
        Some((stem, ext)) => format!("{stem}{DECOMPRESSED_SUFFIX}.{ext}"),
        None              => format!("{name}{DECOMPRESSED_SUFFIX}"),
    }
}

/// Final component of `path` as a string, or `""` when there is none.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Sibling of `input` named by [`decompressed_name`].
pub fn output_path(input: &Path) -> PathBuf {
    let name = decompressed_name(&file_name(input));
    match input.parent() {
        Some(dir) => dir.join(name),
        None      => PathBuf::from(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_before_extension() {
        assert_eq!(decompressed_name("track.trk"), "track_decompressed.trk");
    }

    #[test]
    fn appends_without_extension() {
        assert_eq!(decompressed_name("track"), "track_decompressed");
    }

    #[test]
    fn empty_name_falls_back() {
        assert_eq!(decompressed_name(""), "decompressed");
    }

    #[test]
    fn splits_on_first_dot_only() {
        assert_eq!(decompressed_name("track.v2.trk"), "track_decompressed.v2.trk");
        assert_eq!(decompressed_name(".hidden"), "_decompressed.hidden");
    }

    #[test]
    fn output_lands_next_to_input() {
        assert_eq!(
            output_path(Path::new("tracks/evo/track.trk")),
            PathBuf::from("tracks/evo/track_decompressed.trk")
        );
        assert_eq!(output_path(Path::new("track")), PathBuf::from("track_decompressed"));
        assert_eq!(output_path(Path::new("/")), PathBuf::from("decompressed"));
    }
}
