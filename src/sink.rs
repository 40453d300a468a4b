//! Output sink for decoded track data.
//!
//! [`ChecksumWriter`] sits between the decoder and the output file.  It
//! counts bytes, folds them into a CRC-32, and keeps the first error of the
//! wrapped writer. The decoder reports sink failures as its own (stringified)
//! errors, and the pipeline needs the original one to tell a full disk apart
//! from a corrupt stream.

use std::io::{self, Write};

use crc32fast::Hasher;

pub struct ChecksumWriter<W: Write> {
    inner:         W,
    hasher:        Hasher,
    bytes_written: u64,
    sink_error:    Option<io::Error>,
}

impl<W: Write> ChecksumWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            hasher:        Hasher::new(),
            bytes_written: 0,
            sink_error:    None,
        }
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// CRC-32 of everything accepted so far.
    pub fn crc32(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    /// True once any write or flush on the wrapped writer has failed.
    pub fn sink_failed(&self) -> bool {
        self.sink_error.is_some()
    }

    /// The first error raised by the wrapped writer, with its original kind.
    pub fn take_sink_error(&mut self) -> Option<io::Error> {
        self.sink_error.take()
    }

    /// Remember `e` and hand the caller an equivalent copy.
    fn record(&mut self, e: io::Error) -> io::Error {
        let copy = io::Error::new(e.kind(), e.to_string());
        self.sink_error.get_or_insert(e);
        copy
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for ChecksumWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = match self.inner.write(buf) {
            Ok(n)  => n,
            Err(e) => return Err(self.record(e)),
        };
        self.hasher.update(&buf[..n]);
        self.bytes_written += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().map_err(|e| self.record(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "read-only volume"))
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn counts_and_hashes() {
        let mut w = ChecksumWriter::new(Vec::new());
        w.write_all(b"hello").unwrap();
        w.write_all(b" world!").unwrap();
        w.flush().unwrap();
        assert_eq!(w.bytes_written(), 12);
        assert_eq!(w.crc32(), crc32fast::hash(b"hello world!"));
        assert!(!w.sink_failed());
        assert_eq!(w.into_inner(), b"hello world!");
    }

    #[test]
    fn remembers_sink_failure() {
        let mut w = ChecksumWriter::new(FailingSink);
        let err = w.write_all(b"data").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
        assert!(w.sink_failed());
        assert_eq!(w.bytes_written(), 0);

        let kept = w.take_sink_error().unwrap();
        assert_eq!(kept.kind(), io::ErrorKind::PermissionDenied);
        assert_eq!(kept.to_string(), "read-only volume");
        assert!(w.take_sink_error().is_none());
    }
}
