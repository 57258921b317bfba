//! The streaming transport contract. Source/sink construction from a URI
//! is the CLI's job; this crate only depends on these two traits.

use std::io;

/// A pull source of bytes. `read` returns fewer bytes than requested
/// only at end of stream.
pub trait Source {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;
    fn eof(&self) -> bool;
    fn clear_eof(&mut self);
}

/// A push sink of bytes.
pub trait Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<()>;
    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Reads exactly `n` bytes, or `Ok(None)` if the source is at EOF before
/// any byte is read. A source that yields some-but-fewer-than-`n` bytes
/// before EOF is reported as a truncated-stream I/O error.
pub fn read_exact_or_eof(source: &mut dyn Source, n: usize) -> io::Result<Option<Vec<u8>>> {
    let mut buf = vec![0u8; n];
    let mut total = 0;
    while total < n {
        let got = source.read(&mut buf[total..])?;
        if got == 0 {
            break;
        }
        total += got;
    }
    if total == 0 {
        Ok(None)
    } else if total < n {
        Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("stream ended mid-record: needed {n} bytes, got {total}"),
        ))
    } else {
        Ok(Some(buf))
    }
}
