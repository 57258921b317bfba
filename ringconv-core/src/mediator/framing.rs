//! Streaming framing: reading exactly one record's worth of bytes off a
//! `Source` for each dialect, before handing the slice to `ringfmt`'s
//! (buffer-at-a-time) decoders.

use std::io;

use super::source_sink::{read_exact_or_eof, Source};

/// Reads one fixed-size V8 buffer.
pub fn pull_v8(source: &mut dyn Source, buffer_size: usize) -> io::Result<Option<Vec<u8>>> {
    read_exact_or_eof(source, buffer_size)
}

fn read_u32_native(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn maybe_swap(v: u32, swap: bool) -> u32 {
    if swap {
        v.swap_bytes()
    } else {
        v
    }
}

/// Reads one V10 ring item: the 8-byte (size, type) header, then the
/// remaining `size - 8` bytes.
pub fn pull_v10(source: &mut dyn Source) -> io::Result<Option<Vec<u8>>> {
    let head = match read_exact_or_eof(source, 8)? {
        None => return Ok(None),
        Some(b) => b,
    };
    let swap = read_u32_native(&head[4..8]) >> 16 != 0;
    let size = maybe_swap(read_u32_native(&head[0..4]), swap) as usize;
    let rest = read_exact_or_eof(source, size.saturating_sub(8))?.ok_or_else(truncated)?;
    let mut full = head;
    full.extend_from_slice(&rest);
    Ok(Some(full))
}

/// Reads one V11 ring item: the 8-byte header, then the 4-byte
/// body-header-size word, then (if nonzero) the 16-byte body header
/// block, then whatever body bytes `size` still accounts for.
pub fn pull_v11(source: &mut dyn Source) -> io::Result<Option<Vec<u8>>> {
    let head = match read_exact_or_eof(source, 8)? {
        None => return Ok(None),
        Some(b) => b,
    };
    let swap = read_u32_native(&head[4..8]) >> 16 != 0;
    let size = maybe_swap(read_u32_native(&head[0..4]), swap) as usize;

    let bh_size_word = read_exact_or_eof(source, 4)?.ok_or_else(truncated)?;
    let bh_size = maybe_swap(read_u32_native(&bh_size_word), swap);

    let mut full = head;
    full.extend_from_slice(&bh_size_word);
    let mut consumed = 12;
    if bh_size != 0 {
        let body_header = read_exact_or_eof(source, 16)?.ok_or_else(truncated)?;
        full.extend_from_slice(&body_header);
        consumed = 28;
    }
    let rest = read_exact_or_eof(source, size.saturating_sub(consumed))?.ok_or_else(truncated)?;
    full.extend_from_slice(&rest);
    Ok(Some(full))
}

fn truncated() -> io::Error {
    io::Error::new(io::ErrorKind::UnexpectedEof, "stream ended mid-record")
}
