//! The V8 dialect: fixed-size buffer containers (default 8192 bytes).

pub mod header;
pub mod policy;
pub mod record;
pub mod types;

pub use header::BufferHeader;
pub use policy::SizePolicy;
pub use record::{ControlBody, Record, ScalerBody, ScalerKind, TextBody};

use crate::error::{Error, Result};
use crate::raw::RawItem;

/// Default V8 buffer size in bytes, per spec §6.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;

/// Decodes one fixed-size V8 buffer (exactly `buffer_size` bytes),
/// auto-detecting byte order, and parses it into a typed [`Record`].
pub fn decode_buffer(buf: &[u8], policy: SizePolicy) -> Result<Record> {
    if buf.len() < header::HEADER_BYTES {
        return Err(Error::Underrun {
            needed: header::HEADER_BYTES,
            available: buf.len(),
        });
    }
    let (hdr, swapped) = BufferHeader::decode_autodetect(buf)?;
    let declared_bytes = hdr.nwds as usize * 2;
    if declared_bytes > buf.len() {
        return Err(Error::InconsistentSize {
            declared: declared_bytes as u32,
            actual: buf.len() as u32,
        });
    }
    let body = buf[header::HEADER_BYTES..declared_bytes.max(header::HEADER_BYTES)].to_vec();
    let raw = RawItem::new(hdr.buffer_type as u32, body, swapped);
    Record::from_raw(hdr, &raw, policy)
}

/// Serializes a [`Record`] into a fixed-size V8 buffer, zero-padded to
/// `buffer_size` bytes. Fails with [`Error::Overflow`] if the header plus
/// body would exceed `buffer_size`.
pub fn encode_buffer(record: &Record, buffer_size: usize) -> Result<Vec<u8>> {
    let raw = record.to_raw();
    let total = header::HEADER_BYTES + raw.body.len();
    if total > buffer_size {
        return Err(Error::Overflow {
            attempted: total,
            limit: buffer_size,
        });
    }
    let mut header = *record.header();
    match record {
        Record::Text { body, .. } => header.nevt = body.strings.len() as u16,
        Record::Physics { events, .. } => header.nevt = events.len() as u16,
        _ => {}
    }
    header.nwds = (total / 2) as u16;

    let mut w = crate::byteio::ByteWriter::with_capacity(buffer_size);
    header.encode(&mut w);
    w.write_bytes(&raw.body);
    let mut bytes = w.into_vec();
    bytes.resize(buffer_size, 0);
    Ok(bytes)
}

/// Remaining bytes available in a DATABF buffer of `buffer_size` bytes
/// whose header and already-accumulated events occupy `used_bytes`.
pub fn bytes_free(buffer_size: usize, used_bytes: usize) -> usize {
    buffer_size.saturating_sub(header::HEADER_BYTES + used_bytes)
}
