//! The V11 ring-item header: a mandatory 8-byte (size, type) pair exactly
//! like V10's, followed by an optional body header block. A leading
//! 32-bit body-header-size of 0 means the block is absent; otherwise it
//! is followed by a 64-bit event timestamp, 32-bit source id and 32-bit
//! barrier type.
//!
//! Byte order is inferred the same way as V10: the type tag's reserved
//! high bits must read zero in native order.

use crate::byteio::{ByteReader, ByteWriter};
use crate::error::{Error, Result};

pub const MANDATORY_HEADER_BYTES: usize = 8;
/// Size of the body-header block when present (4 + 8 + 4 + 4).
pub const BODY_HEADER_BYTES: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyHeader {
    pub event_timestamp: u64,
    pub source_id: u32,
    pub barrier_type: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemHeader {
    pub size: u32,
    pub item_type: u32,
    pub body_header: Option<BodyHeader>,
}

impl ItemHeader {
    pub fn new(item_type: u32, size: u32, body_header: Option<BodyHeader>) -> Self {
        Self {
            size,
            item_type,
            body_header,
        }
    }

    /// Total header length on the wire: the mandatory 8 bytes plus the
    /// body-header block (including its own leading size word) when present.
    pub fn header_len(&self) -> usize {
        MANDATORY_HEADER_BYTES + if self.body_header.is_some() { BODY_HEADER_BYTES } else { 4 }
    }

    pub fn decode_autodetect(buf: &[u8]) -> Result<(Self, bool)> {
        if buf.len() < MANDATORY_HEADER_BYTES + 4 {
            return Err(Error::Underrun {
                needed: MANDATORY_HEADER_BYTES + 4,
                available: buf.len(),
            });
        }
        // Decide the byte order from the mandatory 8 bytes alone: a full
        // tentative decode would parse the variable-length body-header
        // block before this check runs, and a foreign-order body header
        // (e.g. a real EVB_FRAGMENT timestamp) can read past the buffer
        // or report a bogus size well before the swap decision is made.
        let mut probe = ByteReader::new(&buf[..MANDATORY_HEADER_BYTES], false);
        probe.read_u32()?; // size, not needed for the swap decision
        let item_type = probe.read_u32()?;
        let swap = item_type >> 16 != 0;
        let header = Self::decode(buf, swap)?;
        Ok((header, swap))
    }

    pub fn decode(buf: &[u8], swap: bool) -> Result<Self> {
        let mut r = ByteReader::new(buf, swap);
        let size = r.read_u32()?;
        let item_type = r.read_u32()?;
        let body_header_size = r.read_u32()?;
        let body_header = if body_header_size == 0 {
            None
        } else {
            Some(BodyHeader {
                event_timestamp: r.read_u64()?,
                source_id: r.read_u32()?,
                barrier_type: r.read_u32()?,
            })
        };
        Ok(Self {
            size,
            item_type,
            body_header,
        })
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        w.write_u32(self.size);
        w.write_u32(self.item_type);
        match self.body_header {
            None => w.write_u32(0),
            Some(bh) => {
                w.write_u32(BODY_HEADER_BYTES as u32);
                w.write_u64(bh.event_timestamp);
                w.write_u32(bh.source_id);
                w.write_u32(bh.barrier_type);
            }
        }
    }
}
