//! The V10 ring-item header: a 32-bit total size followed by a 32-bit
//! type tag. V10 carries no explicit byte-order signature; byte order is
//! inferred from the type tag itself, whose defined values all fit in
//! the low 16 bits (see spec's byte-order section) — if the upper half
//! of a natively-decoded type word is nonzero, the stream is foreign.

use crate::byteio::{ByteReader, ByteWriter};
use crate::error::{Error, Result};

pub const HEADER_BYTES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemHeader {
    pub size: u32,
    pub item_type: u32,
}

impl ItemHeader {
    pub fn new(item_type: u32, size: u32) -> Self {
        Self { item_type, size }
    }

    /// Decodes a header from the first [`HEADER_BYTES`] of `buf`,
    /// auto-detecting byte order from the type tag's reserved high bits.
    pub fn decode_autodetect(buf: &[u8]) -> Result<(Self, bool)> {
        if buf.len() < HEADER_BYTES {
            return Err(Error::Underrun {
                needed: HEADER_BYTES,
                available: buf.len(),
            });
        }
        let tentative = Self::decode(buf, false)?;
        if tentative.item_type >> 16 == 0 {
            Ok((tentative, false))
        } else {
            Ok((Self::decode(buf, true)?, true))
        }
    }

    pub fn decode(buf: &[u8], swap: bool) -> Result<Self> {
        let mut r = ByteReader::new(buf, swap);
        let size = r.read_u32()?;
        let item_type = r.read_u32()?;
        Ok(Self { size, item_type })
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        w.write_u32(self.size);
        w.write_u32(self.item_type);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_native_order() {
        let h = ItemHeader::new(1, 100);
        let mut w = ByteWriter::new();
        h.encode(&mut w);
        let bytes = w.into_vec();
        let (decoded, swapped) = ItemHeader::decode_autodetect(&bytes).unwrap();
        assert!(!swapped);
        assert_eq!(decoded, h);
    }

    #[test]
    fn detects_foreign_byte_order() {
        let h = ItemHeader::new(1, 100);
        let foreign = ItemHeader::new(h.item_type.swap_bytes(), h.size.swap_bytes());
        let mut w = ByteWriter::new();
        foreign.encode(&mut w);
        let bytes = w.into_vec();
        let (decoded, swapped) = ItemHeader::decode_autodetect(&bytes).unwrap();
        assert!(swapped);
        assert_eq!(decoded, h);
    }
}
