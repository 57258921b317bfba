//! The V8 buffer header: 16 packed 16-bit words, with byte-order
//! signatures used to detect whether the rest of the buffer needs
//! swapping on read.

use crate::byteio::{ByteReader, ByteWriter};
use crate::error::Result;

/// Native byte-order signature for the 16-bit field.
pub const SSIGNATURE_NATIVE: u16 = 0x0102;
/// Native byte-order signature for the 32-bit field.
pub const LSIGNATURE_NATIVE: u32 = 0x01020304;

/// Size of a V8 buffer header, in bytes (16 words of 2 bytes each).
pub const HEADER_BYTES: usize = 32;

/// The 16-word packed buffer header common to every V8 buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferHeader {
    /// Total serialized buffer size, in 16-bit words.
    pub nwds: u16,
    /// Buffer type tag (see [`super::types`]).
    pub buffer_type: u16,
    /// Checksum (always 0 on buffers we emit; not validated on read).
    pub checksum: u16,
    /// Run number.
    pub run: u16,
    /// Stream sequence number.
    pub seq: u32,
    /// Number of events/strings/counters in the body, per buffer type.
    pub nevt: u16,
    /// LAM mask count.
    pub nlam: u16,
    /// CPU id.
    pub cpu: u16,
    /// Register bits.
    pub nbit: u16,
    /// Data format / buffer-format version.
    pub buffmt: u16,
    /// 16-bit byte-order signature.
    pub ssignature: u16,
    /// 32-bit byte-order signature.
    pub lsignature: u32,
}

impl BufferHeader {
    /// A header with all fields zeroed except the signatures, which are
    /// set to the native byte-order markers.
    pub fn native(buffer_type: u16) -> Self {
        Self {
            nwds: 0,
            buffer_type,
            checksum: 0,
            run: 0,
            seq: 0,
            nevt: 0,
            nlam: 0,
            cpu: 0,
            nbit: 0,
            buffmt: 5,
            ssignature: SSIGNATURE_NATIVE,
            lsignature: LSIGNATURE_NATIVE,
        }
    }

    /// Decodes a header from the first [`HEADER_BYTES`] of `buf`, auto-
    /// detecting byte order from the signature fields.
    ///
    /// Returns the decoded header and whether the remainder of the
    /// buffer (and this header) was in non-native byte order.
    pub fn decode_autodetect(buf: &[u8]) -> Result<(Self, bool)> {
        // Tentatively parse in native order, then check the signatures.
        let tentative = Self::decode(buf, false)?;
        if tentative.ssignature == SSIGNATURE_NATIVE && tentative.lsignature == LSIGNATURE_NATIVE {
            Ok((tentative, false))
        } else {
            Ok((Self::decode(buf, true)?, true))
        }
    }

    pub fn decode(buf: &[u8], swap: bool) -> Result<Self> {
        let mut r = ByteReader::new(buf, swap);
        let nwds = r.read_u16()?;
        let buffer_type = r.read_u16()?;
        let checksum = r.read_u16()?;
        let run = r.read_u16()?;
        let seq = r.read_u32()?;
        let nevt = r.read_u16()?;
        let nlam = r.read_u16()?;
        let cpu = r.read_u16()?;
        let nbit = r.read_u16()?;
        let buffmt = r.read_u16()?;
        let ssignature = r.read_u16()?;
        let lsignature = r.read_u32()?;
        // Two reserved words, ignored on read.
        r.skip(4)?;
        Ok(Self {
            nwds,
            buffer_type,
            checksum,
            run,
            seq,
            nevt,
            nlam,
            cpu,
            nbit,
            buffmt,
            ssignature,
            lsignature,
        })
    }

    pub fn encode(&self, w: &mut ByteWriter) {
        w.write_u16(self.nwds);
        w.write_u16(self.buffer_type);
        w.write_u16(self.checksum);
        w.write_u16(self.run);
        w.write_u32(self.seq);
        w.write_u16(self.nevt);
        w.write_u16(self.nlam);
        w.write_u16(self.cpu);
        w.write_u16(self.nbit);
        w.write_u16(self.buffmt);
        w.write_u16(self.ssignature);
        w.write_u32(self.lsignature);
        w.write_u16(0); // reserved
        w.write_u16(0); // reserved
    }
}
