//! Delimiting conventions for events packed into a V8 physics container
//! (DATABF) body. The dialect is ambiguous about which convention a given
//! stream uses; the operator supplies the policy out-of-band (spec §3,
//! §6 `--v8-size-policy`).

use crate::byteio::ByteReader;
use crate::error::{Error, Result};

/// Which convention delimits one physics event inside a DATABF body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizePolicy {
    /// Leading 16-bit word count, itself included in the count.
    Inclusive16BitWords,
    /// Leading 16-bit word count, not including itself.
    Exclusive16BitWords,
    /// Leading 32-bit word count, itself included (as two words) in the count.
    Inclusive32BitWords,
    /// Leading 32-bit byte count, itself included in the count.
    Inclusive32BitBytes,
}

impl Default for SizePolicy {
    fn default() -> Self {
        SizePolicy::Inclusive16BitWords
    }
}

/// Reads one delimited event's bytes (header word(s) included) from `r`,
/// according to `policy`, advancing `r` past the event. Returns the exact
/// on-wire bytes of the event, unparsed and unswapped relative to how
/// they appeared in the body (payload semantics are opaque to this layer).
pub fn read_one_event<'a>(r: &mut ByteReader<'a>, policy: SizePolicy) -> Result<&'a [u8]> {
    let total_bytes = match policy {
        SizePolicy::Inclusive16BitWords => {
            let nwds = r.peek_u16()?;
            if nwds == 0 {
                return Err(Error::Malformed(
                    "inclusive word count of 0 cannot include itself".into(),
                ));
            }
            nwds as usize * 2
        }
        SizePolicy::Exclusive16BitWords => {
            let nwds = r.peek_u16()?;
            (nwds as usize + 1) * 2
        }
        SizePolicy::Inclusive32BitWords => {
            let nwds = r.peek_u32()?;
            if nwds < 2 {
                return Err(Error::Malformed(
                    "inclusive 32-bit word count must include its own two words".into(),
                ));
            }
            nwds as usize * 2
        }
        SizePolicy::Inclusive32BitBytes => {
            let nbytes = r.peek_u32()?;
            if nbytes < 4 {
                return Err(Error::Malformed(
                    "inclusive byte count must include its own 4 bytes".into(),
                ));
            }
            nbytes as usize
        }
    };
    r.read_exact(total_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byteio::ByteWriter;

    fn event_inclusive_words(payload: &[u16]) -> Vec<u8> {
        let mut w = ByteWriter::new();
        w.write_u16(payload.len() as u16 + 1);
        for p in payload {
            w.write_u16(*p);
        }
        w.into_vec()
    }

    #[test]
    fn inclusive_16bit_words_delimits_correctly() {
        let mut body = Vec::new();
        body.extend(event_inclusive_words(&[0x1234]));
        body.extend(event_inclusive_words(&[0x5678, 0x9abc]));
        let mut r = ByteReader::new(&body, false);
        let e1 = read_one_event(&mut r, SizePolicy::Inclusive16BitWords).unwrap();
        assert_eq!(e1.len(), 4);
        let e2 = read_one_event(&mut r, SizePolicy::Inclusive16BitWords).unwrap();
        assert_eq!(e2.len(), 6);
        assert_eq!(r.remaining(), 0);
    }

    #[test]
    fn inclusive_32bit_bytes_delimits_correctly() {
        let mut w = ByteWriter::new();
        w.write_u32(8); // self-inclusive byte count: 4 (count) + 4 (payload)
        w.write_u32(0xdeadbeef);
        let body = w.into_vec();
        let mut r = ByteReader::new(&body, false);
        let e = read_one_event(&mut r, SizePolicy::Inclusive32BitBytes).unwrap();
        assert_eq!(e.len(), 8);
    }

    #[test]
    fn underrun_when_declared_size_exceeds_body() {
        let mut w = ByteWriter::new();
        w.write_u16(100); // claims 200 bytes, body only has 2
        let body = w.into_vec();
        let mut r = ByteReader::new(&body, false);
        assert!(matches!(
            read_one_event(&mut r, SizePolicy::Inclusive16BitWords),
            Err(Error::Underrun { .. })
        ));
    }
}
