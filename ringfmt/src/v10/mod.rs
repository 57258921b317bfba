//! The V10 dialect: per-record ring items with a uniform 8-byte header
//! (32-bit size, 32-bit type) and no body header.

pub mod header;
pub mod record;
pub mod types;

pub use header::ItemHeader;
pub use record::Record;

use crate::error::{Error, Result};
use crate::raw::RawItem;

/// Decodes one ring item starting at the front of `buf`. Returns the
/// decoded record and the total number of bytes it occupied.
pub fn decode_item(buf: &[u8]) -> Result<(Record, usize)> {
    let (hdr, swapped) = ItemHeader::decode_autodetect(buf)?;
    let total = hdr.size as usize;
    if total < header::HEADER_BYTES {
        return Err(Error::Malformed(format!(
            "ring item size {total} smaller than header"
        )));
    }
    if total > buf.len() {
        return Err(Error::Underrun {
            needed: total,
            available: buf.len(),
        });
    }
    let body = buf[header::HEADER_BYTES..total].to_vec();
    let raw = RawItem::new(hdr.item_type, body, swapped);
    Ok((Record::from_raw(&raw)?, total))
}

/// Serializes a record into one self-delimited ring item.
pub fn encode_item(record: &Record) -> Vec<u8> {
    let raw = record.to_raw();
    let total = header::HEADER_BYTES + raw.body.len();
    let hdr = ItemHeader::new(raw.item_type, total as u32);
    let mut w = crate::byteio::ByteWriter::with_capacity(total);
    hdr.encode(&mut w);
    w.write_bytes(&raw.body);
    w.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::v10::record::{FragmentBody, FragmentKind};

    #[test]
    fn item_round_trips_through_decode_encode() {
        let rec = Record::Fragment {
            kind: FragmentKind::UnknownPayload,
            body: FragmentBody {
                event_timestamp: 5,
                source_id: 1,
                barrier_type: 0,
                payload: vec![9, 9],
            },
        };
        let bytes = encode_item(&rec);
        let (decoded, consumed) = decode_item(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded, rec);
    }

    #[test]
    fn truncated_item_underruns() {
        let rec = Record::Void;
        let mut bytes = encode_item(&rec);
        bytes[0] = 100; // claim far more bytes than actually present
        assert!(matches!(decode_item(&bytes), Err(Error::Underrun { .. })));
    }
}
