//! The V11 dialect: per-record ring items whose header carries an
//! optional body header (event timestamp, source id, barrier type).

pub mod header;
pub mod record;
pub mod types;

pub use header::{BodyHeader, ItemHeader};
pub use record::Record;

use crate::error::{Error, Result};
use crate::raw::RawItem;

pub fn decode_item(buf: &[u8]) -> Result<(Record, usize)> {
    let (hdr, swapped) = ItemHeader::decode_autodetect(buf)?;
    let total = hdr.size as usize;
    let header_len = hdr.header_len();
    if total < header_len {
        return Err(Error::Malformed(format!(
            "ring item size {total} smaller than its header"
        )));
    }
    if total > buf.len() {
        return Err(Error::Underrun {
            needed: total,
            available: buf.len(),
        });
    }
    let body = buf[header_len..total].to_vec();
    let mut raw = RawItem::new(hdr.item_type, body, swapped);
    if let Some(bh) = hdr.body_header {
        raw.event_timestamp = Some(bh.event_timestamp);
        raw.source_id = Some(bh.source_id);
        raw.barrier_type = Some(bh.barrier_type);
    }
    Ok((Record::from_raw(&raw)?, total))
}

pub fn encode_item(record: &Record) -> Vec<u8> {
    let raw = record.to_raw();
    let body_header = raw.event_timestamp.map(|ts| BodyHeader {
        event_timestamp: ts,
        source_id: raw.source_id.unwrap_or(0),
        barrier_type: raw.barrier_type.unwrap_or(0),
    });
    let header_len = header::MANDATORY_HEADER_BYTES
        + if body_header.is_some() { header::BODY_HEADER_BYTES } else { 4 };
    let total = header_len + raw.body.len();
    let hdr = ItemHeader::new(raw.item_type, total as u32, body_header);
    let mut w = crate::byteio::ByteWriter::with_capacity(total);
    hdr.encode(&mut w);
    w.write_bytes(&raw.body);
    w.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::v11::record::{RingFormatBody, StateChangeBody, StateChangeKind};

    #[test]
    fn item_without_body_header_round_trips() {
        let rec = Record::RingFormat {
            body: RingFormatBody { major: 11, minor: 0 },
        };
        let bytes = encode_item(&rec);
        let (decoded, consumed) = decode_item(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded, rec);
    }

    #[test]
    fn item_with_body_header_round_trips() {
        let rec = Record::StateChange {
            kind: StateChangeKind::Begin,
            body_header: Some(BodyHeader {
                event_timestamp: 42,
                source_id: 1,
                barrier_type: 0,
            }),
            body: StateChangeBody {
                run_number: 1,
                time_offset: 0,
                timestamp: 1_700_000_000,
                offset_divisor: 1,
                title: "t".into(),
            },
        };
        let bytes = encode_item(&rec);
        let (decoded, consumed) = decode_item(&bytes).unwrap();
        assert_eq!(consumed, bytes.len());
        assert_eq!(decoded, rec);
    }
}
