//! Per-type V10 ring-item variants: parse from a raw item, serialize back
//! into one.

use crate::byteio::{ByteReader, ByteWriter};
use crate::error::{Error, Result};
use crate::raw::RawItem;
use crate::v10::types;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChangeKind {
    Begin,
    End,
    Pause,
    Resume,
}

impl StateChangeKind {
    fn item_type(self) -> u32 {
        match self {
            StateChangeKind::Begin => types::BEGIN_RUN,
            StateChangeKind::End => types::END_RUN,
            StateChangeKind::Pause => types::PAUSE_RUN,
            StateChangeKind::Resume => types::RESUME_RUN,
        }
    }

    fn from_item_type(t: u32) -> Option<Self> {
        match t {
            types::BEGIN_RUN => Some(StateChangeKind::Begin),
            types::END_RUN => Some(StateChangeKind::End),
            types::PAUSE_RUN => Some(StateChangeKind::Pause),
            types::RESUME_RUN => Some(StateChangeKind::Resume),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChangeBody {
    pub run_number: u32,
    pub time_offset: u32,
    pub timestamp: u32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalerBody {
    pub interval_begin: u32,
    pub interval_end: u32,
    pub timestamp: u32,
    pub counters: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampedScalerBody {
    pub event_timestamp: u64,
    pub interval_begin: u32,
    pub interval_end: u32,
    pub interval_divisor: u32,
    pub timestamp: u32,
    pub counters: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    PacketTypes,
    MonitoredVariables,
}

impl TextKind {
    fn item_type(self) -> u32 {
        match self {
            TextKind::PacketTypes => types::PACKET_TYPES,
            TextKind::MonitoredVariables => types::MONITORED_VARIABLES,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextBody {
    pub time_offset: u32,
    pub timestamp: u32,
    pub strings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicsEventCountBody {
    pub time_offset: u32,
    pub timestamp: u32,
    pub event_count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Fragment,
    UnknownPayload,
}

impl FragmentKind {
    fn item_type(self) -> u32 {
        match self {
            FragmentKind::Fragment => types::EVB_FRAGMENT,
            FragmentKind::UnknownPayload => types::EVB_UNKNOWN_PAYLOAD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentBody {
    pub event_timestamp: u64,
    pub source_id: u32,
    pub barrier_type: u32,
    pub payload: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    StateChange { kind: StateChangeKind, body: StateChangeBody },
    Scaler { body: ScalerBody },
    TimestampedScaler { body: TimestampedScalerBody },
    Physics { body: Vec<u8> },
    PhysicsEventCount { body: PhysicsEventCountBody },
    Text { kind: TextKind, body: TextBody },
    Fragment { kind: FragmentKind, body: FragmentBody },
    Void,
}

impl Record {
    pub fn item_type(&self) -> u32 {
        match self {
            Record::StateChange { kind, .. } => kind.item_type(),
            Record::Scaler { .. } => types::INCREMENTAL_SCALERS,
            Record::TimestampedScaler { .. } => types::TIMESTAMPED_NONINCR_SCALERS,
            Record::Physics { .. } => types::PHYSICS_EVENT,
            Record::PhysicsEventCount { .. } => types::PHYSICS_EVENT_COUNT,
            Record::Text { kind, .. } => kind.item_type(),
            Record::Fragment { kind, .. } => kind.item_type(),
            Record::Void => types::VOID,
        }
    }

    pub fn from_raw(raw: &RawItem) -> Result<Self> {
        match raw.item_type {
            t if StateChangeKind::from_item_type(t).is_some() => Ok(Record::StateChange {
                kind: StateChangeKind::from_item_type(t).unwrap(),
                body: parse_state_change(&raw.body, raw.swap)?,
            }),
            types::INCREMENTAL_SCALERS => Ok(Record::Scaler {
                body: parse_scaler(&raw.body, raw.swap)?,
            }),
            types::TIMESTAMPED_NONINCR_SCALERS => Ok(Record::TimestampedScaler {
                body: parse_timestamped_scaler(&raw.body, raw.swap)?,
            }),
            types::PHYSICS_EVENT => Ok(Record::Physics {
                body: raw.body.clone(),
            }),
            types::PHYSICS_EVENT_COUNT => Ok(Record::PhysicsEventCount {
                body: parse_physics_event_count(&raw.body, raw.swap)?,
            }),
            types::PACKET_TYPES | types::MONITORED_VARIABLES => {
                let kind = if raw.item_type == types::PACKET_TYPES {
                    TextKind::PacketTypes
                } else {
                    TextKind::MonitoredVariables
                };
                Ok(Record::Text {
                    kind,
                    body: parse_text(&raw.body, raw.swap)?,
                })
            }
            types::EVB_FRAGMENT | types::EVB_UNKNOWN_PAYLOAD => {
                let kind = if raw.item_type == types::EVB_FRAGMENT {
                    FragmentKind::Fragment
                } else {
                    FragmentKind::UnknownPayload
                };
                Ok(Record::Fragment {
                    kind,
                    body: parse_fragment(&raw.body, raw.swap)?,
                })
            }
            types::VOID => Ok(Record::Void),
            other => Err(Error::KindMismatch {
                expected: "known V10 item type",
                got: other,
            }),
        }
    }

    pub fn to_raw(&self) -> RawItem {
        let mut w = ByteWriter::new();
        match self {
            Record::StateChange { body, .. } => encode_state_change(&mut w, body),
            Record::Scaler { body } => encode_scaler(&mut w, body),
            Record::TimestampedScaler { body } => encode_timestamped_scaler(&mut w, body),
            Record::Physics { body } => w.write_bytes(body),
            Record::PhysicsEventCount { body } => encode_physics_event_count(&mut w, body),
            Record::Text { body, .. } => encode_text(&mut w, body),
            Record::Fragment { body, .. } => encode_fragment(&mut w, body),
            Record::Void => {}
        }
        RawItem::new(self.item_type(), w.into_vec(), false)
    }
}

fn parse_state_change(body: &[u8], swap: bool) -> Result<StateChangeBody> {
    let mut r = ByteReader::new(body, swap);
    let run_number = r.read_u32()?;
    let time_offset = r.read_u32()?;
    let timestamp = r.read_u32()?;
    let title_size = r.read_u32()? as usize;
    let title_bytes = r.read_exact(title_size)?;
    let nul_pos = title_bytes.iter().position(|&b| b == 0).unwrap_or(title_size);
    let title = String::from_utf8_lossy(&title_bytes[..nul_pos]).into_owned();
    Ok(StateChangeBody {
        run_number,
        time_offset,
        timestamp,
        title,
    })
}

fn encode_state_change(w: &mut ByteWriter, b: &StateChangeBody) {
    w.write_u32(b.run_number);
    w.write_u32(b.time_offset);
    w.write_u32(b.timestamp);
    let mut title_bytes = b.title.as_bytes().to_vec();
    title_bytes.push(0);
    w.write_u32(title_bytes.len() as u32);
    w.write_bytes(&title_bytes);
}

fn parse_scaler(body: &[u8], swap: bool) -> Result<ScalerBody> {
    let mut r = ByteReader::new(body, swap);
    let interval_begin = r.read_u32()?;
    let interval_end = r.read_u32()?;
    let timestamp = r.read_u32()?;
    let count = r.read_u32()? as usize;
    let mut counters = Vec::with_capacity(count);
    for _ in 0..count {
        counters.push(r.read_u32()?);
    }
    Ok(ScalerBody {
        interval_begin,
        interval_end,
        timestamp,
        counters,
    })
}

fn encode_scaler(w: &mut ByteWriter, b: &ScalerBody) {
    w.write_u32(b.interval_begin);
    w.write_u32(b.interval_end);
    w.write_u32(b.timestamp);
    w.write_u32(b.counters.len() as u32);
    for c in &b.counters {
        w.write_u32(*c);
    }
}

fn parse_timestamped_scaler(body: &[u8], swap: bool) -> Result<TimestampedScalerBody> {
    let mut r = ByteReader::new(body, swap);
    let event_timestamp = r.read_u64()?;
    let interval_begin = r.read_u32()?;
    let interval_end = r.read_u32()?;
    let interval_divisor = r.read_u32()?;
    let timestamp = r.read_u32()?;
    let count = r.read_u32()? as usize;
    let mut counters = Vec::with_capacity(count);
    for _ in 0..count {
        counters.push(r.read_u32()?);
    }
    Ok(TimestampedScalerBody {
        event_timestamp,
        interval_begin,
        interval_end,
        interval_divisor,
        timestamp,
        counters,
    })
}

fn encode_timestamped_scaler(w: &mut ByteWriter, b: &TimestampedScalerBody) {
    w.write_u64(b.event_timestamp);
    w.write_u32(b.interval_begin);
    w.write_u32(b.interval_end);
    w.write_u32(b.interval_divisor);
    w.write_u32(b.timestamp);
    w.write_u32(b.counters.len() as u32);
    for c in &b.counters {
        w.write_u32(*c);
    }
}

fn parse_text(body: &[u8], swap: bool) -> Result<TextBody> {
    let mut r = ByteReader::new(body, swap);
    let time_offset = r.read_u32()?;
    let timestamp = r.read_u32()?;
    let string_count = r.read_u32()? as usize;
    let mut strings = Vec::with_capacity(string_count);
    for _ in 0..string_count {
        strings.push(String::from_utf8_lossy(r.read_cstr()?).into_owned());
    }
    Ok(TextBody {
        time_offset,
        timestamp,
        strings,
    })
}

fn encode_text(w: &mut ByteWriter, b: &TextBody) {
    w.write_u32(b.time_offset);
    w.write_u32(b.timestamp);
    w.write_u32(b.strings.len() as u32);
    for s in &b.strings {
        w.write_bytes(s.as_bytes());
        w.write_u8(0);
    }
}

fn parse_physics_event_count(body: &[u8], swap: bool) -> Result<PhysicsEventCountBody> {
    let mut r = ByteReader::new(body, swap);
    let time_offset = r.read_u32()?;
    let timestamp = r.read_u32()?;
    let event_count = r.read_u64()?;
    Ok(PhysicsEventCountBody {
        time_offset,
        timestamp,
        event_count,
    })
}

fn encode_physics_event_count(w: &mut ByteWriter, b: &PhysicsEventCountBody) {
    w.write_u32(b.time_offset);
    w.write_u32(b.timestamp);
    w.write_u64(b.event_count);
}

fn parse_fragment(body: &[u8], swap: bool) -> Result<FragmentBody> {
    let mut r = ByteReader::new(body, swap);
    let event_timestamp = r.read_u64()?;
    let source_id = r.read_u32()?;
    let barrier_type = r.read_u32()?;
    let payload_size = r.read_u32()? as usize;
    let payload = r.read_exact(payload_size)?.to_vec();
    Ok(FragmentBody {
        event_timestamp,
        source_id,
        barrier_type,
        payload,
    })
}

fn encode_fragment(w: &mut ByteWriter, b: &FragmentBody) {
    w.write_u64(b.event_timestamp);
    w.write_u32(b.source_id);
    w.write_u32(b.barrier_type);
    w.write_u32(b.payload.len() as u32);
    w.write_bytes(&b.payload);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_change_round_trips() {
        let rec = Record::StateChange {
            kind: StateChangeKind::Begin,
            body: StateChangeBody {
                run_number: 3,
                time_offset: 0,
                timestamp: 1_700_000_000,
                title: "test".into(),
            },
        };
        let raw = rec.to_raw();
        assert_eq!(raw.item_type, types::BEGIN_RUN);
        let parsed = Record::from_raw(&raw).unwrap();
        assert_eq!(parsed, rec);
    }

    #[test]
    fn timestamped_scaler_round_trips() {
        let rec = Record::TimestampedScaler {
            body: TimestampedScalerBody {
                event_timestamp: 1234,
                interval_begin: 14,
                interval_end: 1,
                interval_divisor: 2,
                timestamp: 1_700_000_000,
                counters: vec![0, 1, 2, 3],
            },
        };
        let raw = rec.to_raw();
        let parsed = Record::from_raw(&raw).unwrap();
        assert_eq!(parsed, rec);
    }

    #[test]
    fn fragment_round_trips() {
        let rec = Record::Fragment {
            kind: FragmentKind::Fragment,
            body: FragmentBody {
                event_timestamp: 99,
                source_id: 2,
                barrier_type: 0,
                payload: vec![1, 2, 3, 4],
            },
        };
        let raw = rec.to_raw();
        let parsed = Record::from_raw(&raw).unwrap();
        assert_eq!(parsed, rec);
    }

    #[test]
    fn text_round_trips() {
        let rec = Record::Text {
            kind: TextKind::MonitoredVariables,
            body: TextBody {
                time_offset: 0,
                timestamp: 1_700_000_000,
                strings: vec!["a=1".into(), "b=2".into()],
            },
        };
        let raw = rec.to_raw();
        let parsed = Record::from_raw(&raw).unwrap();
        assert_eq!(parsed, rec);
    }

    #[test]
    fn unknown_type_is_kind_mismatch() {
        let raw = RawItem::new(0xFFFF, vec![], false);
        assert!(matches!(
            Record::from_raw(&raw),
            Err(Error::KindMismatch { .. })
        ));
    }
}
