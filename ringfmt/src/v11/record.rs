//! Per-type V11 ring-item variants: parse from a raw item, serialize back
//! into one. Every variant carries its own optional body header — V11's
//! defining feature over V10.

use crate::byteio::{ByteReader, ByteWriter};
use crate::error::{Error, Result};
use crate::raw::RawItem;
use crate::v11::header::BodyHeader;
use crate::v11::types;

fn body_header_from_raw(raw: &RawItem) -> Option<BodyHeader> {
    raw.event_timestamp.map(|ts| BodyHeader {
        event_timestamp: ts,
        source_id: raw.source_id.unwrap_or(0),
        barrier_type: raw.barrier_type.unwrap_or(0),
    })
}

fn apply_body_header(raw: &mut RawItem, bh: Option<BodyHeader>) {
    if let Some(bh) = bh {
        raw.event_timestamp = Some(bh.event_timestamp);
        raw.source_id = Some(bh.source_id);
        raw.barrier_type = Some(bh.barrier_type);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChangeKind {
    Begin,
    End,
    Pause,
    Resume,
    AbnormalEnd,
}

impl StateChangeKind {
    fn item_type(self) -> u32 {
        match self {
            StateChangeKind::Begin => types::BEGIN_RUN,
            StateChangeKind::End => types::END_RUN,
            StateChangeKind::Pause => types::PAUSE_RUN,
            StateChangeKind::Resume => types::RESUME_RUN,
            StateChangeKind::AbnormalEnd => types::ABNORMAL_ENDRUN,
        }
    }

    fn from_item_type(t: u32) -> Option<Self> {
        match t {
            types::BEGIN_RUN => Some(StateChangeKind::Begin),
            types::END_RUN => Some(StateChangeKind::End),
            types::PAUSE_RUN => Some(StateChangeKind::Pause),
            types::RESUME_RUN => Some(StateChangeKind::Resume),
            types::ABNORMAL_ENDRUN => Some(StateChangeKind::AbnormalEnd),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateChangeBody {
    pub run_number: u32,
    pub time_offset: u32,
    pub timestamp: u32,
    pub offset_divisor: u32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeriodicScalersBody {
    pub interval_begin: u32,
    pub interval_end: u32,
    pub timestamp: u32,
    pub is_incremental: bool,
    pub time_divisor: u32,
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
    pub offset_divisor: u32,
    pub strings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicsEventCountBody {
    pub time_offset: u32,
    pub offset_divisor: u32,
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
pub struct RingFormatBody {
    pub major: u32,
    pub minor: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlomInfoBody {
    pub coincidence_ticks: u32,
    pub is_building: bool,
    pub timestamp_policy: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    StateChange {
        kind: StateChangeKind,
        body_header: Option<BodyHeader>,
        body: StateChangeBody,
    },
    PeriodicScalers {
        body_header: Option<BodyHeader>,
        body: PeriodicScalersBody,
    },
    Physics {
        body_header: Option<BodyHeader>,
        body: Vec<u8>,
    },
    PhysicsEventCount {
        body_header: Option<BodyHeader>,
        body: PhysicsEventCountBody,
    },
    Text {
        kind: TextKind,
        body_header: Option<BodyHeader>,
        body: TextBody,
    },
    Fragment {
        kind: FragmentKind,
        body_header: BodyHeader,
        payload: Vec<u8>,
    },
    RingFormat {
        body: RingFormatBody,
    },
    GlomInfo {
        body: GlomInfoBody,
    },
    Void,
}

impl Record {
    pub fn item_type(&self) -> u32 {
        match self {
            Record::StateChange { kind, .. } => kind.item_type(),
            Record::PeriodicScalers { .. } => types::PERIODIC_SCALERS,
            Record::Physics { .. } => types::PHYSICS_EVENT,
            Record::PhysicsEventCount { .. } => types::PHYSICS_EVENT_COUNT,
            Record::Text { kind, .. } => kind.item_type(),
            Record::Fragment { kind, .. } => kind.item_type(),
            Record::RingFormat { .. } => types::RING_FORMAT,
            Record::GlomInfo { .. } => types::EVB_GLOM_INFO,
            Record::Void => types::VOID,
        }
    }

    pub fn body_header(&self) -> Option<BodyHeader> {
        match self {
            Record::StateChange { body_header, .. }
            | Record::PeriodicScalers { body_header, .. }
            | Record::Physics { body_header, .. }
            | Record::PhysicsEventCount { body_header, .. }
            | Record::Text { body_header, .. } => *body_header,
            Record::Fragment { body_header, .. } => Some(*body_header),
            Record::RingFormat { .. } | Record::GlomInfo { .. } | Record::Void => None,
        }
    }

    pub fn from_raw(raw: &RawItem) -> Result<Self> {
        let bh = body_header_from_raw(raw);
        match raw.item_type {
            t if StateChangeKind::from_item_type(t).is_some() => Ok(Record::StateChange {
                kind: StateChangeKind::from_item_type(t).unwrap(),
                body_header: bh,
                body: parse_state_change(&raw.body, raw.swap)?,
            }),
            types::PERIODIC_SCALERS => Ok(Record::PeriodicScalers {
                body_header: bh,
                body: parse_periodic_scalers(&raw.body, raw.swap)?,
            }),
            types::PHYSICS_EVENT => Ok(Record::Physics {
                body_header: bh,
                body: raw.body.clone(),
            }),
            types::PHYSICS_EVENT_COUNT => Ok(Record::PhysicsEventCount {
                body_header: bh,
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
                    body_header: bh,
                    body: parse_text(&raw.body, raw.swap)?,
                })
            }
            types::EVB_FRAGMENT | types::EVB_UNKNOWN_PAYLOAD => {
                let kind = if raw.item_type == types::EVB_FRAGMENT {
                    FragmentKind::Fragment
                } else {
                    FragmentKind::UnknownPayload
                };
                let body_header = bh.ok_or_else(|| {
                    Error::Malformed("event-builder fragment without a body header".into())
                })?;
                Ok(Record::Fragment {
                    kind,
                    body_header,
                    payload: raw.body.clone(),
                })
            }
            types::RING_FORMAT => Ok(Record::RingFormat {
                body: parse_ring_format(&raw.body, raw.swap)?,
            }),
            types::EVB_GLOM_INFO => Ok(Record::GlomInfo {
                body: parse_glom_info(&raw.body, raw.swap)?,
            }),
            types::VOID => Ok(Record::Void),
            other => Err(Error::KindMismatch {
                expected: "known V11 item type",
                got: other,
            }),
        }
    }

    pub fn to_raw(&self) -> RawItem {
        let mut w = ByteWriter::new();
        match self {
            Record::StateChange { body, .. } => encode_state_change(&mut w, body),
            Record::PeriodicScalers { body, .. } => encode_periodic_scalers(&mut w, body),
            Record::Physics { body, .. } => w.write_bytes(body),
            Record::PhysicsEventCount { body, .. } => encode_physics_event_count(&mut w, body),
            Record::Text { body, .. } => encode_text(&mut w, body),
            Record::Fragment { payload, .. } => w.write_bytes(payload),
            Record::RingFormat { body } => encode_ring_format(&mut w, body),
            Record::GlomInfo { body } => encode_glom_info(&mut w, body),
            Record::Void => {}
        }
        let mut raw = RawItem::new(self.item_type(), w.into_vec(), false);
        apply_body_header(&mut raw, self.body_header());
        raw
    }
}

fn parse_state_change(body: &[u8], swap: bool) -> Result<StateChangeBody> {
    let mut r = ByteReader::new(body, swap);
    let run_number = r.read_u32()?;
    let time_offset = r.read_u32()?;
    let timestamp = r.read_u32()?;
    let offset_divisor = r.read_u32()?;
    let title_size = r.read_u32()? as usize;
    let title_bytes = r.read_exact(title_size)?;
    let nul_pos = title_bytes.iter().position(|&b| b == 0).unwrap_or(title_size);
    let title = String::from_utf8_lossy(&title_bytes[..nul_pos]).into_owned();
    Ok(StateChangeBody {
        run_number,
        time_offset,
        timestamp,
        offset_divisor,
        title,
    })
}

fn encode_state_change(w: &mut ByteWriter, b: &StateChangeBody) {
    w.write_u32(b.run_number);
    w.write_u32(b.time_offset);
    w.write_u32(b.timestamp);
    w.write_u32(b.offset_divisor);
    let mut title_bytes = b.title.as_bytes().to_vec();
    title_bytes.push(0);
    w.write_u32(title_bytes.len() as u32);
    w.write_bytes(&title_bytes);
}

fn parse_periodic_scalers(body: &[u8], swap: bool) -> Result<PeriodicScalersBody> {
    let mut r = ByteReader::new(body, swap);
    let interval_begin = r.read_u32()?;
    let interval_end = r.read_u32()?;
    let timestamp = r.read_u32()?;
    let time_divisor = r.read_u32()?;
    let is_incremental = r.read_u32()? != 0;
    let count = r.read_u32()? as usize;
    let mut counters = Vec::with_capacity(count);
    for _ in 0..count {
        counters.push(r.read_u32()?);
    }
    Ok(PeriodicScalersBody {
        interval_begin,
        interval_end,
        timestamp,
        is_incremental,
        time_divisor,
        counters,
    })
}

fn encode_periodic_scalers(w: &mut ByteWriter, b: &PeriodicScalersBody) {
    w.write_u32(b.interval_begin);
    w.write_u32(b.interval_end);
    w.write_u32(b.timestamp);
    w.write_u32(b.time_divisor);
    w.write_u32(b.is_incremental as u32);
    w.write_u32(b.counters.len() as u32);
    for c in &b.counters {
        w.write_u32(*c);
    }
}

fn parse_text(body: &[u8], swap: bool) -> Result<TextBody> {
    let mut r = ByteReader::new(body, swap);
    let time_offset = r.read_u32()?;
    let timestamp = r.read_u32()?;
    let offset_divisor = r.read_u32()?;
    let string_count = r.read_u32()? as usize;
    let mut strings = Vec::with_capacity(string_count);
    for _ in 0..string_count {
        strings.push(String::from_utf8_lossy(r.read_cstr()?).into_owned());
    }
    Ok(TextBody {
        time_offset,
        timestamp,
        offset_divisor,
        strings,
    })
}

fn encode_text(w: &mut ByteWriter, b: &TextBody) {
    w.write_u32(b.time_offset);
    w.write_u32(b.timestamp);
    w.write_u32(b.offset_divisor);
    w.write_u32(b.strings.len() as u32);
    for s in &b.strings {
        w.write_bytes(s.as_bytes());
        w.write_u8(0);
    }
}

fn parse_physics_event_count(body: &[u8], swap: bool) -> Result<PhysicsEventCountBody> {
    let mut r = ByteReader::new(body, swap);
    let time_offset = r.read_u32()?;
    let offset_divisor = r.read_u32()?;
    let timestamp = r.read_u32()?;
    let event_count = r.read_u64()?;
    Ok(PhysicsEventCountBody {
        time_offset,
        offset_divisor,
        timestamp,
        event_count,
    })
}

fn encode_physics_event_count(w: &mut ByteWriter, b: &PhysicsEventCountBody) {
    w.write_u32(b.time_offset);
    w.write_u32(b.offset_divisor);
    w.write_u32(b.timestamp);
    w.write_u64(b.event_count);
}

fn parse_ring_format(body: &[u8], swap: bool) -> Result<RingFormatBody> {
    let mut r = ByteReader::new(body, swap);
    let major = r.read_u32()?;
    let minor = r.read_u32()?;
    Ok(RingFormatBody { major, minor })
}

fn encode_ring_format(w: &mut ByteWriter, b: &RingFormatBody) {
    w.write_u32(b.major);
    w.write_u32(b.minor);
}

fn parse_glom_info(body: &[u8], swap: bool) -> Result<GlomInfoBody> {
    let mut r = ByteReader::new(body, swap);
    let coincidence_ticks = r.read_u32()?;
    let is_building = r.read_u32()? != 0;
    let timestamp_policy = r.read_u32()?;
    Ok(GlomInfoBody {
        coincidence_ticks,
        is_building,
        timestamp_policy,
    })
}

fn encode_glom_info(w: &mut ByteWriter, b: &GlomInfoBody) {
    w.write_u32(b.coincidence_ticks);
    w.write_u32(b.is_building as u32);
    w.write_u32(b.timestamp_policy);
}
