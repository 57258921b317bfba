//! V10 → V11. Stateless: every input maps to exactly one output (or
//! none), and never synthesizes a body header except on fragments,
//! where the V10 body's own timestamp/source/barrier move into one.

use ringfmt::v10::record::{FragmentKind as V10FragmentKind, StateChangeKind, TextKind};
use ringfmt::v10::Record as V10Record;
use ringfmt::v11::header::BodyHeader;
use ringfmt::v11::record::{
    FragmentKind as V11FragmentKind, PeriodicScalersBody, PhysicsEventCountBody,
    StateChangeBody as V11StateChangeBody, StateChangeKind as V11StateChangeKind, TextBody,
};
use ringfmt::v11::Record as V11Record;

use crate::error::Result;

use super::Transform;

#[derive(Default)]
pub struct V10ToV11;

impl V10ToV11 {
    pub fn new() -> Self {
        Self
    }
}

impl Transform for V10ToV11 {
    type In = V10Record;
    type Out = V11Record;

    fn push(&mut self, input: V10Record) -> Result<Vec<V11Record>> {
        let out = match input {
            V10Record::Scaler { body } => V11Record::PeriodicScalers {
                body_header: None,
                body: PeriodicScalersBody {
                    interval_begin: body.interval_begin,
                    interval_end: body.interval_end,
                    timestamp: body.timestamp,
                    is_incremental: true,
                    time_divisor: 1,
                    counters: body.counters,
                },
            },
            V10Record::TimestampedScaler { body } => V11Record::PeriodicScalers {
                body_header: None,
                body: PeriodicScalersBody {
                    interval_begin: body.interval_begin,
                    interval_end: body.interval_end,
                    timestamp: body.timestamp,
                    is_incremental: false,
                    time_divisor: 1,
                    counters: body.counters,
                },
            },
            V10Record::StateChange { kind, body } => {
                let kind = match kind {
                    StateChangeKind::Begin => V11StateChangeKind::Begin,
                    StateChangeKind::End => V11StateChangeKind::End,
                    StateChangeKind::Pause => V11StateChangeKind::Pause,
                    StateChangeKind::Resume => V11StateChangeKind::Resume,
                };
                V11Record::StateChange {
                    kind,
                    body_header: None,
                    body: V11StateChangeBody {
                        run_number: body.run_number,
                        time_offset: body.time_offset,
                        timestamp: body.timestamp,
                        offset_divisor: 1,
                        title: body.title,
                    },
                }
            }
            V10Record::Physics { body } => V11Record::Physics {
                body_header: None,
                body,
            },
            V10Record::PhysicsEventCount { body } => V11Record::PhysicsEventCount {
                body_header: None,
                body: PhysicsEventCountBody {
                    time_offset: body.time_offset,
                    offset_divisor: 1,
                    timestamp: body.timestamp,
                    event_count: body.event_count,
                },
            },
            V10Record::Text { kind, body } => V11Record::Text {
                kind: match kind {
                    TextKind::PacketTypes => ringfmt::v11::record::TextKind::PacketTypes,
                    TextKind::MonitoredVariables => {
                        ringfmt::v11::record::TextKind::MonitoredVariables
                    }
                },
                body_header: None,
                body: TextBody {
                    time_offset: body.time_offset,
                    timestamp: body.timestamp,
                    offset_divisor: 1,
                    strings: body.strings,
                },
            },
            V10Record::Fragment { kind, body } => V11Record::Fragment {
                kind: match kind {
                    V10FragmentKind::Fragment => V11FragmentKind::Fragment,
                    V10FragmentKind::UnknownPayload => V11FragmentKind::UnknownPayload,
                },
                body_header: BodyHeader {
                    event_timestamp: body.event_timestamp,
                    source_id: body.source_id,
                    barrier_type: body.barrier_type,
                },
                payload: body.payload,
            },
            V10Record::Void => V11Record::Void,
        };
        Ok(vec![out])
    }

    fn flush(&mut self) -> Vec<V11Record> {
        Vec::new()
    }
}
