//! V8 → V10. Widens cardinality the other way: one V8 DATABF expands
//! into N independent V10 PHYSICS_EVENTs, queued and drained one at a
//! time by the mediator.

use std::collections::VecDeque;

use chrono::{Local, TimeZone};

use ringfmt::v8;
use ringfmt::v10::record::{ScalerBody, StateChangeBody, StateChangeKind, TextBody, TextKind};
use ringfmt::v10::Record as V10Record;

use crate::error::{Error, Result};

use super::Transform;

/// V8 → V10. Holds only the pending-physics-events queue; every other
/// mapping is stateless and one-to-one.
#[derive(Default)]
pub struct V8ToV10 {
    pending_physics: VecDeque<V10Record>,
}

impl V8ToV10 {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drains V10 PHYSICS_EVENTs queued by the last DATABF expansion.
    pub fn drain_physics_overflow(&mut self) -> Vec<V10Record> {
        self.pending_physics.drain(..).collect()
    }
}

fn unix_now() -> u32 {
    chrono::Utc::now().timestamp() as u32
}

fn compose_unix_time(month: u16, day: u16, year: u16, hour: u16, minute: u16, second: u16) -> u32 {
    Local
        .with_ymd_and_hms(year as i32, month as u32, day as u32, hour as u32, minute as u32, second as u32)
        .single()
        .map(|dt| dt.timestamp() as u32)
        .unwrap_or(0)
}

impl Transform for V8ToV10 {
    type In = v8::Record;
    type Out = V10Record;

    fn push(&mut self, input: v8::Record) -> Result<Vec<V10Record>> {
        match input {
            // SNAPSCBF parses identically to SCALERBF; both land here.
            v8::Record::Scaler { body, .. } => {
                Ok(vec![V10Record::Scaler {
                    body: ScalerBody {
                        interval_begin: body.interval_begin,
                        interval_end: body.interval_end,
                        timestamp: unix_now(),
                        counters: body.counters,
                    },
                }])
            }
            v8::Record::Control { header, body } => {
                let kind = match header.buffer_type {
                    t if t == v8::types::BEGRUNBF => StateChangeKind::Begin,
                    t if t == v8::types::ENDRUNBF => StateChangeKind::End,
                    t if t == v8::types::PAUSEBF => StateChangeKind::Pause,
                    t if t == v8::types::RESUMEBF => StateChangeKind::Resume,
                    other => return Err(Error::UnsupportedType(other as u32)),
                };
                let timestamp =
                    compose_unix_time(body.month, body.day, body.year, body.hour, body.minute, body.second);
                Ok(vec![V10Record::StateChange {
                    kind,
                    body: StateChangeBody {
                        run_number: header.run as u32,
                        time_offset: body.elapsed_seconds,
                        timestamp,
                        title: body.title,
                    },
                }])
            }
            v8::Record::Physics { events, .. } => {
                let mut records: VecDeque<V10Record> = events
                    .into_iter()
                    .map(|body| V10Record::Physics { body })
                    .collect();
                let first = records.pop_front();
                self.pending_physics = records;
                Ok(first.into_iter().collect())
            }
            v8::Record::Text { header, body } => {
                let kind = match header.buffer_type {
                    t if t == v8::types::PKTDOCBF => TextKind::PacketTypes,
                    t if t == v8::types::RUNVARBF || t == v8::types::STATEVARBF => {
                        TextKind::MonitoredVariables
                    }
                    other => return Err(Error::UnsupportedType(other as u32)),
                };
                Ok(vec![V10Record::Text {
                    kind,
                    body: TextBody {
                        time_offset: 0,
                        timestamp: unix_now(),
                        strings: body.strings,
                    },
                }])
            }
            v8::Record::Void { .. } => Ok(vec![V10Record::Void]),
        }
    }

    fn flush(&mut self) -> Vec<V10Record> {
        self.drain_physics_overflow()
    }
}
