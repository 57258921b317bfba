//! V10 → V8. The reverse of `v8_to_v10`'s cardinality widening: V10 gives
//! every physics event its own record, V8 packs many into one fixed-size
//! buffer, so this side of the pair does the packing.

use std::collections::VecDeque;

use chrono::{Local, TimeZone, Datelike, Timelike};

use ringfmt::v10;
use ringfmt::v8::header::{BufferHeader, HEADER_BYTES};
use ringfmt::v8::record::{ControlBody, Record as V8Record, ScalerBody, ScalerKind, TextBody};
use ringfmt::v8::types;

use crate::config::ConvertConfig;
use crate::error::Result;

use super::Transform;

/// V10 → V8, including its supplemented diagnostic accessors (see
/// `CTransform10p0to8p0` in the original conversion sources: run number,
/// trigger count, and sampling factor carried across calls; a physics
/// accumulator deferring DATABF emission to a size boundary; a text
/// overflow queue feeding the mediator's drain loop).
pub struct V10ToV8 {
    config: ConvertConfig,
    run: u16,
    triggers_processed: u64,
    sampling_factor: f64,
    physics_events: Vec<Vec<u8>>,
    pending_text: VecDeque<V8Record>,
}

impl V10ToV8 {
    pub fn new(config: ConvertConfig) -> Self {
        Self {
            config,
            run: 0,
            triggers_processed: 0,
            sampling_factor: 1.0,
            physics_events: Vec::new(),
            pending_text: VecDeque::new(),
        }
    }

    /// Resets trigger count and sampling factor, leaving the run number
    /// and any buffered state untouched. Mirrors `resetStatistics`.
    pub fn reset_statistics(&mut self) {
        self.triggers_processed = 0;
        self.sampling_factor = 1.0;
    }

    pub fn set_current_run_number(&mut self, run: u16) {
        self.run = run;
    }

    pub fn current_run_number(&self) -> u16 {
        self.run
    }

    pub fn set_n_triggers_processed(&mut self, n: u64) {
        self.triggers_processed = n;
    }

    /// V8 text buffers queued behind the one already returned from
    /// `push`, not yet handed to the mediator. Mirrors `getStagedTextBuffers`.
    pub fn staged_text_buffers(&self) -> &VecDeque<V8Record> {
        &self.pending_text
    }

    /// The physics events accumulated into the not-yet-flushed DATABF.
    /// Mirrors `getCurrentPhysicsBuffer`.
    pub fn current_physics_buffer(&self) -> &[Vec<u8>] {
        &self.physics_events
    }

    /// Drains any V8 text buffers queued by the last text conversion.
    /// The mediator calls this before processing further input, per the
    /// V10→V8 specialization in the mediator design.
    pub fn drain_text_overflow(&mut self) -> Vec<V8Record> {
        self.pending_text.drain(..).collect()
    }

    fn sequence_number(&self) -> u32 {
        (self.triggers_processed as f64 / self.sampling_factor) as u32
    }

    fn make_header(&self, buffer_type: u16) -> BufferHeader {
        let mut h = BufferHeader::native(buffer_type);
        h.run = self.run;
        h.seq = self.sequence_number();
        h.buffmt = 5;
        h
    }

    fn physics_accumulator_bytes(&self) -> usize {
        self.physics_events.iter().map(Vec::len).sum()
    }

    fn flush_physics_accumulator(&mut self) -> Option<V8Record> {
        if self.physics_events.is_empty() {
            return None;
        }
        let mut header = self.make_header(types::DATABF);
        header.nevt = self.physics_events.len() as u16;
        let events = std::mem::take(&mut self.physics_events);
        Some(V8Record::Physics { header, events })
    }

    fn push_physics_event(&mut self, body: Vec<u8>) -> Vec<V8Record> {
        self.triggers_processed += 1;
        let mut out = Vec::new();
        let prospective = HEADER_BYTES + self.physics_accumulator_bytes() + body.len();
        if prospective >= self.config.v8_buffer_size && !self.physics_events.is_empty() {
            if let Some(flushed) = self.flush_physics_accumulator() {
                out.push(flushed);
            }
        }
        self.physics_events.push(body);
        out
    }

    fn pack_text(&mut self, buffer_type: u16, strings: &[String]) -> Vec<V8Record> {
        let max_body = self.config.v8_buffer_size.saturating_sub(HEADER_BYTES);
        let mut buffers: Vec<Vec<String>> = vec![Vec::new()];
        let mut current_len = 0usize;
        for s in strings {
            let mut unit_len = s.len() + 1;
            if unit_len % 2 != 0 {
                unit_len += 1;
            }
            if current_len + unit_len > max_body && !buffers.last().unwrap().is_empty() {
                buffers.push(Vec::new());
                current_len = 0;
            }
            current_len += unit_len;
            buffers.last_mut().unwrap().push(s.clone());
        }
        buffers
            .into_iter()
            .filter(|b| !b.is_empty())
            .map(|strings| {
                let mut header = self.make_header(buffer_type);
                header.nevt = strings.len() as u16;
                V8Record::Text {
                    header,
                    body: TextBody { strings },
                }
            })
            .collect()
    }

    fn push_text(&mut self, buffer_type: u16, strings: &[String]) -> Vec<V8Record> {
        let mut buffers = self.pack_text(buffer_type, strings);
        if buffers.is_empty() {
            return Vec::new();
        }
        let rest = buffers.split_off(1);
        self.pending_text.extend(rest);
        buffers
    }
}

fn decompose_unix_time(timestamp: u32) -> (u16, u16, u16, u16, u16, u16) {
    let dt = Local.timestamp_opt(timestamp as i64, 0).single().unwrap_or_else(|| {
        Local.timestamp_opt(0, 0).single().expect("epoch is representable")
    });
    (
        dt.month() as u16,
        dt.day() as u16,
        dt.year() as u16,
        dt.hour() as u16,
        dt.minute() as u16,
        dt.second() as u16,
    )
}

impl Transform for V10ToV8 {
    type In = v10::Record;
    type Out = V8Record;

    fn push(&mut self, input: v10::Record) -> Result<Vec<V8Record>> {
        match input {
            v10::Record::Scaler { body } => {
                let flushed = self.flush_physics_accumulator();
                let mut header = self.make_header(types::SCALERBF);
                header.nevt = body.counters.len() as u16;
                let mut out = Vec::new();
                out.extend(flushed);
                out.push(V8Record::Scaler {
                    header,
                    kind: ScalerKind::Scaler,
                    body: ScalerBody {
                        interval_begin: body.interval_begin,
                        interval_end: body.interval_end,
                        counters: body.counters,
                    },
                });
                Ok(out)
            }
            v10::Record::TimestampedScaler { body } => {
                let flushed = self.flush_physics_accumulator();
                let mut header = self.make_header(types::SCALERBF);
                header.nevt = body.counters.len() as u16;
                let mut out = Vec::new();
                out.extend(flushed);
                out.push(V8Record::Scaler {
                    header,
                    kind: ScalerKind::Scaler,
                    body: ScalerBody {
                        interval_begin: body.interval_begin,
                        interval_end: body.interval_end,
                        counters: body.counters,
                    },
                });
                Ok(out)
            }
            v10::Record::StateChange { kind, body } => {
                let flushed = self.flush_physics_accumulator();
                if matches!(kind, v10::record::StateChangeKind::Begin) {
                    self.reset_statistics();
                    self.run = body.run_number as u16;
                }
                let buffer_type = match kind {
                    v10::record::StateChangeKind::Begin => types::BEGRUNBF,
                    v10::record::StateChangeKind::End => types::ENDRUNBF,
                    v10::record::StateChangeKind::Pause => types::PAUSEBF,
                    v10::record::StateChangeKind::Resume => types::RESUMEBF,
                };
                let header = self.make_header(buffer_type);
                let (month, day, year, hour, minute, second) =
                    decompose_unix_time(body.timestamp);
                let mut out = Vec::new();
                out.extend(flushed);
                out.push(V8Record::Control {
                    header,
                    body: ControlBody {
                        title: body.title,
                        elapsed_seconds: body.time_offset,
                        month,
                        day,
                        year,
                        hour,
                        minute,
                        second,
                        tenths: 0,
                    },
                });
                Ok(out)
            }
            v10::Record::Physics { body } => Ok(self.push_physics_event(body)),
            v10::Record::Fragment { .. } => Ok(Vec::new()),
            v10::Record::PhysicsEventCount { body } => {
                let flushed = self.flush_physics_accumulator();
                self.sampling_factor = if body.event_count > 0 {
                    self.triggers_processed as f64 / body.event_count as f64
                } else {
                    1.0
                };
                let mut out = Vec::new();
                out.extend(flushed);
                Ok(out)
            }
            v10::Record::Text { kind, body } => {
                let flushed = self.flush_physics_accumulator();
                let buffer_type = match kind {
                    v10::record::TextKind::PacketTypes => types::PKTDOCBF,
                    v10::record::TextKind::MonitoredVariables => types::RUNVARBF,
                };
                let mut out = Vec::new();
                out.extend(flushed);
                out.extend(self.push_text(buffer_type, &body.strings));
                Ok(out)
            }
            v10::Record::Void => Ok(Vec::new()),
        }
    }

    fn flush(&mut self) -> Vec<V8Record> {
        let mut out: Vec<V8Record> = self.drain_text_overflow();
        if let Some(physics) = self.flush_physics_accumulator() {
            out.push(physics);
        }
        out
    }
}
