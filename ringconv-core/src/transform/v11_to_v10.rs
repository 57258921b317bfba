//! V11 → V10. Stateless. Body headers are discarded on every type
//! except fragments, where they're the only place V10 has to put them.

use ringfmt::v10::record::{
    FragmentBody, FragmentKind as V10FragmentKind, ScalerBody, StateChangeBody,
    StateChangeKind as V10StateChangeKind, TextBody, TimestampedScalerBody,
};
use ringfmt::v10::Record as V10Record;
use ringfmt::v11::record::{
    FragmentKind as V11FragmentKind, Record as V11Record, StateChangeKind as V11StateChangeKind,
    TextKind,
};

use crate::error::Result;

use super::Transform;

#[derive(Default)]
pub struct V11ToV10;

impl V11ToV10 {
    pub fn new() -> Self {
        Self
    }
}

impl Transform for V11ToV10 {
    type In = V11Record;
    type Out = V10Record;

    fn push(&mut self, input: V11Record) -> Result<Vec<V10Record>> {
        let out = match input {
            // ABNORMAL_ENDRUN has no V10 counterpart and is dropped, same
            // as RING_FORMAT and EVB_GLOM_INFO below.
            V11Record::StateChange { kind: V11StateChangeKind::AbnormalEnd, .. } => None,
            V11Record::StateChange { kind, body, .. } => {
                let kind = match kind {
                    V11StateChangeKind::Begin => V10StateChangeKind::Begin,
                    V11StateChangeKind::End => V10StateChangeKind::End,
                    V11StateChangeKind::Pause => V10StateChangeKind::Pause,
                    V11StateChangeKind::Resume => V10StateChangeKind::Resume,
                    V11StateChangeKind::AbnormalEnd => unreachable!(),
                };
                Some(V10Record::StateChange {
                    kind,
                    body: StateChangeBody {
                        run_number: body.run_number,
                        time_offset: body.time_offset,
                        timestamp: body.timestamp,
                        title: body.title,
                    },
                })
            }
            V11Record::PeriodicScalers { body_header, body } => {
                if body.is_incremental {
                    Some(V10Record::Scaler {
                        body: ScalerBody {
                            interval_begin: body.interval_begin,
                            interval_end: body.interval_end,
                            timestamp: body.timestamp,
                            counters: body.counters,
                        },
                    })
                } else {
                    Some(V10Record::TimestampedScaler {
                        body: TimestampedScalerBody {
                            event_timestamp: body_header.map(|h| h.event_timestamp).unwrap_or(0),
                            interval_begin: body.interval_begin,
                            interval_end: body.interval_end,
                            interval_divisor: body.time_divisor,
                            timestamp: body.timestamp,
                            counters: body.counters,
                        },
                    })
                }
            }
            V11Record::Physics { body, .. } => Some(V10Record::Physics { body }),
            V11Record::PhysicsEventCount { body, .. } => {
                Some(V10Record::PhysicsEventCount {
                    body: ringfmt::v10::record::PhysicsEventCountBody {
                        time_offset: body.time_offset,
                        timestamp: body.timestamp,
                        event_count: body.event_count,
                    },
                })
            }
            V11Record::Text { kind, body, .. } => Some(V10Record::Text {
                kind: match kind {
                    TextKind::PacketTypes => ringfmt::v10::record::TextKind::PacketTypes,
                    TextKind::MonitoredVariables => {
                        ringfmt::v10::record::TextKind::MonitoredVariables
                    }
                },
                body: TextBody {
                    time_offset: body.time_offset,
                    timestamp: body.timestamp,
                    strings: body.strings,
                },
            }),
            V11Record::Fragment { kind, body_header, payload } => Some(V10Record::Fragment {
                kind: match kind {
                    V11FragmentKind::Fragment => V10FragmentKind::Fragment,
                    V11FragmentKind::UnknownPayload => V10FragmentKind::UnknownPayload,
                },
                body: FragmentBody {
                    event_timestamp: body_header.event_timestamp,
                    source_id: body_header.source_id,
                    barrier_type: body_header.barrier_type,
                    payload,
                },
            }),
            // RING_FORMAT, EVB_GLOM_INFO and VOID have no V10 counterpart
            // worth emitting; they're dropped.
            V11Record::RingFormat { .. } | V11Record::GlomInfo { .. } | V11Record::Void => None,
        };
        Ok(out.into_iter().collect())
    }

    fn flush(&mut self) -> Vec<V10Record> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringfmt::v11::header::BodyHeader;
    use ringfmt::v11::record::PeriodicScalersBody;

    #[test]
    fn periodic_scalers_dispatch_on_is_incremental() {
        let mut t = V11ToV10::new();
        let out = t
            .push(V11Record::PeriodicScalers {
                body_header: Some(BodyHeader {
                    event_timestamp: 1234,
                    source_id: 0,
                    barrier_type: 0,
                }),
                body: PeriodicScalersBody {
                    interval_begin: 14,
                    interval_end: 1,
                    timestamp: 1_700_000_000,
                    is_incremental: false,
                    time_divisor: 2,
                    counters: vec![0, 1, 2, 3],
                },
            })
            .unwrap();
        match &out[0] {
            V10Record::TimestampedScaler { body } => {
                assert_eq!(body.event_timestamp, 1234);
                assert_eq!(body.interval_begin, 14);
                assert_eq!(body.interval_end, 1);
                assert_eq!(body.interval_divisor, 2);
                assert_eq!(body.counters, vec![0, 1, 2, 3]);
            }
            _ => panic!("expected timestamped scaler"),
        }
    }

    #[test]
    fn abnormal_endrun_is_dropped() {
        let mut t = V11ToV10::new();
        let out = t
            .push(V11Record::StateChange {
                kind: V11StateChangeKind::AbnormalEnd,
                body_header: None,
                body: ringfmt::v11::record::StateChangeBody {
                    run_number: 1,
                    time_offset: 0,
                    timestamp: 0,
                    offset_divisor: 1,
                    title: String::new(),
                },
            })
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn ring_format_is_dropped() {
        let mut t = V11ToV10::new();
        let out = t
            .push(V11Record::RingFormat {
                body: ringfmt::v11::record::RingFormatBody { major: 11, minor: 0 },
            })
            .unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn fragment_body_header_moves_into_body_fields() {
        let mut t = V11ToV10::new();
        let out = t
            .push(V11Record::Fragment {
                kind: ringfmt::v11::record::FragmentKind::Fragment,
                body_header: BodyHeader {
                    event_timestamp: 99,
                    source_id: 2,
                    barrier_type: 1,
                },
                payload: vec![5, 6],
            })
            .unwrap();
        match &out[0] {
            V10Record::Fragment { body, .. } => {
                assert_eq!(body.event_timestamp, 99);
                assert_eq!(body.source_id, 2);
                assert_eq!(body.barrier_type, 1);
            }
            _ => panic!("expected fragment"),
        }
    }
}
