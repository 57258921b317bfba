//! End-to-end mediator tests: bytes in one dialect, bytes out in another,
//! driven entirely through `ringconv_core::build`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use ringconv_core::{build, ConvertConfig, DialectVersion, RunMediator, Sink, Source};

struct MemSource {
    chunks: VecDeque<u8>,
}

impl MemSource {
    fn new(bytes: Vec<u8>) -> Self {
        Self {
            chunks: bytes.into(),
        }
    }
}

impl Source for MemSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.chunks.len());
        for slot in buf.iter_mut().take(n) {
            *slot = self.chunks.pop_front().unwrap();
        }
        Ok(n)
    }

    fn eof(&self) -> bool {
        self.chunks.is_empty()
    }

    fn clear_eof(&mut self) {}
}

/// A sink that appends to a shared buffer, so the test can read the bytes
/// back out after the mediator (which owns the boxed `Sink`) has run.
#[derive(Clone, Default)]
struct CaptureSink(Rc<RefCell<Vec<u8>>>);

impl Sink for CaptureSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(())
    }
}

#[test]
fn v10_begin_run_becomes_v8_begrunbf() {
    use ringfmt::v10::record::{StateChangeBody, StateChangeKind};
    use ringfmt::v10::Record as V10Record;

    let rec = V10Record::StateChange {
        kind: StateChangeKind::Begin,
        body: StateChangeBody {
            run_number: 3,
            time_offset: 10203,
            timestamp: 1_700_000_000,
            title: "test".into(),
        },
    };
    let input = ringfmt::v10::encode_item(&rec);

    let capture = CaptureSink::default();
    let config = ConvertConfig::default();
    let source: Box<dyn Source> = Box::new(MemSource::new(input));
    let sink: Box<dyn Sink> = Box::new(capture.clone());
    let mut mediator = build(DialectVersion::V10, DialectVersion::V8, config, source, sink).unwrap();
    mediator.run().unwrap();

    let out = capture.0.borrow();
    let rec = ringfmt::v8::decode_buffer(&out, config.v8_size_policy).unwrap();
    match rec {
        ringfmt::v8::Record::Control { header, body } => {
            assert_eq!(header.buffer_type, ringfmt::v8::types::BEGRUNBF);
            assert_eq!(header.run, 3);
            assert_eq!(body.elapsed_seconds, 10203);
            assert_eq!(body.title, "test");
        }
        other => panic!("expected control record, got {other:?}"),
    }
}

#[test]
fn v8_databf_expands_to_three_v10_physics_events() {
    use ringfmt::v8::header::BufferHeader;
    use ringfmt::v8::{types, Record as V8Record};

    let header = BufferHeader::native(types::DATABF);
    let events = vec![
        vec![0x02, 0x00, 0x34, 0x12],
        vec![0x02, 0x00, 0x56, 0x78],
        vec![0x02, 0x00, 0x9a, 0xbc],
    ];
    let config = ConvertConfig::default();
    let rec = V8Record::Physics { header, events };
    let input = ringfmt::v8::encode_buffer(&rec, config.v8_buffer_size).unwrap();

    let capture = CaptureSink::default();
    let source: Box<dyn Source> = Box::new(MemSource::new(input));
    let sink: Box<dyn Sink> = Box::new(capture.clone());
    let mut mediator = build(DialectVersion::V8, DialectVersion::V10, config, source, sink).unwrap();
    mediator.run().unwrap();

    let out = capture.0.borrow();
    let mut offset = 0;
    let mut count = 0;
    while offset < out.len() {
        let (record, consumed) = ringfmt::v10::decode_item(&out[offset..]).unwrap();
        assert!(matches!(record, ringfmt::v10::Record::Physics { .. }));
        offset += consumed;
        count += 1;
    }
    assert_eq!(count, 3);
}

#[test]
fn v11_periodic_scaler_becomes_v10_timestamped_noincr_scaler() {
    use ringfmt::v11::header::BodyHeader;
    use ringfmt::v11::record::PeriodicScalersBody;
    use ringfmt::v11::Record as V11Record;

    let rec = V11Record::PeriodicScalers {
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
    };
    let input = ringfmt::v11::encode_item(&rec);

    let capture = CaptureSink::default();
    let source: Box<dyn Source> = Box::new(MemSource::new(input));
    let sink: Box<dyn Sink> = Box::new(capture.clone());
    let mut mediator = build(
        DialectVersion::V11,
        DialectVersion::V10,
        ConvertConfig::default(),
        source,
        sink,
    )
    .unwrap();
    mediator.run().unwrap();

    let out = capture.0.borrow();
    let (record, _) = ringfmt::v10::decode_item(&out).unwrap();
    match record {
        ringfmt::v10::Record::TimestampedScaler { body } => {
            assert_eq!(body.event_timestamp, 1234);
            assert_eq!(body.interval_begin, 14);
            assert_eq!(body.interval_end, 1);
            assert_eq!(body.interval_divisor, 2);
            assert_eq!(body.counters, vec![0, 1, 2, 3]);
        }
        other => panic!("expected timestamped scaler, got {other:?}"),
    }
}

#[test]
fn v10_evb_fragment_gains_body_header_in_v11() {
    use ringfmt::v10::record::{FragmentBody, FragmentKind};
    use ringfmt::v10::Record as V10Record;

    let rec = V10Record::Fragment {
        kind: FragmentKind::Fragment,
        body: FragmentBody {
            event_timestamp: 1_234_567,
            source_id: 3,
            barrier_type: 10,
            payload: vec![0, 1, 2, 3],
        },
    };
    let input = ringfmt::v10::encode_item(&rec);

    let capture = CaptureSink::default();
    let source: Box<dyn Source> = Box::new(MemSource::new(input));
    let sink: Box<dyn Sink> = Box::new(capture.clone());
    let mut mediator = build(
        DialectVersion::V10,
        DialectVersion::V11,
        ConvertConfig::default(),
        source,
        sink,
    )
    .unwrap();
    mediator.run().unwrap();

    let out = capture.0.borrow();
    // First item is the RING_FORMAT preamble; the fragment follows it.
    let (preamble, consumed) = ringfmt::v11::decode_item(&out).unwrap();
    assert!(matches!(preamble, ringfmt::v11::Record::RingFormat { .. }));
    let (record, _) = ringfmt::v11::decode_item(&out[consumed..]).unwrap();
    match record {
        ringfmt::v11::Record::Fragment {
            body_header,
            payload,
            ..
        } => {
            assert_eq!(body_header.event_timestamp, 1_234_567);
            assert_eq!(body_header.source_id, 3);
            assert_eq!(body_header.barrier_type, 10);
            assert_eq!(payload, vec![0, 1, 2, 3]);
        }
        other => panic!("expected fragment, got {other:?}"),
    }
}

#[test]
fn v10_physics_overflow_flushes_a_one_event_databf() {
    use ringfmt::v10::Record as V10Record;

    let event = vec![0u8; 4];
    let rec1 = V10Record::Physics {
        body: event.clone(),
    };
    let rec2 = V10Record::Physics { body: event };
    let mut input = ringfmt::v10::encode_item(&rec1);
    input.extend(ringfmt::v10::encode_item(&rec2));

    let capture = CaptureSink::default();
    let source: Box<dyn Source> = Box::new(MemSource::new(input));
    let sink: Box<dyn Sink> = Box::new(capture.clone());
    let config = ConvertConfig {
        v8_buffer_size: 40,
        ..ConvertConfig::default()
    };
    let mut mediator = build(DialectVersion::V10, DialectVersion::V8, config, source, sink).unwrap();
    mediator.run().unwrap();

    let out = capture.0.borrow();
    // Only one DATABF should be on the wire from `push`: the first push
    // stayed empty, the second flushed exactly one event; `flush()` at
    // end-of-stream emits the accumulator's remaining event as a second.
    let mut offset = 0;
    let mut buffers = Vec::new();
    while offset < out.len() {
        let rec = ringfmt::v8::decode_buffer(
            &out[offset..offset + config.v8_buffer_size],
            config.v8_size_policy,
        )
        .unwrap();
        buffers.push(rec);
        offset += config.v8_buffer_size;
    }
    assert_eq!(buffers.len(), 2);
    for rec in &buffers {
        match rec {
            ringfmt::v8::Record::Physics { header, events } => {
                assert_eq!(header.nevt, 1);
                assert_eq!(events.len(), 1);
            }
            other => panic!("expected physics buffer, got {other:?}"),
        }
    }
}

#[test]
fn round_trip_incremental_scaler_through_v11_and_back() {
    use ringconv_core::{Transform, V10ToV11, V11ToV10};
    use ringfmt::v10::record::ScalerBody;
    use ringfmt::v10::Record as V10Record;

    let original = V10Record::Scaler {
        body: ScalerBody {
            interval_begin: 0,
            interval_end: 10,
            timestamp: 1_700_000_000,
            counters: vec![1, 2, 3],
        },
    };

    let mut up = V10ToV11::new();
    let mut down = V11ToV10::new();
    let v11 = up.push(original.clone()).unwrap();
    let back = down.push(v11.into_iter().next().unwrap()).unwrap();

    assert_eq!(back[0], original);
}

#[test]
fn round_trip_fragment_body_header_through_v11_and_back() {
    use ringconv_core::{Transform, V10ToV11, V11ToV10};
    use ringfmt::v10::record::{FragmentBody, FragmentKind};
    use ringfmt::v10::Record as V10Record;

    let original = V10Record::Fragment {
        kind: FragmentKind::Fragment,
        body: FragmentBody {
            event_timestamp: 42,
            source_id: 5,
            barrier_type: 1,
            payload: vec![7, 7, 7],
        },
    };

    let mut up = V10ToV11::new();
    let mut down = V11ToV10::new();
    let v11 = up.push(original.clone()).unwrap();
    let back = down.push(v11.into_iter().next().unwrap()).unwrap();

    assert_eq!(back[0], original);
}
