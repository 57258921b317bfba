//! The mediator layer: the streaming loop that drives one transform
//! across an unbounded input, plus the version-pair dispatch registry.

mod framing;
mod source_sink;

pub use source_sink::{Sink, Source};

use crate::config::ConvertConfig;
use crate::error::Result;
use crate::transform::{Transform, V10ToV11, V10ToV8, V11ToV10, V8ToV10};

/// A dialect generation, as selected by the host program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectVersion {
    V8,
    V10,
    V11,
}

/// Drives one conversion stream to completion.
pub trait RunMediator {
    /// Pulls from the source, transforms, and pushes to the sink until
    /// end of stream, then flushes. Returns once the stream is drained.
    fn run(&mut self) -> Result<()>;
}

/// Looks up the mediator for a `(from, to)` version pair and wires it to
/// the given source and sink. A compile-time match keeps the four
/// supported pairs exhaustively checked; unsupported pairs are a host
/// program configuration error, not a core concern (see `ringconv`'s
/// `ConfigError`), so this returns `None` rather than failing itself.
pub fn build(
    from: DialectVersion,
    to: DialectVersion,
    config: ConvertConfig,
    source: Box<dyn Source>,
    sink: Box<dyn Sink>,
) -> Option<Box<dyn RunMediator>> {
    match (from, to) {
        (DialectVersion::V10, DialectVersion::V8) => {
            Some(Box::new(V10ToV8Mediator::new(config, source, sink)))
        }
        (DialectVersion::V8, DialectVersion::V10) => {
            Some(Box::new(V8ToV10Mediator::new(config, source, sink)))
        }
        (DialectVersion::V10, DialectVersion::V11) => {
            Some(Box::new(V10ToV11Mediator::new(source, sink)))
        }
        (DialectVersion::V11, DialectVersion::V10) => {
            Some(Box::new(V11ToV10Mediator::new(source, sink)))
        }
        _ => None,
    }
}

pub struct V10ToV8Mediator {
    config: ConvertConfig,
    source: Box<dyn Source>,
    sink: Box<dyn Sink>,
    transform: V10ToV8,
}

impl V10ToV8Mediator {
    pub fn new(config: ConvertConfig, source: Box<dyn Source>, sink: Box<dyn Sink>) -> Self {
        Self {
            config,
            source,
            sink,
            transform: V10ToV8::new(config),
        }
    }

    fn write(&mut self, record: &ringfmt::v8::Record) -> Result<()> {
        let bytes = ringfmt::v8::encode_buffer(record, self.config.v8_buffer_size)?;
        self.sink.write(&bytes)?;
        Ok(())
    }
}

impl RunMediator for V10ToV8Mediator {
    fn run(&mut self) -> Result<()> {
        loop {
            let buf = match framing::pull_v10(&mut *self.source)? {
                None => break,
                Some(buf) => buf,
            };
            match ringfmt::v10::decode_item(&buf) {
                Ok((record, _)) => match self.transform.push(record) {
                    Ok(outs) => {
                        for out in &outs {
                            self.write(out)?;
                        }
                        let overflow = self.transform.drain_text_overflow();
                        for out in &overflow {
                            self.write(out)?;
                        }
                    }
                    Err(e) => log::warn!("v10->v8: dropping record: {e}"),
                },
                Err(e) => log::warn!("v10->v8: malformed input record: {e}"),
            }
        }
        for out in self.transform.flush() {
            self.write(&out)?;
        }
        self.sink.flush()?;
        Ok(())
    }
}

pub struct V8ToV10Mediator {
    config: ConvertConfig,
    source: Box<dyn Source>,
    sink: Box<dyn Sink>,
    transform: V8ToV10,
}

impl V8ToV10Mediator {
    pub fn new(config: ConvertConfig, source: Box<dyn Source>, sink: Box<dyn Sink>) -> Self {
        Self {
            config,
            source,
            sink,
            transform: V8ToV10::new(),
        }
    }

    fn write(&mut self, record: &ringfmt::v10::Record) -> Result<()> {
        self.sink.write(&ringfmt::v10::encode_item(record))?;
        Ok(())
    }
}

impl RunMediator for V8ToV10Mediator {
    fn run(&mut self) -> Result<()> {
        loop {
            let buf = match framing::pull_v8(&mut *self.source, self.config.v8_buffer_size)? {
                None => break,
                Some(buf) => buf,
            };
            match ringfmt::v8::decode_buffer(&buf, self.config.v8_size_policy) {
                Ok(record) => match self.transform.push(record) {
                    Ok(outs) => {
                        for out in &outs {
                            self.write(out)?;
                        }
                        let overflow = self.transform.drain_physics_overflow();
                        for out in &overflow {
                            self.write(out)?;
                        }
                    }
                    Err(e) => log::warn!("v8->v10: dropping record: {e}"),
                },
                Err(e) => log::warn!("v8->v10: malformed input buffer: {e}"),
            }
        }
        for out in self.transform.flush() {
            self.write(&out)?;
        }
        self.sink.flush()?;
        Ok(())
    }
}

pub struct V10ToV11Mediator {
    source: Box<dyn Source>,
    sink: Box<dyn Sink>,
    transform: V10ToV11,
}

impl V10ToV11Mediator {
    pub fn new(source: Box<dyn Source>, sink: Box<dyn Sink>) -> Self {
        Self {
            source,
            sink,
            transform: V10ToV11::new(),
        }
    }

    fn write(&mut self, record: &ringfmt::v11::Record) -> Result<()> {
        self.sink.write(&ringfmt::v11::encode_item(record))?;
        Ok(())
    }
}

impl RunMediator for V10ToV11Mediator {
    fn run(&mut self) -> Result<()> {
        self.write(&ringfmt::v11::Record::RingFormat {
            body: ringfmt::v11::record::RingFormatBody { major: 11, minor: 0 },
        })?;
        loop {
            let buf = match framing::pull_v10(&mut *self.source)? {
                None => break,
                Some(buf) => buf,
            };
            match ringfmt::v10::decode_item(&buf) {
                Ok((record, _)) => match self.transform.push(record) {
                    Ok(outs) => {
                        for out in &outs {
                            self.write(out)?;
                        }
                    }
                    Err(e) => log::warn!("v10->v11: dropping record: {e}"),
                },
                Err(e) => log::warn!("v10->v11: malformed input record: {e}"),
            }
        }
        for out in self.transform.flush() {
            self.write(&out)?;
        }
        self.sink.flush()?;
        Ok(())
    }
}

pub struct V11ToV10Mediator {
    source: Box<dyn Source>,
    sink: Box<dyn Sink>,
    transform: V11ToV10,
}

impl V11ToV10Mediator {
    pub fn new(source: Box<dyn Source>, sink: Box<dyn Sink>) -> Self {
        Self {
            source,
            sink,
            transform: V11ToV10::new(),
        }
    }

    fn write(&mut self, record: &ringfmt::v10::Record) -> Result<()> {
        self.sink.write(&ringfmt::v10::encode_item(record))?;
        Ok(())
    }
}

impl RunMediator for V11ToV10Mediator {
    fn run(&mut self) -> Result<()> {
        loop {
            let buf = match framing::pull_v11(&mut *self.source)? {
                None => break,
                Some(buf) => buf,
            };
            match ringfmt::v11::decode_item(&buf) {
                Ok((record, _)) => match self.transform.push(record) {
                    Ok(outs) => {
                        for out in &outs {
                            self.write(out)?;
                        }
                    }
                    Err(e) => log::warn!("v11->v10: dropping record: {e}"),
                },
                Err(e) => log::warn!("v11->v10: malformed input record: {e}"),
            }
        }
        for out in self.transform.flush() {
            self.write(&out)?;
        }
        self.sink.flush()?;
        Ok(())
    }
}
