//! Ring-item dialect converter — CLI host for `ringconv-core`'s mediator.
//!
//! Parses `--source`/`--sink` URIs, resolves a `(from, to)` version pair
//! to a mediator, and drives it to completion.

use std::fs::File;
use std::io::{self, Read, Write};

use clap::{Parser, ValueEnum};
use thiserror::Error;

use ringconv_core::{build, ConvertConfig, DialectVersion, Sink, Source};
use ringfmt::v8::SizePolicy;

/// NSCLDAQ ring-item / buffer dialect converter.
#[derive(Parser)]
#[command(name = "ringconv")]
struct Args {
    /// Input URI: `-`, `file://<path>`, or a bare path.
    #[arg(long)]
    source: String,

    /// Output URI: `-`, `file://<path>`, or a bare path.
    #[arg(long)]
    sink: String,

    /// Dialect of the input stream.
    #[arg(long = "input-version")]
    input_version: Version,

    /// Dialect to convert the stream into.
    #[arg(long = "output-version")]
    output_version: Version,

    /// Serialized size of every V8 buffer. Effective only when V8 is
    /// one of the two endpoints.
    #[arg(long = "v8-buffer-size", default_value_t = ringfmt::v8::DEFAULT_BUFFER_SIZE)]
    v8_buffer_size: usize,

    /// Convention delimiting events inside a V8 physics container.
    /// Effective only when the input dialect is V8.
    #[arg(long = "v8-size-policy", value_enum, default_value = "Inclusive16BitWords")]
    v8_size_policy: SizePolicyArg,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Version {
    #[value(name = "8")]
    V8,
    #[value(name = "10")]
    V10,
    #[value(name = "11")]
    V11,
}

impl From<Version> for DialectVersion {
    fn from(v: Version) -> Self {
        match v {
            Version::V8 => DialectVersion::V8,
            Version::V10 => DialectVersion::V10,
            Version::V11 => DialectVersion::V11,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum SizePolicyArg {
    #[value(name = "Inclusive16BitWords")]
    Inclusive16BitWords,
    #[value(name = "Exclusive16BitWords")]
    Exclusive16BitWords,
    #[value(name = "Inclusive32BitWords")]
    Inclusive32BitWords,
    #[value(name = "Inclusive32BitBytes")]
    Inclusive32BitBytes,
}

impl From<SizePolicyArg> for SizePolicy {
    fn from(p: SizePolicyArg) -> Self {
        match p {
            SizePolicyArg::Inclusive16BitWords => SizePolicy::Inclusive16BitWords,
            SizePolicyArg::Exclusive16BitWords => SizePolicy::Exclusive16BitWords,
            SizePolicyArg::Inclusive32BitWords => SizePolicy::Inclusive32BitWords,
            SizePolicyArg::Inclusive32BitBytes => SizePolicy::Inclusive32BitBytes,
        }
    }
}

/// Configuration errors: bad URI, unsupported version pair, or a
/// remote ring-buffer host (out of scope for this crate).
#[derive(Error, Debug)]
enum ConfigError {
    #[error("remote hosts are not supported: {0}")]
    RemoteNotSupported(String),
    #[error("no conversion rule from V{0} to V{1}")]
    UnsupportedPair(u8, u8),
    #[error("failed to open {uri}: {source}")]
    Open { uri: String, source: io::Error },
}

enum Endpoint {
    Stdio,
    File(String),
}

fn parse_endpoint(uri: &str) -> Result<Endpoint, ConfigError> {
    if uri == "-" {
        return Ok(Endpoint::Stdio);
    }
    if let Some(rest) = uri.strip_prefix("file://") {
        return Ok(Endpoint::File(rest.to_string()));
    }
    for scheme in ["tcp://", "ring://"] {
        if let Some(rest) = uri.strip_prefix(scheme) {
            let host = rest.split('/').next().unwrap_or("");
            if !host.is_empty() && host != "localhost" {
                return Err(ConfigError::RemoteNotSupported(uri.to_string()));
            }
            return Err(ConfigError::RemoteNotSupported(format!(
                "{uri} (ring-buffer IPC transport is not implemented)"
            )));
        }
    }
    Ok(Endpoint::File(uri.to_string()))
}

struct StdinSource {
    stdin: io::Stdin,
    at_eof: bool,
}

impl Source for StdinSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.stdin.lock().read(buf)?;
        if n == 0 {
            self.at_eof = true;
        }
        Ok(n)
    }

    fn eof(&self) -> bool {
        self.at_eof
    }

    fn clear_eof(&mut self) {
        self.at_eof = false;
    }
}

struct FileSource {
    file: File,
    at_eof: bool,
}

impl Source for FileSource {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.file.read(buf)?;
        if n == 0 {
            self.at_eof = true;
        }
        Ok(n)
    }

    fn eof(&self) -> bool {
        self.at_eof
    }

    fn clear_eof(&mut self) {
        self.at_eof = false;
    }
}

struct StdoutSink {
    stdout: io::Stdout,
}

impl Sink for StdoutSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.stdout.lock().write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.lock().flush()
    }
}

struct FileSink {
    file: File,
}

impl Sink for FileSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<()> {
        self.file.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

fn open_source(uri: &str) -> Result<Box<dyn Source>, ConfigError> {
    match parse_endpoint(uri)? {
        Endpoint::Stdio => Ok(Box::new(StdinSource {
            stdin: io::stdin(),
            at_eof: false,
        })),
        Endpoint::File(path) => {
            let file = File::open(&path).map_err(|source| ConfigError::Open {
                uri: uri.to_string(),
                source,
            })?;
            Ok(Box::new(FileSource { file, at_eof: false }))
        }
    }
}

fn open_sink(uri: &str) -> Result<Box<dyn Sink>, ConfigError> {
    match parse_endpoint(uri)? {
        Endpoint::Stdio => Ok(Box::new(StdoutSink { stdout: io::stdout() })),
        Endpoint::File(path) => {
            let file = File::create(&path).map_err(|source| ConfigError::Open {
                uri: uri.to_string(),
                source,
            })?;
            Ok(Box::new(FileSink { file }))
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let args = Args::parse();

    if let Err(e) = run(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let from: DialectVersion = args.input_version.into();
    let to: DialectVersion = args.output_version.into();

    let config = ConvertConfig {
        v8_buffer_size: args.v8_buffer_size,
        v8_size_policy: args.v8_size_policy.into(),
    };

    let source = open_source(&args.source)?;
    let sink = open_sink(&args.sink)?;

    let mut mediator = build(from, to, config, source, sink).ok_or_else(|| {
        ConfigError::UnsupportedPair(version_number(args.input_version), version_number(args.output_version))
    })?;

    mediator.run()?;
    Ok(())
}

fn version_number(v: Version) -> u8 {
    match v {
        Version::V8 => 8,
        Version::V10 => 10,
        Version::V11 => 11,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dash_is_stdio() {
        assert!(matches!(parse_endpoint("-").unwrap(), Endpoint::Stdio));
    }

    #[test]
    fn file_scheme_strips_prefix() {
        match parse_endpoint("file:///tmp/x.dat").unwrap() {
            Endpoint::File(p) => assert_eq!(p, "/tmp/x.dat"),
            _ => panic!("expected file endpoint"),
        }
    }

    #[test]
    fn bare_path_is_file() {
        match parse_endpoint("run0123.evt").unwrap() {
            Endpoint::File(p) => assert_eq!(p, "run0123.evt"),
            _ => panic!("expected file endpoint"),
        }
    }

    #[test]
    fn localhost_ring_uri_is_still_unimplemented() {
        assert!(matches!(
            parse_endpoint("ring://localhost/test"),
            Err(ConfigError::RemoteNotSupported(_))
        ));
    }

    #[test]
    fn remote_host_rejected() {
        assert!(matches!(
            parse_endpoint("tcp://otherhost/test"),
            Err(ConfigError::RemoteNotSupported(_))
        ));
    }
}
