use thiserror::Error;

/// Errors produced while decoding or encoding a ring-format record.
///
/// These map onto the error taxonomy shared by the codec and dialect
/// layers: parse failures are always one of [`Error::Underrun`],
/// [`Error::KindMismatch`], or [`Error::Malformed`]; serialization
/// failures are [`Error::Overflow`] or [`Error::PolicyViolation`].
#[derive(Error, Debug)]
pub enum Error {
    #[error("underrun: needed {needed} bytes, only {available} available")]
    Underrun { needed: usize, available: usize },

    #[error("policy violation: {0}")]
    PolicyViolation(String),

    #[error("inconsistent size: header declared {declared}, body has {actual}")]
    InconsistentSize { declared: u32, actual: u32 },

    #[error("kind mismatch: expected {expected}, got type tag {got}")]
    KindMismatch { expected: &'static str, got: u32 },

    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("overflow: attempted to write {attempted} bytes into a {limit}-byte buffer")]
    Overflow { attempted: usize, limit: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
