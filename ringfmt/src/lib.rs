//! Byte codec and dialect model for the three NSCLDAQ ring-buffer wire
//! formats this workspace converts between: V8 (fixed-size packed
//! buffers), V10 (per-record ring items) and V11 (per-record ring items
//! with an optional body header).
//!
//! This crate only knows how to read and write each dialect's own bytes.
//! It has no notion of converting between dialects — that lives in
//! `ringconv-core`, one layer up.

pub mod byteio;
pub mod error;
pub mod raw;
pub mod v8;
pub mod v10;
pub mod v11;

pub use error::{Error, Result};
pub use raw::RawItem;
