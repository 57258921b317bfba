//! The transform layer: four pairwise, rule-driven converters between
//! dialect records. Each owns whatever per-stream state its mapping
//! needs; the mediator drives `push`/`flush` without knowing which pair
//! it holds.

pub mod v10_to_v11;
pub mod v10_to_v8;
pub mod v11_to_v10;
pub mod v8_to_v10;

use crate::error::Result;

/// A stateful, rule-driven converter from one dialect's records to
/// another's. `push` may yield zero, one, or many output records for a
/// single input (the cardinality mismatches between dialects); `flush`
/// drains anything still held once the input stream ends.
pub trait Transform {
    type In;
    type Out;

    fn push(&mut self, input: Self::In) -> Result<Vec<Self::Out>>;
    fn flush(&mut self) -> Vec<Self::Out>;
}

pub use v10_to_v11::V10ToV11;
pub use v10_to_v8::V10ToV8;
pub use v11_to_v10::V11ToV10;
pub use v8_to_v10::V8ToV10;
