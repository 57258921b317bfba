//! Transform and mediator layers converting between NSCLDAQ ring-buffer
//! dialects. Byte-level encode/decode lives one layer down, in `ringfmt`;
//! this crate only knows how to map one dialect's records onto another's
//! and how to drive that mapping across a stream.

pub mod config;
pub mod error;
pub mod mediator;
pub mod transform;

pub use config::ConvertConfig;
pub use error::{Error, Result};
pub use mediator::{build, DialectVersion, RunMediator, Sink, Source};
pub use transform::{Transform, V10ToV11, V10ToV8, V11ToV10, V8ToV10};
