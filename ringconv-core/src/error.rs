use thiserror::Error;

/// Errors produced by the transform and mediator layers.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Format(#[from] ringfmt::Error),

    #[error("no conversion rule for input type tag {0}")]
    UnsupportedType(u32),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
