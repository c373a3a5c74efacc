use thiserror::Error;

pub type ListResult<T> = Result<T, ListError>;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ListError {
    /// an insert past `len` or a delete at or past `len`
    #[error("no position {index} in a list of length {len}")]
    OutOfRange { index: usize, len: usize },

    #[error("value of {len} bytes exceeds the maximum of {max}")]
    InvalidInput { len: usize, max: usize },

    #[error("could not allocate a node slot")]
    OutOfMemory,
}
