use thiserror::Error;

pub type Result<T, E = LinkError> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum LinkError {
    #[error("board not found: {0}")]
    BoardNotFound(String),
    #[error("block size mismatch: expected {expected} bytes, got {actual}")]
    BlockSize { expected: usize, actual: usize },
}
