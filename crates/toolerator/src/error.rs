use thiserror::Error;

use crate::version::ProtocolVersion;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("out of memory while allocating {0} toolerator instances")]
    OutOfMemory(usize),
    #[error("config block truncated: need {expected} bytes, have {actual}")]
    ConfigTruncated { expected: usize, actual: usize },
    #[error("too many toolerator instances: {count} (max {max})")]
    TooManyInstances { count: usize, max: usize },
    #[error("toolerator instance {index} has a tool count of zero")]
    ZeroToolCount { index: usize },
    #[error("{block} buffer too small: need {expected} bytes, have {actual}")]
    BufferTooSmall {
        block: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("protocol version mismatch: driver {driver}, firmware {firmware}")]
    VersionMismatch {
        driver: ProtocolVersion,
        firmware: ProtocolVersion,
    },
    #[error("no toolerator instance at index {0}")]
    NoSuchInstance(usize),
    #[error("invalid protocol version: {0}")]
    InvalidVersion(String),
}
