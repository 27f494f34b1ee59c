// shared/src/lib.rs

/// Failure of a core operation. Cloneable so a single upstream failure can be
/// handed to every caller waiting on the same load.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The payload carries the detail for logs; the display text stays fixed.
    #[error("Requested Data Not Found")]
    NotFound(String),
    #[error("Too Many Requests at the Moment. Please try after 1 minute")]
    RateLimited,
    #[error("Failed to create employee")]
    CreateFailed,
    #[error("No employees found to calculate highest salary")]
    NoEmployeesToAggregate,
    #[error("upstream: {0}")]
    Upstream(String),
    #[error("internal: {0}")]
    Internal(String),
}

/// Stable classification of an [`Error`], independent of its message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    RateLimited,
    CreateFailed,
    NoEmployeesToAggregate,
    Upstream,
    Internal,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::RateLimited => ErrorKind::RateLimited,
            Error::CreateFailed => ErrorKind::CreateFailed,
            Error::NoEmployeesToAggregate => ErrorKind::NoEmployeesToAggregate,
            Error::Upstream(_) => ErrorKind::Upstream,
            Error::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl ErrorKind {
    /// Only backpressure from the directory is worth retrying after a cool-down.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::RateLimited)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

pub mod config;
