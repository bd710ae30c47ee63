//! Error kinds shared by every fallible operation in the crate.
//!
//! Each variant carries a short reason. Nothing inside the crate recovers from
//! an error; they are reported to the caller as-is.

use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Error {
    /// Malformed input: bad literal, bad gluing, wrong vector length, unsupported encoding.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// An operation was asked of an object that is not in a state to perform it.
    #[error("failed precondition: {0}")]
    FailedPrecondition(String),
    /// A value cannot be represented in the requested form.
    #[error("out of range: {0}")]
    OutOfRange(String),
    /// An internal consistency check failed. Always a bug.
    #[error("impossible scenario (please report): {0}")]
    ImpossibleScenario(String),
    #[error("not implemented: {0}")]
    NotImplemented(String),
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidArgument(reason.into())
    }

    pub(crate) fn precondition(reason: impl Into<String>) -> Self {
        Self::FailedPrecondition(reason.into())
    }

    pub(crate) fn out_of_range(reason: impl Into<String>) -> Self {
        Self::OutOfRange(reason.into())
    }

    pub(crate) fn impossible(reason: impl Into<String>) -> Self {
        Self::ImpossibleScenario(reason.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
