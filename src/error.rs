//! Status codes and the unified error type shared by decode and encode.

use std::borrow::Cow;

use thiserror::Error;

use crate::format::ImageFormat;

/// Terminal status of a codec operation.
///
/// The numeric values are stable and match the codes handed to bindings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    Success = 0,
    NoMemory = 1,
    WriteError = 2,
    InvalidSignature = 3,
    Failed = 4,
    ReadingPastEnd = 5,
    InvalidFormat = 6,
}

impl Status {
    /// Numeric status code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Short lowercase description, as surfaced to script callers.
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Success => "success",
            Status::NoMemory => "no memory",
            Status::WriteError => "write error",
            Status::InvalidSignature => "invalid signature",
            Status::Failed => "failed",
            Status::ReadingPastEnd => "reading past end",
            Status::InvalidFormat => "invalid format",
        }
    }

    /// Status of a finished operation.
    pub fn of<T>(result: &Result<T, CodecError>) -> Self {
        match result {
            Ok(_) => Status::Success,
            Err(e) => e.status(),
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned by every fallible codec operation.
///
/// Each variant corresponds to exactly one non-success [`Status`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CodecError {
    /// An allocation failed or a configured resource limit was exceeded.
    #[error("no memory: {0}")]
    NoMemory(Cow<'static, str>),

    /// The image could not be written (bad dimensions or encoder fault).
    #[error("write error: {0}")]
    WriteError(Cow<'static, str>),

    /// Input bytes carry no recognized container signature.
    #[error("invalid signature")]
    InvalidSignature,

    /// Decoding failed after the header was accepted.
    #[error("failed ({format:?}): {detail}")]
    Failed {
        format: ImageFormat,
        detail: Cow<'static, str>,
    },

    /// The stream ended before the decoder had all the bytes it needed.
    #[error("reading past end ({0:?})")]
    ReadingPastEnd(ImageFormat),

    /// A header or configuration value is structurally invalid.
    #[error("invalid format: {0}")]
    InvalidFormat(Cow<'static, str>),
}

impl CodecError {
    /// The status this error terminates with.
    pub fn status(&self) -> Status {
        match self {
            CodecError::NoMemory(_) => Status::NoMemory,
            CodecError::WriteError(_) => Status::WriteError,
            CodecError::InvalidSignature => Status::InvalidSignature,
            CodecError::Failed { .. } => Status::Failed,
            CodecError::ReadingPastEnd(_) => Status::ReadingPastEnd,
            CodecError::InvalidFormat(_) => Status::InvalidFormat,
        }
    }

    pub(crate) fn failed(format: ImageFormat, detail: impl Into<Cow<'static, str>>) -> Self {
        CodecError::Failed {
            format,
            detail: detail.into(),
        }
    }

    pub(crate) fn invalid_format(detail: impl Into<Cow<'static, str>>) -> Self {
        CodecError::InvalidFormat(detail.into())
    }

    pub(crate) fn write_error(detail: impl Into<Cow<'static, str>>) -> Self {
        CodecError::WriteError(detail.into())
    }

    pub(crate) fn no_memory(detail: impl Into<Cow<'static, str>>) -> Self {
        CodecError::NoMemory(detail.into())
    }
}
