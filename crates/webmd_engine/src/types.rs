use std::fmt;

use bytes::Bytes;

/// Shape of the payload a caller wants back from a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    /// Decoded HTML text.
    Text,
    /// Raw bytes, e.g. an image.
    Binary,
}

impl PayloadKind {
    /// What is being fetched, for log lines.
    pub fn subject(self) -> &'static str {
        match self {
            PayloadKind::Text => "HTML",
            PayloadKind::Binary => "image",
        }
    }
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadKind::Text => write!(f, "text"),
            PayloadKind::Binary => write!(f, "buffer"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedBytes {
    pub bytes: Bytes,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    Text(String),
    Bytes(FetchedBytes),
}

impl FetchResult {
    pub fn into_text(self) -> Result<String, FetchError> {
        match self {
            FetchResult::Text(text) => Ok(text),
            FetchResult::Bytes(_) => Err(FetchError::new(
                FailureKind::ProcessingError,
                "expected text payload, got bytes",
            )),
        }
    }

    pub fn into_bytes(self) -> Result<FetchedBytes, FetchError> {
        match self {
            FetchResult::Bytes(fetched) => Ok(fetched),
            FetchResult::Text(_) => Err(FetchError::new(
                FailureKind::ProcessingError,
                "expected byte payload, got text",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("fetch failed: {kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    ProcessLaunch,
    ProcessExit(Option<i32>),
    ProcessingError,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::ProcessLaunch => write!(f, "could not launch http client"),
            FailureKind::ProcessExit(Some(code)) => write!(f, "http client exited with {code}"),
            FailureKind::ProcessExit(None) => write!(f, "http client killed by signal"),
            FailureKind::ProcessingError => write!(f, "processing error"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}
