//! Centralized error handling for the buffer core
//! Defines the error kinds surfaced by the public API

use std::fmt;

/// Category of the error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed UTF-8 encountered while decoding input
    InvalidUtf8,
    /// A raw scalar value that is not a Unicode scalar (surrogate or > U+10FFFF)
    InvalidCodepoint,
    /// A position or offset outside the current buffer contents
    OutOfRange,
    /// File system or stream I/O errors
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidUtf8 => write!(f, "InvalidUtf8"),
            Self::InvalidCodepoint => write!(f, "InvalidCodepoint"),
            Self::OutOfRange => write!(f, "OutOfRange"),
            Self::Io => write!(f, "Io"),
        }
    }
}

/// A structured error raised by buffer operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferError {
    /// What kind of error occurred
    pub kind: ErrorKind,
    /// Human-readable description
    pub message: String,
}

impl BufferError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Shorthand for an out-of-range position error
    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OutOfRange, message)
    }

    /// Check if the message contains a substring (useful for tests)
    pub fn contains_msg(&self, sub: &str) -> bool {
        self.message.contains(sub)
    }
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl std::error::Error for BufferError {}

impl From<std::io::Error> for BufferError {
    fn from(err: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, err.to_string())
    }
}

/// Result alias for buffer operations
pub type Result<T> = std::result::Result<T, BufferError>;
