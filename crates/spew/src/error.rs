//! Error types for rendering to external sinks.

use std::{fmt, io};

use thiserror::Error;

/// Error while writing a rendering to a sink.
///
/// Rendering into an in-memory buffer cannot fail; only handing the result
/// to the caller's writer can.
#[derive(Debug, Error)]
pub enum DumpError {
    #[error("failed to write dump output: {0}")]
    Io(#[from] io::Error),

    #[error("formatter rejected dump output")]
    Format(#[from] fmt::Error),
}

impl DumpError {
    /// Returns the underlying I/O error kind, if any.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            DumpError::Io(e) => Some(e.kind()),
            DumpError::Format(_) => None,
        }
    }
}
