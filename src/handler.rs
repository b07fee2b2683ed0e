//! Handler trait and the failure taxonomy shared by socket delivery.

use std::io;

use thiserror::Error;

use crate::{formatter::FormatError, level::FemtoLevel, log_record::FemtoLogRecord};

/// Errors surfaced by the socket handler.
///
/// Every failure is returned to the immediate caller. Write failures report
/// how many bytes of the payload the socket accepted before giving up so the
/// caller can decide whether a resend would duplicate data.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The target address could not be parsed.
    #[error("invalid connection string {input:?}: {reason}")]
    InvalidConnectionString { input: String, reason: &'static str },
    /// The formatter could not produce a payload; nothing was sent.
    #[error(transparent)]
    Format(#[from] FormatError),
    /// A configuration value was out of range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The connect primitive failed.
    #[error("failed connecting to {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: io::Error,
    },
    /// The write timeout could not be applied to a fresh connection.
    #[error("failed setting write timeout on connection to {target}: {source}")]
    TimeoutApply {
        target: String,
        #[source]
        source: io::Error,
    },
    /// The socket rejected a write outright.
    #[error("could not write to socket ({sent} of {total} bytes sent): {source}")]
    Write {
        sent: usize,
        total: usize,
        #[source]
        source: io::Error,
    },
    /// A partial write was followed by a timed-out stream.
    #[error("last write timed out ({sent} of {total} bytes sent)")]
    WriteTimeout { sent: usize, total: usize },
    /// A partial write was followed by the stream reporting end-of-file.
    #[error("end of stream reached, peer probably disconnected ({sent} of {total} bytes sent)")]
    ConnectionLost { sent: usize, total: usize },
}

impl HandlerError {
    /// Bytes of the payload accepted by the socket before a write failure.
    ///
    /// Returns `None` for failures raised before any write was attempted.
    pub fn bytes_sent(&self) -> Option<usize> {
        match self {
            HandlerError::Write { sent, .. }
            | HandlerError::WriteTimeout { sent, .. }
            | HandlerError::ConnectionLost { sent, .. } => Some(*sent),
            _ => None,
        }
    }
}

/// Trait implemented by handlers that deliver records synchronously.
///
/// Handlers own their connection and take `&mut self`; share one across
/// threads by wrapping it in a mutex.
pub trait FemtoHandlerTrait: Send {
    /// Whether a record at `level` would be processed.
    fn is_handling(&self, level: FemtoLevel) -> bool;

    /// Format and deliver `record`.
    ///
    /// Returns `Ok(false)` when the record is below the handler's threshold
    /// and nothing was sent. A formatter failure is returned before any
    /// connect or write.
    fn handle(&mut self, record: &FemtoLogRecord) -> Result<bool, HandlerError>;

    /// Release the handler's connection.
    fn close(&mut self);
}
