//! Formatters turning log records into the byte strings written to a socket.
//!
//! Provides the core [`FemtoFormatter`] trait together with
//! [`SharedFormatter`], the cloneable trait object stored by handlers and
//! builders. The socket handler performs no framing of its own, so formatters
//! that feed line-oriented collectors terminate their output with `\n`.

use std::{fmt, sync::Arc};

use chrono::{DateTime, SecondsFormat, Utc};
use thiserror::Error;

use crate::log_record::FemtoLogRecord;

mod msgpack;

pub use msgpack::MessagePackFormatter;

/// A record could not be turned into bytes.
#[derive(Debug, Error)]
#[error("failed to format record: {0}")]
pub struct FormatError(pub String);

/// Trait for formatting log records into byte strings.
///
/// Implementors must be thread-safe (`Send + Sync`) so formatters can be
/// shared between handlers.
pub trait FemtoFormatter: Send + Sync {
    /// Format a log record into the bytes sent over the wire.
    fn format(&self, record: &FemtoLogRecord) -> Result<Vec<u8>, FormatError>;
}

/// Shared formatter trait object used across handlers.
#[derive(Clone)]
pub struct SharedFormatter {
    inner: Arc<dyn FemtoFormatter>,
}

impl SharedFormatter {
    /// Create a shared formatter from an owned formatter implementation.
    pub fn new<F>(formatter: F) -> Self
    where
        F: FemtoFormatter + 'static,
    {
        Self {
            inner: Arc::new(formatter),
        }
    }

    /// Wrap an existing shared formatter trait object.
    pub fn from_arc(inner: Arc<dyn FemtoFormatter>) -> Self {
        Self { inner }
    }

    /// Format a log record using the wrapped formatter instance.
    pub fn format(&self, record: &FemtoLogRecord) -> Result<Vec<u8>, FormatError> {
        self.inner.format(record)
    }
}

impl Default for SharedFormatter {
    fn default() -> Self {
        Self::new(DefaultFormatter)
    }
}

impl fmt::Debug for SharedFormatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SharedFormatter(<dyn FemtoFormatter>)")
    }
}

/// `logger: LEVEL - message` followed by a newline.
#[derive(Copy, Clone, Debug, Default)]
pub struct DefaultFormatter;

impl FemtoFormatter for DefaultFormatter {
    fn format(&self, record: &FemtoLogRecord) -> Result<Vec<u8>, FormatError> {
        Ok(format!("{}: {} - {}\n", record.logger, record.level, record.message).into_bytes())
    }
}

/// Emits the message bytes untouched.
///
/// Useful when the caller already produced the final wire representation.
#[derive(Copy, Clone, Debug, Default)]
pub struct IdentityFormatter;

impl FemtoFormatter for IdentityFormatter {
    fn format(&self, record: &FemtoLogRecord) -> Result<Vec<u8>, FormatError> {
        Ok(record.message.as_bytes().to_vec())
    }
}

/// Timestamped single-line format:
/// `[2024-01-01T00:00:00.000000Z] logger.LEVEL: message {key=value}`.
///
/// The key-value block is omitted when the record carries no pairs.
#[derive(Copy, Clone, Debug, Default)]
pub struct LineFormatter;

impl FemtoFormatter for LineFormatter {
    fn format(&self, record: &FemtoLogRecord) -> Result<Vec<u8>, FormatError> {
        let timestamp: DateTime<Utc> = record.metadata.timestamp.into();
        let mut line = format!(
            "[{}] {}.{}: {}",
            timestamp.to_rfc3339_opts(SecondsFormat::Micros, true),
            record.logger,
            record.level,
            record.message
        );
        if !record.metadata.key_values.is_empty() {
            let pairs: Vec<String> = record
                .metadata
                .key_values
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .collect();
            line.push_str(" {");
            line.push_str(&pairs.join(", "));
            line.push('}');
        }
        line.push('\n');
        Ok(line.into_bytes())
    }
}
