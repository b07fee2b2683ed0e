//! Log record representation consumed by the socket handler.
//!
//! Records are built by the surrounding logging pipeline; the handler only
//! reads them to decide whether the level passes and to hand them to a
//! formatter.

use crate::level::FemtoLevel;
use std::collections::BTreeMap;
use std::fmt;
use std::thread;
use std::time::SystemTime;

/// Additional context associated with a log record.
#[derive(Clone, Debug)]
pub struct RecordMetadata {
    /// Time the record was created.
    pub timestamp: SystemTime,
    /// Name of the thread that created the record (if any).
    pub thread_name: Option<String>,
    /// Structured key-value pairs attached to the record.
    pub key_values: BTreeMap<String, String>,
}

impl Default for RecordMetadata {
    fn default() -> Self {
        Self {
            timestamp: SystemTime::now(),
            thread_name: thread::current().name().map(ToString::to_string),
            key_values: BTreeMap::new(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct FemtoLogRecord {
    /// Name of the logger that created this record.
    pub logger: String,
    pub level: FemtoLevel,
    /// The log message content.
    pub message: String,
    /// Contextual metadata for the record.
    pub metadata: RecordMetadata,
}

impl FemtoLogRecord {
    /// Construct a new log record from logger `name`, `level`, and `message`.
    pub fn new(logger: &str, level: FemtoLevel, message: &str) -> Self {
        Self {
            logger: logger.to_owned(),
            level,
            message: message.to_owned(),
            metadata: RecordMetadata::default(),
        }
    }

    /// Attach a structured key-value pair to the record.
    pub fn with_key_value(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.key_values.insert(key.into(), value.into());
        self
    }
}

impl fmt::Display for FemtoLogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.level, self.message)
    }
}
