//! MessagePack serialisation of log records.

use rmp_serde::Serializer;
use serde::Serialize;

use crate::log_record::FemtoLogRecord;

use super::{FemtoFormatter, FormatError};

#[derive(Serialize)]
struct SerializableRecord<'a> {
    logger: &'a str,
    level: &'a str,
    message: &'a str,
    timestamp_ns: u128,
    thread_name: Option<&'a str>,
    key_values: &'a std::collections::BTreeMap<String, String>,
}

impl<'a> From<&'a FemtoLogRecord> for SerializableRecord<'a> {
    fn from(record: &'a FemtoLogRecord) -> Self {
        let timestamp_ns = record
            .metadata
            .timestamp
            .duration_since(std::time::UNIX_EPOCH)
            .map(|dur| dur.as_nanos())
            .unwrap_or_default();

        Self {
            logger: &record.logger,
            level: record.level.as_str(),
            message: &record.message,
            timestamp_ns,
            thread_name: record.metadata.thread_name.as_deref(),
            key_values: &record.metadata.key_values,
        }
    }
}

/// Serialises each record as a MessagePack map.
///
/// Records are concatenated on the wire without a length prefix; collectors
/// rely on MessagePack being self-delimiting.
#[derive(Copy, Clone, Debug, Default)]
pub struct MessagePackFormatter;

impl FemtoFormatter for MessagePackFormatter {
    fn format(&self, record: &FemtoLogRecord) -> Result<Vec<u8>, FormatError> {
        let mut buf = Vec::with_capacity(128);
        SerializableRecord::from(record)
            .serialize(&mut Serializer::new(&mut buf).with_struct_map())
            .map_err(|err| FormatError(format!("MessagePack encoding failed: {err}")))?;
        Ok(buf)
    }
}
