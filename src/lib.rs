//! Blocking socket delivery for formatted log records.
//!
//! [`FemtoSocketHandler`] formats records, connects lazily to a TCP, UDP or
//! Unix domain socket, and writes each payload in full or reports exactly why
//! it could not.

pub mod file_config;
pub mod formatter;
pub mod handler;
pub mod handlers;
pub mod level;
pub mod log_record;
pub mod socket_handler;

pub use file_config::{load_socket_config, parse_socket_config};
pub use formatter::{
    DefaultFormatter, FemtoFormatter, FormatError, IdentityFormatter, LineFormatter,
    MessagePackFormatter, SharedFormatter,
};
pub use handler::{FemtoHandlerTrait, HandlerError};
pub use handlers::{HandlerBuildError, HandlerBuilderTrait, SocketHandlerBuilder};
pub use level::FemtoLevel;
pub use log_record::{FemtoLogRecord, RecordMetadata};
pub use socket_handler::{
    ConnectionState, ConnectionString, FemtoSocketHandler, MemorySocketProvider, OsSocketProvider,
    PersistentPool, Scheme, ScriptedWrite, SocketHandlerConfig, SocketProvider, StreamMetadata,
};
