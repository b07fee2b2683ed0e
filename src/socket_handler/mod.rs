//! Socket-based logging handler implementation.
//!
//! This module defines `FemtoSocketHandler`, a handler that formats
//! [`FemtoLogRecord`](crate::log_record::FemtoLogRecord) values and writes
//! the bytes to a remote socket on the caller's thread. The handler validates
//! its connection string up front, connects lazily, retries partial writes
//! until the payload is delivered or the stream times out, and reports every
//! failure to the caller as a [`HandlerError`](crate::handler::HandlerError).
//!
//! Socket I/O goes through the [`SocketProvider`] trait so connection
//! management can run against real sockets ([`OsSocketProvider`]) or an
//! in-memory stand-in ([`MemorySocketProvider`]).

mod config;
mod connection;
mod connection_string;
mod handler;
mod memory;
mod provider;
mod timeout;
mod transport;
mod writer;


pub use config::{DEFAULT_CONNECT_TIMEOUT, DEFAULT_WRITE_TIMEOUT, SocketHandlerConfig};
pub use connection::{ConnectionManager, ConnectionState};
pub use connection_string::{ConnectionString, Scheme};
pub use handler::FemtoSocketHandler;
pub use memory::{CallCounts, MemoryHandle, MemorySocketProvider, ScriptedWrite};
pub use provider::{SocketProvider, StreamMetadata};
pub use timeout::TimeoutController;
pub(crate) use timeout::{connection_timeout_from_secs, write_timeout_from_secs};
pub use transport::{
    ActiveConnection, OsHandle, OsSocketProvider, PersistentPool, connect_transport,
};
