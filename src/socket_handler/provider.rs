//! The primitive socket operations the handler is built on.
//!
//! [`SocketProvider`] is the seam between connection management and real
//! I/O. [`OsSocketProvider`](super::OsSocketProvider) talks to the operating
//! system; [`MemorySocketProvider`](super::MemorySocketProvider) records
//! traffic in memory and can be scripted to fail.

use std::{io, time::Duration};

use super::connection_string::ConnectionString;

/// Live state reported by a handle after a partial write.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamMetadata {
    /// The most recent write stalled past the configured write timeout.
    pub timed_out: bool,
    /// The stream can no longer accept data.
    pub eof: bool,
}

/// Primitive operations on an opaque socket handle.
///
/// Failures are reported as `io::Error`; a successful `write` may accept
/// fewer bytes than offered, including zero.
pub trait SocketProvider {
    /// Opaque handle to one open connection.
    type Handle;

    /// Open a connection to `target`.
    ///
    /// With `persistent` set the provider may hand back an idle connection
    /// released by an earlier owner. The returned handle is never shared: a
    /// pooled connection belongs to one caller until it is released.
    fn connect(
        &mut self,
        target: &ConnectionString,
        timeout: Duration,
        persistent: bool,
    ) -> io::Result<Self::Handle>;

    /// Apply the write timeout to a live handle. `None` disables it.
    fn apply_write_timeout(
        &mut self,
        handle: &mut Self::Handle,
        timeout: Option<Duration>,
    ) -> io::Result<()>;

    /// Offer `bytes` to the socket, returning how many were accepted.
    fn write(&mut self, handle: &mut Self::Handle, bytes: &[u8]) -> io::Result<usize>;

    /// Inspect the handle after a partial write.
    fn metadata(&mut self, handle: &Self::Handle) -> StreamMetadata;

    /// Close the connection, including persistent connections.
    fn close(&mut self, handle: Self::Handle);

    /// Give up ownership of a healthy handle.
    ///
    /// Persistent handles stay open and become available to the next
    /// persistent connect for the same target. Transient handles are closed.
    fn release(&mut self, handle: Self::Handle);
}
