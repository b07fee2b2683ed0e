//! Operating-system transport primitives for the socket handler.

use std::{
    collections::HashMap,
    io::{self, Write},
    net::{Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, TcpStream, ToSocketAddrs, UdpSocket},
    sync::Arc,
    time::Duration,
};

use log::debug;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

#[cfg(unix)]
use std::os::unix::net::UnixStream;

use super::{
    connection_string::{ConnectionString, Scheme},
    provider::{SocketProvider, StreamMetadata},
};

/// Active socket connection state.
#[derive(Debug)]
pub enum ActiveConnection {
    PlainTcp(TcpStream),
    Udp(UdpSocket),
    #[cfg(unix)]
    Unix(UnixStream),
}

impl ActiveConnection {
    /// Update the write timeout for the underlying socket.
    pub fn set_write_timeout(&self, timeout: Option<Duration>) -> io::Result<()> {
        match self {
            ActiveConnection::PlainTcp(stream) => stream.set_write_timeout(timeout),
            ActiveConnection::Udp(socket) => socket.set_write_timeout(timeout),
            #[cfg(unix)]
            ActiveConnection::Unix(stream) => stream.set_write_timeout(timeout),
        }
    }

    /// Issue a single write, returning the number of bytes accepted.
    pub fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            ActiveConnection::PlainTcp(stream) => stream.write(buf),
            ActiveConnection::Udp(socket) => socket.send(buf),
            #[cfg(unix)]
            ActiveConnection::Unix(stream) => stream.write(buf),
        }
    }

    fn shutdown(&self) {
        let _ = match self {
            ActiveConnection::PlainTcp(stream) => stream.shutdown(Shutdown::Both),
            ActiveConnection::Udp(_) => Ok(()),
            #[cfg(unix)]
            ActiveConnection::Unix(stream) => stream.shutdown(Shutdown::Both),
        };
    }
}

fn resolve(target: &ConnectionString) -> io::Result<Vec<SocketAddr>> {
    let port = target.port().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("no port given for {}", target.host()),
        )
    })?;
    (target.host(), port)
        .to_socket_addrs()
        .map(|iter| iter.collect())
}

fn no_address(target: &ConnectionString) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} did not resolve to any address", target.host()),
    )
}

fn connect_tcp(target: &ConnectionString, timeout: Duration) -> io::Result<TcpStream> {
    let mut last_err = None;
    for addr in resolve(target)? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                stream.set_nonblocking(false)?;
                return Ok(stream);
            }
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| no_address(target)))
}

fn connect_udp(target: &ConnectionString) -> io::Result<UdpSocket> {
    let mut last_err = None;
    for addr in resolve(target)? {
        let local: SocketAddr = if addr.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        match UdpSocket::bind(local).and_then(|socket| socket.connect(addr).map(|()| socket)) {
            Ok(socket) => return Ok(socket),
            Err(err) => last_err = Some(err),
        }
    }
    Err(last_err.unwrap_or_else(|| no_address(target)))
}

/// Establish a socket connection to `target`.
pub fn connect_transport(
    target: &ConnectionString,
    connect_timeout: Duration,
) -> io::Result<ActiveConnection> {
    match target.effective_scheme() {
        Scheme::Tcp => connect_tcp(target, connect_timeout).map(ActiveConnection::PlainTcp),
        Scheme::Udp => connect_udp(target).map(ActiveConnection::Udp),
        Scheme::Unix => {
            #[cfg(unix)]
            {
                let stream = UnixStream::connect(target.host())?;
                Ok(ActiveConnection::Unix(stream))
            }
            #[cfg(not(unix))]
            {
                let _ = connect_timeout;
                Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    "unix domain sockets are not supported on this platform",
                ))
            }
        }
    }
}

fn pool_key(target: &ConnectionString) -> String {
    match target.port() {
        Some(port) => format!("{}://{}:{port}", target.effective_scheme().as_str(), target.host()),
        None => format!("{}://{}", target.effective_scheme().as_str(), target.host()),
    }
}

static GLOBAL_POOL: Lazy<Arc<PersistentPool>> = Lazy::new(|| Arc::new(PersistentPool::default()));

/// Idle persistent connections, keyed by normalised target.
///
/// A connection is removed from the pool when a handler checks it out and
/// only returns when that handler releases it, so no two handlers ever write
/// through the same socket. Several idle connections may exist per target.
#[derive(Debug, Default)]
pub struct PersistentPool {
    idle: Mutex<HashMap<String, Vec<ActiveConnection>>>,
}

impl PersistentPool {
    /// The process-wide pool used by [`OsSocketProvider::default`].
    pub fn global() -> Arc<Self> {
        Arc::clone(&GLOBAL_POOL)
    }

    /// Number of idle connections across all targets.
    pub fn len(&self) -> usize {
        self.idle.lock().values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take an idle connection for `key`, or open a new one.
    ///
    /// The pool lock is only held to look up and remove an idle entry;
    /// `connect` runs unlocked so a slow target cannot stall other targets.
    fn checkout_or_connect(
        &self,
        key: &str,
        connect: impl FnOnce() -> io::Result<ActiveConnection>,
    ) -> io::Result<ActiveConnection> {
        if let Some(idle) = self.checkout(key) {
            debug!("reusing persistent connection to {key}");
            return Ok(idle);
        }
        connect()
    }

    fn checkout(&self, key: &str) -> Option<ActiveConnection> {
        let mut idle = self.idle.lock();
        let connections = idle.get_mut(key)?;
        let connection = connections.pop();
        if connections.is_empty() {
            idle.remove(key);
        }
        connection
    }

    fn checkin(&self, key: String, connection: ActiveConnection) {
        debug!("returning persistent connection to {key} to the pool");
        self.idle.lock().entry(key).or_default().push(connection);
    }
}

/// Handle returned by [`OsSocketProvider`].
///
/// Owns its socket outright; persistent handles remember the pool key they
/// go back under when released.
#[derive(Debug)]
pub struct OsHandle {
    connection: ActiveConnection,
    pool_key: Option<String>,
    timed_out: bool,
    eof: bool,
}

impl OsHandle {
    fn new(connection: ActiveConnection, pool_key: Option<String>) -> Self {
        Self {
            connection,
            pool_key,
            timed_out: false,
            eof: false,
        }
    }

    pub fn connection(&self) -> &ActiveConnection {
        &self.connection
    }

    /// Whether the handle returns to the persistent pool on release.
    pub fn is_persistent(&self) -> bool {
        self.pool_key.is_some()
    }

    /// Translate the outcome of one socket write into a byte count and the
    /// timed-out and end-of-stream flags reported by `metadata`.
    fn observe(&mut self, result: io::Result<usize>, requested: usize) -> io::Result<usize> {
        self.timed_out = false;
        match result {
            Ok(0) if requested > 0 => {
                self.eof = true;
                Ok(0)
            }
            Ok(count) => Ok(count),
            Err(err)
                if matches!(err.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) =>
            {
                self.timed_out = true;
                Ok(0)
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => Ok(0),
            Err(err) => Err(err),
        }
    }
}

/// Provider performing real socket I/O.
#[derive(Clone, Debug)]
pub struct OsSocketProvider {
    pool: Arc<PersistentPool>,
}

impl Default for OsSocketProvider {
    fn default() -> Self {
        Self::with_pool(PersistentPool::global())
    }
}

impl OsSocketProvider {
    /// Provider backed by the process-wide persistent pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider backed by an isolated persistent pool.
    pub fn with_pool(pool: Arc<PersistentPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<PersistentPool> {
        &self.pool
    }
}

impl SocketProvider for OsSocketProvider {
    type Handle = OsHandle;

    fn connect(
        &mut self,
        target: &ConnectionString,
        timeout: Duration,
        persistent: bool,
    ) -> io::Result<OsHandle> {
        if !persistent {
            return connect_transport(target, timeout).map(|conn| OsHandle::new(conn, None));
        }
        let key = pool_key(target);
        let connection = self
            .pool
            .checkout_or_connect(&key, || connect_transport(target, timeout))?;
        Ok(OsHandle::new(connection, Some(key)))
    }

    fn apply_write_timeout(
        &mut self,
        handle: &mut OsHandle,
        timeout: Option<Duration>,
    ) -> io::Result<()> {
        handle.connection.set_write_timeout(timeout)
    }

    fn write(&mut self, handle: &mut OsHandle, bytes: &[u8]) -> io::Result<usize> {
        let result = handle.connection.write(bytes);
        handle.observe(result, bytes.len())
    }

    fn metadata(&mut self, handle: &OsHandle) -> StreamMetadata {
        StreamMetadata {
            timed_out: handle.timed_out,
            eof: handle.eof,
        }
    }

    fn close(&mut self, handle: OsHandle) {
        handle.connection.shutdown();
    }

    fn release(&mut self, handle: OsHandle) {
        match handle.pool_key {
            Some(key) if !handle.eof => self.pool.checkin(key, handle.connection),
            _ => handle.connection.shutdown(),
        }
    }
}
