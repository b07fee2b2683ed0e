//! Lifecycle of the single connection owned by a socket handler.

use std::fmt;

use log::debug;

use crate::handler::HandlerError;

use super::{
    connection_string::ConnectionString, provider::SocketProvider, timeout::TimeoutController,
    writer::write_payload,
};

/// Where the manager is in its connect/close cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
}

struct Connection<H> {
    handle: H,
    persistent: bool,
}

/// Owns at most one open handle and the provider that created it.
///
/// Connects lazily on the first send and reuses the handle until it is
/// closed. Any failed send discards the handle so the next send starts from a
/// fresh connect instead of a connection in an unknown state.
pub struct ConnectionManager<P: SocketProvider> {
    provider: P,
    state: ConnectionState,
    connection: Option<Connection<P::Handle>>,
}

impl<P: SocketProvider> ConnectionManager<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            state: ConnectionState::Disconnected,
            connection: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Deliver `payload`, connecting first when no connection is open.
    ///
    /// `persistent` only matters when a new connection has to be opened; an
    /// open connection keeps the persistence it was created with.
    pub fn send(
        &mut self,
        target: &ConnectionString,
        timeouts: &TimeoutController,
        persistent: bool,
        payload: &[u8],
    ) -> Result<(), HandlerError> {
        let mut connection = self.take_or_connect(target, timeouts, persistent)?;
        match write_payload(&mut self.provider, &mut connection.handle, payload) {
            Ok(()) => {
                self.connection = Some(connection);
                Ok(())
            }
            Err(err) => {
                debug!("discarding connection to {target} after failed write: {err}");
                self.provider.close(connection.handle);
                self.state = ConnectionState::Disconnected;
                Err(err)
            }
        }
    }

    /// Take the open connection out of the manager, connecting first when
    /// there is none. The caller puts it back once the write succeeds.
    fn take_or_connect(
        &mut self,
        target: &ConnectionString,
        timeouts: &TimeoutController,
        persistent: bool,
    ) -> Result<Connection<P::Handle>, HandlerError> {
        if let Some(connection) = self.connection.take() {
            return Ok(connection);
        }

        self.state = ConnectionState::Connecting;
        let mut handle = match self
            .provider
            .connect(target, timeouts.connect_duration(), persistent)
        {
            Ok(handle) => handle,
            Err(source) => {
                self.state = ConnectionState::Disconnected;
                return Err(HandlerError::Connection {
                    target: target.to_string(),
                    source,
                });
            }
        };

        if let Err(source) = timeouts.apply(&mut self.provider, &mut handle) {
            self.provider.close(handle);
            self.state = ConnectionState::Disconnected;
            return Err(HandlerError::TimeoutApply {
                target: target.to_string(),
                source,
            });
        }

        debug!(
            "connected to {target} ({})",
            if persistent { "persistent" } else { "transient" }
        );
        self.state = ConnectionState::Connected;
        Ok(Connection { handle, persistent })
    }

    /// Close a transient connection. Persistent connections stay open.
    pub fn close(&mut self) {
        match &self.connection {
            Some(connection) if connection.persistent => {}
            Some(_) => {
                if let Some(connection) = self.connection.take() {
                    self.provider.close(connection.handle);
                }
                self.state = ConnectionState::Disconnected;
                debug!("closed transient socket connection");
            }
            None => self.state = ConnectionState::Disconnected,
        }
    }
}

impl<P: SocketProvider> Drop for ConnectionManager<P> {
    fn drop(&mut self) {
        if let Some(connection) = self.connection.take() {
            self.provider.release(connection.handle);
        }
    }
}

impl<P: SocketProvider> fmt::Debug for ConnectionManager<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionManager")
            .field("state", &self.state)
            .field(
                "persistent",
                &self.connection.as_ref().map(|c| c.persistent),
            )
            .finish()
    }
}
