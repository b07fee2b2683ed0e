//! Public handler type exported by the crate.

use crate::{
    formatter::{FemtoFormatter, SharedFormatter},
    handler::{FemtoHandlerTrait, HandlerError},
    level::FemtoLevel,
    log_record::FemtoLogRecord,
};

use super::{
    config::SocketHandlerConfig,
    connection::{ConnectionManager, ConnectionState},
    connection_string::ConnectionString,
    provider::SocketProvider,
    timeout::TimeoutController,
    transport::OsSocketProvider,
};

/// Handler writing formatted records to a socket.
///
/// The connection string is validated on construction; the connection itself
/// is opened by the first write. Dropping the handler closes a transient
/// connection and leaves a persistent one open.
pub struct FemtoSocketHandler<P: SocketProvider = OsSocketProvider> {
    target: ConnectionString,
    timeouts: TimeoutController,
    persistent: bool,
    level: FemtoLevel,
    formatter: SharedFormatter,
    connection: ConnectionManager<P>,
}

impl FemtoSocketHandler<OsSocketProvider> {
    /// Construct a handler for `connection_string` using OS sockets and
    /// default configuration.
    pub fn new(connection_string: &str) -> Result<Self, HandlerError> {
        Self::with_provider(connection_string, OsSocketProvider::default())
    }
}

impl<P: SocketProvider> FemtoSocketHandler<P> {
    /// Construct a handler with default configuration on top of `provider`.
    pub fn with_provider(connection_string: &str, provider: P) -> Result<Self, HandlerError> {
        Self::with_config(connection_string, SocketHandlerConfig::default(), provider)
    }

    /// Construct the handler from a configuration object.
    pub fn with_config(
        connection_string: &str,
        config: SocketHandlerConfig,
        provider: P,
    ) -> Result<Self, HandlerError> {
        let target = ConnectionString::parse(connection_string)?;
        let timeouts = TimeoutController::from_config(&config)?;
        Ok(Self {
            target,
            timeouts,
            persistent: config.persistent,
            level: config.level,
            formatter: SharedFormatter::default(),
            connection: ConnectionManager::new(provider),
        })
    }

    /// Deliver an already formatted payload.
    pub fn write(&mut self, payload: &[u8]) -> Result<(), HandlerError> {
        self.connection
            .send(&self.target, &self.timeouts, self.persistent, payload)
    }

    /// Close a transient connection; persistent connections stay open.
    pub fn close(&mut self) {
        self.connection.close();
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_connected()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection.state()
    }

    /// The connection string exactly as supplied.
    pub fn connection_string(&self) -> &str {
        self.target.as_str()
    }

    pub fn target(&self) -> &ConnectionString {
        &self.target
    }

    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    /// Choose persistent connections for the next connect.
    pub fn set_persistent(&mut self, persistent: bool) {
        self.persistent = persistent;
    }

    /// Connection timeout in seconds.
    pub fn connection_timeout(&self) -> f64 {
        self.timeouts.connection_timeout()
    }

    /// Set the connection timeout in seconds; must be greater than zero.
    pub fn set_connection_timeout(&mut self, seconds: f64) -> Result<(), HandlerError> {
        self.timeouts.set_connection_timeout(seconds)
    }

    /// Write timeout in seconds; zero disables it.
    pub fn write_timeout(&self) -> f64 {
        self.timeouts.write_timeout()
    }

    /// Set the write timeout in seconds; must not be negative.
    ///
    /// Applies to connections opened after the call.
    pub fn set_write_timeout(&mut self, seconds: f64) -> Result<(), HandlerError> {
        self.timeouts.set_write_timeout(seconds)
    }

    pub fn level(&self) -> FemtoLevel {
        self.level
    }

    pub fn set_level(&mut self, level: FemtoLevel) {
        self.level = level;
    }

    pub fn set_formatter<F>(&mut self, formatter: F)
    where
        F: FemtoFormatter + 'static,
    {
        self.formatter = SharedFormatter::new(formatter);
    }

    pub fn set_shared_formatter(&mut self, formatter: SharedFormatter) {
        self.formatter = formatter;
    }

    pub fn provider(&self) -> &P {
        self.connection.provider()
    }
}

impl<P> FemtoHandlerTrait for FemtoSocketHandler<P>
where
    P: SocketProvider + Send,
    P::Handle: Send,
{
    fn is_handling(&self, level: FemtoLevel) -> bool {
        level >= self.level
    }

    fn handle(&mut self, record: &FemtoLogRecord) -> Result<bool, HandlerError> {
        if !self.is_handling(record.level) {
            return Ok(false);
        }
        let payload = self.formatter.format(record)?;
        self.write(&payload)?;
        Ok(true)
    }

    fn close(&mut self) {
        FemtoSocketHandler::close(self);
    }
}

impl<P: SocketProvider> Drop for FemtoSocketHandler<P> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<P: SocketProvider> std::fmt::Debug for FemtoSocketHandler<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FemtoSocketHandler")
            .field("connection_string", &self.target.as_str())
            .field("persistent", &self.persistent)
            .field("level", &self.level)
            .field("state", &self.connection.state())
            .finish()
    }
}
