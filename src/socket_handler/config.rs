//! Configuration structures consumed by the socket handler lifecycle.
//!
//! `SocketHandlerBuilder` and the INI loader construct these values before
//! passing them to [`FemtoSocketHandler`](super::FemtoSocketHandler).

use std::time::Duration;

use crate::level::FemtoLevel;

/// Default connection timeout applied when establishing sockets.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(60);
/// Default write timeout; zero leaves socket writes without a timeout.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::ZERO;

/// Settings describing how a [`FemtoSocketHandler`](super::FemtoSocketHandler)
/// connects and which records it accepts.
#[derive(Clone, Debug, PartialEq)]
pub struct SocketHandlerConfig {
    pub connect_timeout: Duration,
    pub write_timeout: Duration,
    pub persistent: bool,
    /// Records below this level are skipped.
    pub level: FemtoLevel,
}

impl Default for SocketHandlerConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            persistent: false,
            level: FemtoLevel::Trace,
        }
    }
}

impl SocketHandlerConfig {
    /// Select persistent or transient connections.
    pub fn with_persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    /// Override the minimum handled level.
    pub fn with_level(mut self, level: FemtoLevel) -> Self {
        self.level = level;
        self
    }
}
