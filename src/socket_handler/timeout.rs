//! Validation and application of connect and write timeouts.

use std::{io, time::Duration};

use crate::handler::HandlerError;

use super::{config::SocketHandlerConfig, provider::SocketProvider};

/// Holds the validated connect and write timeouts.
///
/// Changing a timeout only affects connections opened afterwards; a live
/// connection keeps the write timeout it was given when it connected.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeoutController {
    connect: Duration,
    write: Duration,
}

impl TimeoutController {
    /// Build a controller from `config`, validating both timeouts.
    pub fn from_config(config: &SocketHandlerConfig) -> Result<Self, HandlerError> {
        let connect = config.connect_timeout;
        if connect.is_zero() {
            return Err(HandlerError::InvalidArgument(
                "connection timeout must be greater than zero".into(),
            ));
        }
        Ok(Self {
            connect,
            write: config.write_timeout,
        })
    }

    /// Connection timeout in seconds.
    pub fn connection_timeout(&self) -> f64 {
        self.connect.as_secs_f64()
    }

    /// Write timeout in seconds; zero means writes never time out.
    pub fn write_timeout(&self) -> f64 {
        self.write.as_secs_f64()
    }

    /// Set the connection timeout. `seconds` must be positive.
    pub fn set_connection_timeout(&mut self, seconds: f64) -> Result<(), HandlerError> {
        self.connect = connection_timeout_from_secs(seconds)?;
        Ok(())
    }

    /// Set the write timeout. `seconds` must be zero or positive.
    pub fn set_write_timeout(&mut self, seconds: f64) -> Result<(), HandlerError> {
        self.write = write_timeout_from_secs(seconds)?;
        Ok(())
    }

    pub(crate) fn connect_duration(&self) -> Duration {
        self.connect
    }

    pub(crate) fn write_duration(&self) -> Option<Duration> {
        (!self.write.is_zero()).then_some(self.write)
    }

    /// Apply the write timeout to a freshly connected handle.
    pub(crate) fn apply<P: SocketProvider>(
        &self,
        provider: &mut P,
        handle: &mut P::Handle,
    ) -> io::Result<()> {
        provider.apply_write_timeout(handle, self.write_duration())
    }
}

/// Validate a connection timeout given in seconds.
pub(crate) fn connection_timeout_from_secs(seconds: f64) -> Result<Duration, HandlerError> {
    let timeout = seconds_to_duration("connection timeout", seconds)?;
    if timeout.is_zero() {
        return Err(HandlerError::InvalidArgument(format!(
            "connection timeout must be greater than zero, got {seconds}"
        )));
    }
    Ok(timeout)
}

/// Validate a write timeout given in seconds; zero disables the timeout.
pub(crate) fn write_timeout_from_secs(seconds: f64) -> Result<Duration, HandlerError> {
    seconds_to_duration("write timeout", seconds)
}

fn seconds_to_duration(name: &str, seconds: f64) -> Result<Duration, HandlerError> {
    if seconds == 0.0 {
        return Ok(Duration::ZERO);
    }
    if seconds < 0.0 {
        return Err(HandlerError::InvalidArgument(format!(
            "{name} must not be negative, got {seconds}"
        )));
    }
    let duration = Duration::try_from_secs_f64(seconds).map_err(|_| {
        HandlerError::InvalidArgument(format!(
            "{name} must be a finite number of seconds, got {seconds}"
        ))
    })?;
    if duration.is_zero() {
        return Err(HandlerError::InvalidArgument(format!(
            "{name} of {seconds} seconds is below the one nanosecond resolution"
        )));
    }
    Ok(duration)
}
