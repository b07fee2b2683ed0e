//! Builder for [`FemtoSocketHandler`](crate::socket_handler::FemtoSocketHandler).
//!
//! Collects the connection string, timeouts, persistence, level threshold
//! and formatter, validating everything before a handler is created.

use crate::{
    formatter::{FemtoFormatter, SharedFormatter},
    level::FemtoLevel,
    socket_handler::{
        FemtoSocketHandler, OsSocketProvider, SocketHandlerConfig, SocketProvider,
        connection_timeout_from_secs, write_timeout_from_secs,
    },
};

use super::{HandlerBuildError, HandlerBuilderTrait};

macro_rules! option_setter {
    ($(#[$meta:meta])* $fn_name:ident, $field:ident, $ty:ty) => {
        $(#[$meta])*
        pub fn $fn_name(mut self, value: $ty) -> Self {
            self.$field = Some(value);
            self
        }
    };
}

/// Builder for constructing [`FemtoSocketHandler`] instances.
#[derive(Clone, Debug, Default)]
pub struct SocketHandlerBuilder {
    connection_string: Option<String>,
    connection_timeout_secs: Option<f64>,
    write_timeout_secs: Option<f64>,
    persistent: Option<bool>,
    level: Option<FemtoLevel>,
    formatter: Option<SharedFormatter>,
}

impl SocketHandlerBuilder {
    /// Create a new builder with no target configured.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target, e.g. `tcp://logs.internal:5140` or `unix:///run/log.sock`.
    pub fn with_connection_string(mut self, connection_string: impl Into<String>) -> Self {
        self.connection_string = Some(connection_string.into());
        self
    }

    option_setter!(
        #[doc = "Set the connection timeout in seconds."]
        with_connection_timeout_secs,
        connection_timeout_secs,
        f64
    );
    option_setter!(
        #[doc = "Set the write timeout in seconds; zero disables it."]
        with_write_timeout_secs,
        write_timeout_secs,
        f64
    );
    option_setter!(with_persistent, persistent, bool);
    option_setter!(with_level, level, FemtoLevel);

    /// Use `formatter` to turn records into bytes.
    pub fn with_formatter<F>(mut self, formatter: F) -> Self
    where
        F: FemtoFormatter + 'static,
    {
        self.formatter = Some(SharedFormatter::new(formatter));
        self
    }

    pub fn with_shared_formatter(mut self, formatter: SharedFormatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn connection_string(&self) -> Option<&str> {
        self.connection_string.as_deref()
    }

    fn validate_connection_string(&self) -> Result<&str, HandlerBuildError> {
        match self.connection_string.as_deref() {
            Some(target) => Ok(target),
            None => Err(HandlerBuildError::InvalidConfig(
                "socket handler requires a connection string".into(),
            )),
        }
    }

    fn build_config(&self) -> Result<SocketHandlerConfig, HandlerBuildError> {
        let mut config = SocketHandlerConfig::default();
        if let Some(seconds) = self.connection_timeout_secs {
            config.connect_timeout = connection_timeout_from_secs(seconds)?;
        }
        if let Some(seconds) = self.write_timeout_secs {
            config.write_timeout = write_timeout_from_secs(seconds)?;
        }
        if let Some(persistent) = self.persistent {
            config.persistent = persistent;
        }
        if let Some(level) = self.level {
            config.level = level;
        }
        Ok(config)
    }

    /// Build a handler on top of an arbitrary socket provider.
    pub fn build_with_provider<P: SocketProvider>(
        &self,
        provider: P,
    ) -> Result<FemtoSocketHandler<P>, HandlerBuildError> {
        let target = self.validate_connection_string()?;
        let config = self.build_config()?;
        let mut handler = FemtoSocketHandler::with_config(target, config, provider)?;
        if let Some(formatter) = &self.formatter {
            handler.set_shared_formatter(formatter.clone());
        }
        Ok(handler)
    }
}

impl HandlerBuilderTrait for SocketHandlerBuilder {
    type Handler = FemtoSocketHandler<OsSocketProvider>;

    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError> {
        self.build_with_provider(OsSocketProvider::default())
    }
}
