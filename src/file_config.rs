//! INI configuration for socket handlers.
//!
//! Reads a `[handler_socket]` section with the keys below and produces a
//! [`SocketHandlerBuilder`]:
//!
//! ```ini
//! [handler_socket]
//! connection_string = tcp://logs.internal:5140
//! connection_timeout = 2.5
//! write_timeout = 1
//! persistent = yes
//! level = WARNING
//! formatter = line
//! ```
//!
//! Only `connection_string` is required. Values are validated again when the
//! builder produces a handler.

use std::{fs, io::ErrorKind, path::Path};

use ini::Ini;

use crate::{
    formatter::{
        DefaultFormatter, IdentityFormatter, LineFormatter, MessagePackFormatter, SharedFormatter,
    },
    handlers::{HandlerBuildError, SocketHandlerBuilder},
    level::FemtoLevel,
};

/// Section holding the socket handler settings.
pub const SOCKET_SECTION: &str = "handler_socket";

/// Load a socket handler builder from the INI file at `path`.
pub fn load_socket_config(
    path: impl AsRef<Path>,
) -> Result<SocketHandlerBuilder, HandlerBuildError> {
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(HandlerBuildError::InvalidConfig(format!(
                "{} doesn't exist",
                path.display()
            )));
        }
        Err(err) => return Err(err.into()),
    };
    if text.trim().is_empty() {
        return Err(HandlerBuildError::InvalidConfig(format!(
            "{} is an empty file",
            path.display()
        )));
    }
    parse_socket_config(&text)
}

/// Parse socket handler settings from INI text.
pub fn parse_socket_config(text: &str) -> Result<SocketHandlerBuilder, HandlerBuildError> {
    let ini = Ini::load_from_str(text)?;
    let section = ini.section(Some(SOCKET_SECTION)).ok_or_else(|| {
        HandlerBuildError::InvalidConfig(format!("missing [{SOCKET_SECTION}] section"))
    })?;

    let connection_string = section.get("connection_string").ok_or_else(|| {
        HandlerBuildError::InvalidConfig(format!(
            "[{SOCKET_SECTION}] requires connection_string"
        ))
    })?;
    let mut builder = SocketHandlerBuilder::new().with_connection_string(connection_string.trim());

    if let Some(value) = section.get("connection_timeout") {
        builder = builder.with_connection_timeout_secs(parse_seconds("connection_timeout", value)?);
    }
    if let Some(value) = section.get("write_timeout") {
        builder = builder.with_write_timeout_secs(parse_seconds("write_timeout", value)?);
    }
    if let Some(value) = section.get("persistent") {
        builder = builder.with_persistent(parse_bool("persistent", value)?);
    }
    if let Some(value) = section.get("level") {
        let level = value
            .parse::<FemtoLevel>()
            .map_err(|err| HandlerBuildError::InvalidConfig(err.to_string()))?;
        builder = builder.with_level(level);
    }
    if let Some(value) = section.get("formatter") {
        builder = builder.with_shared_formatter(formatter_by_name(value)?);
    }
    Ok(builder)
}

fn parse_seconds(key: &str, value: &str) -> Result<f64, HandlerBuildError> {
    value.trim().parse::<f64>().map_err(|_| {
        HandlerBuildError::InvalidConfig(format!(
            "{key} must be a number of seconds, got {value:?}"
        ))
    })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, HandlerBuildError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(HandlerBuildError::InvalidConfig(format!(
            "{key} must be a boolean, got {value:?}"
        ))),
    }
}

fn formatter_by_name(name: &str) -> Result<SharedFormatter, HandlerBuildError> {
    match name.trim().to_ascii_lowercase().as_str() {
        "default" => Ok(SharedFormatter::new(DefaultFormatter)),
        "line" => Ok(SharedFormatter::new(LineFormatter)),
        "identity" => Ok(SharedFormatter::new(IdentityFormatter)),
        "msgpack" | "messagepack" => Ok(SharedFormatter::new(MessagePackFormatter)),
        other => Err(HandlerBuildError::InvalidConfig(format!(
            "unknown formatter {other:?}"
        ))),
    }
}
