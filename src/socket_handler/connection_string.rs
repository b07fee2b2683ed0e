//! Parsing and validation of socket target addresses.

use std::{fmt, path::Path, str::FromStr};

use crate::handler::HandlerError;

/// Socket family selected by the connection string scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Scheme {
    Tcp,
    Udp,
    Unix,
}

impl Scheme {
    fn from_label(label: &str) -> Option<Self> {
        match label.to_ascii_lowercase().as_str() {
            "tcp" => Some(Self::Tcp),
            "udp" => Some(Self::Udp),
            "unix" => Some(Self::Unix),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Tcp => "tcp",
            Scheme::Udp => "udp",
            Scheme::Unix => "unix",
        }
    }
}

/// A validated socket target.
///
/// Accepts `scheme://host:port`, `host:port`, bare `host`, bracketed IPv6
/// literals and `unix:///path/to/socket`. The original input is retained so
/// it can be reported back verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ConnectionString {
    raw: String,
    scheme: Option<Scheme>,
    host: String,
    port: Option<u16>,
}

impl ConnectionString {
    /// Parse `raw`, rejecting inputs with no usable host segment.
    pub fn parse(raw: &str) -> Result<Self, HandlerError> {
        let invalid = |reason: &'static str| HandlerError::InvalidConnectionString {
            input: raw.to_owned(),
            reason,
        };

        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(invalid("connection string is empty"));
        }

        let (scheme, rest) = match trimmed.split_once("://") {
            Some((label, rest)) => {
                let scheme =
                    Scheme::from_label(label).ok_or_else(|| invalid("unsupported scheme"))?;
                (Some(scheme), rest)
            }
            None => (None, trimmed),
        };

        if scheme == Some(Scheme::Unix) {
            if rest.is_empty() {
                return Err(invalid("unix socket path is empty"));
            }
            return Ok(Self {
                raw: raw.to_owned(),
                scheme,
                host: rest.to_owned(),
                port: None,
            });
        }

        if rest.contains(['/', '?', '#']) {
            return Err(invalid("unexpected path after host"));
        }

        let (host, port) = split_host_port(rest).map_err(invalid)?;
        if host.is_empty() {
            return Err(invalid("host is empty"));
        }

        Ok(Self {
            raw: raw.to_owned(),
            scheme,
            host: host.to_owned(),
            port,
        })
    }

    /// The input exactly as supplied.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Explicit scheme, if one was given.
    pub fn scheme(&self) -> Option<Scheme> {
        self.scheme
    }

    /// Scheme used to connect; inputs without one default to TCP.
    pub fn effective_scheme(&self) -> Scheme {
        self.scheme.unwrap_or(Scheme::Tcp)
    }

    /// Host name, IP literal (without brackets) or socket path.
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Filesystem path for `unix://` targets.
    pub fn unix_path(&self) -> Option<&Path> {
        (self.effective_scheme() == Scheme::Unix).then(|| Path::new(&self.host))
    }
}

fn split_host_port(rest: &str) -> Result<(&str, Option<u16>), &'static str> {
    if let Some(bracketed) = rest.strip_prefix('[') {
        let (host, tail) = bracketed
            .split_once(']')
            .ok_or("unterminated IPv6 literal")?;
        return match tail {
            "" => Ok((host, None)),
            _ => {
                let port = tail.strip_prefix(':').ok_or("unexpected text after IPv6 literal")?;
                Ok((host, Some(parse_port(port)?)))
            }
        };
    }

    match rest.matches(':').count() {
        0 => Ok((rest, None)),
        1 => {
            let (host, port) = rest.split_once(':').ok_or("malformed host:port")?;
            Ok((host, Some(parse_port(port)?)))
        }
        // An unbracketed IPv6 literal cannot carry a port.
        _ => Ok((rest, None)),
    }
}

fn parse_port(port: &str) -> Result<u16, &'static str> {
    if port.is_empty() || !port.bytes().all(|b| b.is_ascii_digit()) {
        return Err("port must be a decimal number");
    }
    port.parse().map_err(|_| "port is out of range")
}

impl FromStr for ConnectionString {
    type Err = HandlerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
