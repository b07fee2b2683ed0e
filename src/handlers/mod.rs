//! Handler builders and associated traits.
//!
//! Provides a small builder API for constructing handlers in a type-safe
//! manner. Each builder implements [`HandlerBuilderTrait`], which returns the
//! concrete handler or a boxed [`FemtoHandlerTrait`] ready to be handed to a
//! logging pipeline.

use std::io;

use thiserror::Error;

use crate::handler::{FemtoHandlerTrait, HandlerError};

pub mod socket_builder;

pub use socket_builder::SocketHandlerBuilder;

/// Errors that may occur while building a handler.
#[derive(Debug, Error)]
pub enum HandlerBuildError {
    /// Invalid user supplied configuration.
    #[error("invalid handler configuration: {0}")]
    InvalidConfig(String),
    /// The handler rejected a validated value, such as a malformed
    /// connection string or an out-of-range timeout.
    #[error(transparent)]
    Handler(#[from] HandlerError),
    /// Underlying I/O error whilst reading configuration.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// Configuration file could not be parsed as INI.
    #[error("malformed configuration: {0}")]
    Parse(#[from] ini::ParseError),
}

/// Trait implemented by all handler builders.
pub trait HandlerBuilderTrait: Send + Sync {
    /// Concrete handler produced by the builder.
    type Handler: FemtoHandlerTrait + 'static;

    /// Build the concrete handler instance.
    fn build_inner(&self) -> Result<Self::Handler, HandlerBuildError>;

    /// Build the handler as a trait object.
    fn build(&self) -> Result<Box<dyn FemtoHandlerTrait>, HandlerBuildError> {
        Ok(Box::new(self.build_inner()?))
    }
}
