//! Fixtures returning `(MemorySocketProvider, FemtoSocketHandler)` pairs so
//! tests can drive a handler and inspect the provider it writes through.

use femtosocket::{
    FemtoLevel, FemtoLogRecord, FemtoSocketHandler, IdentityFormatter, MemorySocketProvider,
};
use rstest::fixture;

/// Handler for `localhost:1234` that writes message bytes verbatim.
#[fixture]
pub fn memory_handler() -> (MemorySocketProvider, FemtoSocketHandler<MemorySocketProvider>) {
    let provider = MemorySocketProvider::new();
    let mut handler = FemtoSocketHandler::with_provider("localhost:1234", provider.clone())
        .expect("valid connection string");
    handler.set_formatter(IdentityFormatter);
    (provider, handler)
}

/// A warning record carrying `message`.
pub fn record(message: &str) -> FemtoLogRecord {
    FemtoLogRecord::new("test", FemtoLevel::Warn, message)
}
