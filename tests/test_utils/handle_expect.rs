//! Helper trait for asserting handler acceptance in tests.
//!
//! The trait wraps `handle` calls with an expectation that they succeed so
//! tests do not repeat `.expect(...)` boilerplate.

use femtosocket::{FemtoHandlerTrait, FemtoLogRecord};

/// Extension trait to assert that a handler delivers a record.
pub trait HandleExpect {
    /// Dispatch `record` and panic if the handler rejects or skips it.
    fn expect_handle(&mut self, record: FemtoLogRecord);
}

impl<T: FemtoHandlerTrait + ?Sized> HandleExpect for T {
    fn expect_handle(&mut self, record: FemtoLogRecord) {
        let handled = self
            .handle(&record)
            .expect("expected handler to accept record");
        assert!(handled, "expected handler to process record at {}", record.level);
    }
}
