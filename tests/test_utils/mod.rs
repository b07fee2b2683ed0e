//! Shared helpers for socket handler integration tests.
#![allow(dead_code, unused_imports)]

pub mod fixtures;
pub mod handle_expect;

pub use fixtures::{memory_handler, record};
pub use handle_expect::HandleExpect;
