//! Test utilities
//!
//! Manual mock implementations of the ports and fixtures for unit tests.
//! The mocks are plain in-memory structs so tests can inspect exactly what was
//! called and what was painted.

pub mod fixtures;
pub mod mocks;

pub use fixtures::*;
pub use mocks::*;
