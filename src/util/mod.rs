//! Shared helpers

#[cfg(any(test, feature = "testing"))]
pub mod testing;
