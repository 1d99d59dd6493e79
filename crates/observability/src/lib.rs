//! Process-wide logging for the SmartAir binaries.

pub mod tracing;

pub use crate::tracing::DEFAULT_FILTER;

/// Install JSON logging; later calls are no-ops.
pub fn init() {
    tracing::install(DEFAULT_FILTER);
}
