//! Storage configuration types.

use std::time::Duration;

pub use till_shared::config::StorageProvider;

/// Storage service configuration.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Storage provider configuration.
    pub provider: StorageProvider,
    /// Upper bound for a single blob operation.
    pub io_timeout: Duration,
}

impl StorageConfig {
    /// Default I/O timeout: 10 seconds.
    pub const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(10);

    /// Create a new storage config with default settings.
    #[must_use]
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            io_timeout: Self::DEFAULT_IO_TIMEOUT,
        }
    }

    /// Set the per-operation timeout.
    #[must_use]
    pub fn with_io_timeout(mut self, timeout: Duration) -> Self {
        self.io_timeout = timeout;
        self
    }
}
