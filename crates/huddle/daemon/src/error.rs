//! Error types for huddle-daemon

use huddle_allocator::AllocatorError;
use huddle_announcer::AnnouncerError;
use huddle_platform::PlatformError;
use thiserror::Error;

/// Daemon-level errors
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration could not be loaded or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// Placement setup error
    #[error("Allocator error: {0}")]
    Allocator(#[from] AllocatorError),

    /// Announcer setup error
    #[error("Announcer error: {0}")]
    Announcer(#[from] AnnouncerError),

    /// Platform capability call failed
    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for DaemonError {
    fn from(err: config::ConfigError) -> Self {
        DaemonError::Config(err.to_string())
    }
}

/// Result type alias for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;
