//! Error types for huddle-announcer.

use huddle_platform::PlatformError;
use huddle_types::MessageId;
use thiserror::Error;

/// Errors that can occur while building or running the announcer.
#[derive(Debug, Error)]
pub enum AnnouncerError {
    /// Announcement configuration is unusable.
    #[error("invalid announcement configuration: {0}")]
    InvalidConfig(String),

    /// No channel to announce in.
    #[error("no announcement channel configured")]
    MissingChannel,

    /// The platform returned an announcement id at or behind the watermark.
    #[error("announcement {message} is not newer than watermark {watermark:?}")]
    StaleAnnouncement {
        message: MessageId,
        watermark: Option<MessageId>,
    },

    /// Activity query or post failed.
    #[error("platform error: {0}")]
    Platform(#[from] PlatformError),
}

/// Result type for announcer operations.
pub type AnnouncerResult<T> = Result<T, AnnouncerError>;
