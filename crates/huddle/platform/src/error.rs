//! Error types for huddle-platform.

use huddle_types::{ChannelId, MemberId};
use thiserror::Error;

/// Failures reported by chat platform capability calls.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// Channel does not exist on the platform.
    #[error("channel not found: {0}")]
    ChannelNotFound(ChannelId),

    /// Member does not exist on the platform.
    #[error("member not found: {0}")]
    MemberNotFound(MemberId),

    /// Channel provisioning was rejected.
    #[error("channel creation failed: {0}")]
    CreationFailed(String),

    /// Message could not be delivered.
    #[error("message delivery failed: {0}")]
    Delivery(String),

    /// Invite could not be created or redeemed.
    #[error("invite error: {0}")]
    Invite(String),

    /// Channel history could not be read.
    #[error("history query failed: {0}")]
    History(String),

    /// Platform is unreachable.
    #[error("platform unavailable: {0}")]
    Unavailable(String),
}

/// Result type for platform operations.
pub type PlatformResult<T> = Result<T, PlatformError>;
