//! Placement decisions
//!
//! Every outcome of a placement request is a value, including the ones that
//! read like errors (missing category, no room). Callers match on the
//! decision and cannot forget a case.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::channel::ChannelRef;

/// Outcome of placing one requester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementDecision {
    /// Seat the requester in an existing channel with a free slot.
    AssignExisting(ChannelRef),

    /// No channel has room; the caller should provision a new one and seat
    /// the requester there.
    AssignNew,

    /// The requester already occupies this channel.
    AlreadyPresent(ChannelRef),

    /// The requester cannot be seated.
    Refused(RefusalReason),

    /// The configured category does not resolve.
    ConfigError(String),
}

impl PlacementDecision {
    /// The channel named by the decision, if any.
    pub fn channel(&self) -> Option<&ChannelRef> {
        match self {
            Self::AssignExisting(channel) | Self::AlreadyPresent(channel) => Some(channel),
            _ => None,
        }
    }

    /// True when the requester should receive an invite.
    pub fn seats_requester(&self) -> bool {
        matches!(self, Self::AssignExisting(_) | Self::AssignNew)
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::AssignExisting(_) => "assign_existing",
            Self::AssignNew => "assign_new",
            Self::AlreadyPresent(_) => "already_present",
            Self::Refused(_) => "refused",
            Self::ConfigError(_) => "config_error",
        }
    }
}

/// Why a requester was refused a seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefusalReason {
    /// Every channel is at capacity and creating channels is disabled.
    AllChannelsFull,

    /// A new channel was needed but provisioning failed.
    CreationFailed { cause: String },
}

impl fmt::Display for RefusalReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AllChannelsFull => write!(f, "all channels full, creation disabled"),
            Self::CreationFailed { cause } => write!(f, "creation failed: {}", cause),
        }
    }
}
