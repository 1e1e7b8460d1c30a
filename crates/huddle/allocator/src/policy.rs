//! First-fit placement policy.
//!
//! The policy is a pure function over a roster snapshot handed in by the
//! caller. It holds no state between calls and performs no I/O; creating
//! channels, sending replies and minting invites all happen in the caller
//! according to the returned decision.
//!
//! Seat occupation happens on the platform after the decision is returned,
//! so two requests that read the same roster can both be pointed at the same
//! last free slot. Nothing here guards against that race.

use std::fmt;

use huddle_types::{Channel, MemberId, PlacementDecision, RefusalReason};
use tracing::{debug, instrument};

use crate::config::PlacementConfig;
use crate::error::AllocatorResult;

/// Decide where `requester` should be seated.
///
/// `channels_in_category` is `None` when the category could not be resolved
/// and otherwise lists the category's channels in discovery order, which
/// decides ties: the first channel with a free slot wins.
///
/// A channel that already holds the requester ends the scan immediately,
/// even when it is full and a later channel has room.
pub fn allocate(
    requester: &MemberId,
    channels_in_category: Option<&[Channel]>,
    can_create: bool,
) -> PlacementDecision {
    let Some(channels) = channels_in_category else {
        return PlacementDecision::ConfigError("category not found".to_string());
    };

    let mut candidate: Option<&Channel> = None;
    for channel in channels {
        if channel.contains(requester) {
            return PlacementDecision::AlreadyPresent(channel.to_ref());
        }

        if candidate.is_none() && channel.has_room() {
            candidate = Some(channel);
        }
    }

    match candidate {
        Some(channel) => PlacementDecision::AssignExisting(channel.to_ref()),
        None if can_create => PlacementDecision::AssignNew,
        None => PlacementDecision::Refused(RefusalReason::AllChannelsFull),
    }
}

/// Decision reported when provisioning for an [`PlacementDecision::AssignNew`]
/// fails. Never retried; the requester has to ask again.
pub fn provisioning_failed(cause: impl fmt::Display) -> PlacementDecision {
    PlacementDecision::Refused(RefusalReason::CreationFailed {
        cause: cause.to_string(),
    })
}

/// Placement policy bound to a validated [`PlacementConfig`].
#[derive(Debug, Clone)]
pub struct Allocator {
    config: PlacementConfig,
}

impl Allocator {
    pub fn new(config: PlacementConfig) -> AllocatorResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PlacementConfig {
        &self.config
    }

    /// Name of the category whose channels are considered.
    pub fn category(&self) -> &str {
        &self.config.category
    }

    /// Participant limit for channels provisioned on `AssignNew`.
    pub fn capacity(&self) -> u32 {
        self.config.capacity
    }

    /// Run [`allocate`] with the configured creation flag.
    #[instrument(skip(self, channels_in_category), fields(category = %self.config.category))]
    pub fn place(
        &self,
        requester: &MemberId,
        channels_in_category: Option<&[Channel]>,
    ) -> PlacementDecision {
        let decision = match allocate(requester, channels_in_category, self.config.can_create) {
            PlacementDecision::ConfigError(_) => PlacementDecision::ConfigError(format!(
                "category '{}' not found",
                self.config.category
            )),
            decision => decision,
        };

        debug!(
            requester = %requester,
            channels = channels_in_category.map_or(0, |c| c.len()),
            decision = decision.kind(),
            "Placement decided"
        );

        decision
    }
}
