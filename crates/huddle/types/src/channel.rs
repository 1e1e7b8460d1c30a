//! Members, categories, channels and invites

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{CategoryId, ChannelId, MemberId};

/// A community member.
///
/// Only the id takes part in placement; the display name is used when
/// addressing the member in replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub name: String,
}

impl Member {
    pub fn new(id: MemberId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// A named grouping of channels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A capacity-limited channel and its current occupants.
///
/// `Channel` does not enforce `occupants.len() <= capacity` itself; the
/// placement policy keeps new seats within capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: ChannelId,
    pub name: String,
    pub category: CategoryId,
    pub capacity: u32,
    pub occupants: BTreeSet<MemberId>,
}

impl Channel {
    pub fn new(
        id: ChannelId,
        name: impl Into<String>,
        category: CategoryId,
        capacity: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category,
            capacity,
            occupants: BTreeSet::new(),
        }
    }

    /// Builder-style helper that seats the given members.
    pub fn with_occupants(mut self, occupants: impl IntoIterator<Item = MemberId>) -> Self {
        self.occupants.extend(occupants);
        self
    }

    pub fn occupancy(&self) -> usize {
        self.occupants.len()
    }

    pub fn contains(&self, member: &MemberId) -> bool {
        self.occupants.contains(member)
    }

    /// True while at least one more member fits.
    pub fn has_room(&self) -> bool {
        self.occupancy() < self.capacity as usize
    }

    pub fn to_ref(&self) -> ChannelRef {
        ChannelRef {
            id: self.id,
            name: self.name.clone(),
        }
    }
}

/// Lightweight reference to a channel carried in decisions and replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelRef {
    pub id: ChannelId,
    pub name: String,
}

/// An invite link to a channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invite {
    pub code: String,
    pub url: String,
    pub channel: ChannelId,
    /// Maximum number of redemptions; placement always asks for 1.
    pub max_uses: u32,
    pub created_at: DateTime<Utc>,
}
