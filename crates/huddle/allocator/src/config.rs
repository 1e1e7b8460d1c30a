//! Placement configuration.

use huddle_types::ChannelId;
use serde::{Deserialize, Serialize};

use crate::error::{AllocatorError, AllocatorResult};

/// Configuration for channel placement, fixed at process start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Name of the category whose channels are eligible.
    #[serde(default)]
    pub category: String,

    /// Participant limit given to newly provisioned channels.
    #[serde(default = "default_capacity")]
    pub capacity: u32,

    /// Only accept requests posted in this channel, if set.
    #[serde(default)]
    pub origin_channel: Option<ChannelId>,

    /// Provision a new channel when every existing one is full.
    #[serde(default)]
    pub can_create: bool,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            category: String::new(),
            capacity: default_capacity(),
            origin_channel: None,
            can_create: false,
        }
    }
}

impl PlacementConfig {
    /// Create a config for the given category with default limits.
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Default::default()
        }
    }

    pub fn with_capacity(mut self, capacity: u32) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_creation(mut self, can_create: bool) -> Self {
        self.can_create = can_create;
        self
    }

    pub fn with_origin_channel(mut self, channel: ChannelId) -> Self {
        self.origin_channel = Some(channel);
        self
    }

    /// Check the values that placement relies on.
    pub fn validate(&self) -> AllocatorResult<()> {
        if self.category.trim().is_empty() {
            return Err(AllocatorError::InvalidConfig(
                "category name must not be empty".to_string(),
            ));
        }

        if self.capacity == 0 {
            return Err(AllocatorError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }

        Ok(())
    }

    /// Whether a request posted in `origin` should be handled.
    pub fn accepts_origin(&self, origin: ChannelId) -> bool {
        self.origin_channel.map_or(true, |allowed| allowed == origin)
    }
}

fn default_capacity() -> u32 {
    5
}
