//! Capability traits consumed by the placement core

use async_trait::async_trait;
use huddle_types::{Category, CategoryId, Channel, ChannelId, Invite, MemberId, MessageId};

use crate::error::PlatformResult;

/// Combined platform capabilities
pub trait Platform: Directory + Messenger + ActivityFeed + Send + Sync {}

impl<T> Platform for T where T: Directory + Messenger + ActivityFeed + Send + Sync {}

/// Channel and category lookup, provisioning and invites
#[async_trait]
pub trait Directory: Send + Sync {
    /// Resolve a category by name; `None` when it does not exist
    async fn resolve_category(&self, name: &str) -> PlatformResult<Option<Category>>;

    /// List the channels of a category in discovery order
    async fn list_channels(&self, category: &CategoryId) -> PlatformResult<Vec<Channel>>;

    /// Create a channel under a category with the given participant limit
    async fn create_channel(
        &self,
        category: &CategoryId,
        name: &str,
        capacity: u32,
    ) -> PlatformResult<Channel>;

    /// Create an invite to a channel that can be redeemed once
    async fn create_single_use_invite(&self, channel: &ChannelId) -> PlatformResult<Invite>;
}

/// Direct messages to members
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a direct message to a member
    async fn send_direct_message(&self, member: &MemberId, text: &str) -> PlatformResult<()>;
}

/// Activity in text channels
#[async_trait]
pub trait ActivityFeed: Send + Sync {
    /// Count messages posted to `channel` after `since`, or all messages
    /// when `since` is `None`
    async fn query_recent_activity(
        &self,
        channel: &ChannelId,
        since: Option<MessageId>,
    ) -> PlatformResult<u64>;

    /// Post a message to a channel and return its id
    async fn send_channel_message(&self, channel: &ChannelId, text: &str)
        -> PlatformResult<MessageId>;
}
