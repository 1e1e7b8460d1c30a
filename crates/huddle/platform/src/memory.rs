//! In-memory platform implementation

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use huddle_types::{
    Category, CategoryId, Channel, ChannelId, Invite, Member, MemberId, MessageId,
};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{PlatformError, PlatformResult};
use crate::traits::{ActivityFeed, Directory, Messenger};

/// A message posted to a text channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    pub id: MessageId,
    /// `None` for messages sent by the bot itself.
    pub author: Option<MemberId>,
    pub text: String,
    pub posted_at: DateTime<Utc>,
}

/// A direct message delivered to a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectMessage {
    pub member: MemberId,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

#[derive(Debug)]
struct InviteState {
    invite: Invite,
    uses: u32,
}

#[derive(Debug, Default)]
struct Faults {
    channel_creation: AtomicBool,
    activity: AtomicBool,
    direct_messages: AtomicBool,
}

/// In-memory chat platform for development and testing.
///
/// Voice channels are kept in creation order, which is the discovery order
/// `list_channels` reports. Every id comes from one increasing sequence, so
/// message ids order the same way messages were posted.
#[derive(Debug)]
pub struct InMemoryPlatform {
    categories: RwLock<Vec<Category>>,
    voice_channels: RwLock<Vec<Channel>>,
    text_channels: RwLock<HashMap<ChannelId, Vec<PostedMessage>>>,
    members: RwLock<Vec<Member>>,
    direct_messages: RwLock<Vec<DirectMessage>>,
    invites: RwLock<HashMap<String, InviteState>>,
    sequence: AtomicU64,
    invite_base_url: String,
    faults: Faults,
}

impl Default for InMemoryPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryPlatform {
    /// Create an empty platform
    pub fn new() -> Self {
        Self::with_invite_base_url("https://chat.invalid/invite")
    }

    /// Create an empty platform whose invite urls start with `base_url`
    pub fn with_invite_base_url(base_url: impl Into<String>) -> Self {
        Self {
            categories: RwLock::new(Vec::new()),
            voice_channels: RwLock::new(Vec::new()),
            text_channels: RwLock::new(HashMap::new()),
            members: RwLock::new(Vec::new()),
            direct_messages: RwLock::new(Vec::new()),
            invites: RwLock::new(HashMap::new()),
            sequence: AtomicU64::new(1),
            invite_base_url: base_url.into().trim_end_matches('/').to_string(),
            faults: Faults::default(),
        }
    }

    fn next_id(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }

    // -------------------------------------------------------------------
    // Seeding
    // -------------------------------------------------------------------

    /// Add a category, or return the existing one with the same name
    pub async fn add_category(&self, name: &str) -> Category {
        let mut categories = self.categories.write().await;
        if let Some(existing) = categories.iter().find(|c| c.name == name) {
            return existing.clone();
        }

        let category = Category {
            id: CategoryId::new(self.next_id()),
            name: name.to_string(),
        };
        categories.push(category.clone());
        category
    }

    /// Remove a category by name; its channels stay behind but are no
    /// longer reachable through `resolve_category`
    pub async fn remove_category(&self, name: &str) -> bool {
        let mut categories = self.categories.write().await;
        let before = categories.len();
        categories.retain(|c| c.name != name);
        categories.len() != before
    }

    /// Add a voice channel without going through fault injection
    pub async fn add_voice_channel(
        &self,
        category: &CategoryId,
        name: &str,
        capacity: u32,
    ) -> PlatformResult<Channel> {
        if !self.categories.read().await.iter().any(|c| &c.id == category) {
            return Err(PlatformError::CreationFailed(format!(
                "unknown category {}",
                category
            )));
        }

        if capacity == 0 {
            return Err(PlatformError::CreationFailed(
                "participant limit must be at least 1".to_string(),
            ));
        }

        let channel = Channel::new(ChannelId::new(self.next_id()), name, *category, capacity);
        self.voice_channels.write().await.push(channel.clone());
        Ok(channel)
    }

    /// Add a text channel
    pub async fn add_text_channel(&self) -> ChannelId {
        let id = ChannelId::new(self.next_id());
        self.text_channels.write().await.insert(id, Vec::new());
        id
    }

    /// Make sure a text channel with a well-known id exists
    pub async fn ensure_text_channel(&self, id: ChannelId) {
        self.sequence.fetch_max(id.get().saturating_add(1), Ordering::SeqCst);
        self.text_channels.write().await.entry(id).or_default();
    }

    /// Register a member, or return the existing one with the same name
    pub async fn register_member(&self, name: &str) -> Member {
        let mut members = self.members.write().await;
        if let Some(existing) = members.iter().find(|m| m.name == name) {
            return existing.clone();
        }

        let member = Member::new(MemberId::new(self.next_id()), name);
        members.push(member.clone());
        member
    }

    /// Look a member up by name
    pub async fn member_named(&self, name: &str) -> Option<Member> {
        self.members
            .read()
            .await
            .iter()
            .find(|m| m.name == name)
            .cloned()
    }

    // -------------------------------------------------------------------
    // Seats
    // -------------------------------------------------------------------

    /// Seat a member in a voice channel, honoring its participant limit
    pub async fn join(&self, member: &MemberId, channel: &ChannelId) -> PlatformResult<()> {
        let mut channels = self.voice_channels.write().await;
        let target = channels
            .iter_mut()
            .find(|c| &c.id == channel)
            .ok_or(PlatformError::ChannelNotFound(*channel))?;

        if !target.contains(member) && !target.has_room() {
            return Err(PlatformError::Invite(format!("{} is full", channel)));
        }

        target.occupants.insert(*member);
        debug!(member = %member, channel = %channel, "Member joined channel");
        Ok(())
    }

    /// Remove a member from every voice channel
    pub async fn leave(&self, member: &MemberId) -> bool {
        let mut left = false;
        for channel in self.voice_channels.write().await.iter_mut() {
            left |= channel.occupants.remove(member);
        }
        left
    }

    /// Redeem an invite code, seating the member in its channel
    pub async fn redeem_invite(&self, code: &str, member: &MemberId) -> PlatformResult<ChannelId> {
        let channel = {
            let mut invites = self.invites.write().await;
            let state = invites
                .get_mut(code)
                .ok_or_else(|| PlatformError::Invite(format!("unknown invite {}", code)))?;

            if state.uses >= state.invite.max_uses {
                return Err(PlatformError::Invite(format!("invite {} already used", code)));
            }
            state.uses += 1;
            state.invite.channel
        };

        self.join(member, &channel).await?;
        Ok(channel)
    }

    /// Snapshot of a voice channel
    pub async fn voice_channel(&self, channel: &ChannelId) -> Option<Channel> {
        self.voice_channels
            .read()
            .await
            .iter()
            .find(|c| &c.id == channel)
            .cloned()
    }

    // -------------------------------------------------------------------
    // Messages
    // -------------------------------------------------------------------

    /// Post a message to a text channel
    pub async fn post(
        &self,
        channel: &ChannelId,
        author: Option<MemberId>,
        text: &str,
    ) -> PlatformResult<MessageId> {
        let mut text_channels = self.text_channels.write().await;
        let history = text_channels
            .get_mut(channel)
            .ok_or(PlatformError::ChannelNotFound(*channel))?;

        let id = MessageId::new(self.next_id());
        history.push(PostedMessage {
            id,
            author,
            text: text.to_string(),
            posted_at: Utc::now(),
        });
        Ok(id)
    }

    /// Full history of a text channel
    pub async fn channel_messages(&self, channel: &ChannelId) -> PlatformResult<Vec<PostedMessage>> {
        self.text_channels
            .read()
            .await
            .get(channel)
            .cloned()
            .ok_or(PlatformError::ChannelNotFound(*channel))
    }

    /// Direct messages delivered to one member, oldest first
    pub async fn direct_messages_for(&self, member: &MemberId) -> Vec<String> {
        self.direct_messages
            .read()
            .await
            .iter()
            .filter(|dm| &dm.member == member)
            .map(|dm| dm.text.clone())
            .collect()
    }

    /// Drain every delivered direct message
    pub async fn take_direct_messages(&self) -> Vec<DirectMessage> {
        std::mem::take(&mut *self.direct_messages.write().await)
    }

    // -------------------------------------------------------------------
    // Fault injection
    // -------------------------------------------------------------------

    /// Make `create_channel` fail until cleared
    pub fn fail_channel_creation(&self, fail: bool) {
        self.faults.channel_creation.store(fail, Ordering::SeqCst);
    }

    /// Make `query_recent_activity` and `send_channel_message` fail until cleared
    pub fn fail_activity(&self, fail: bool) {
        self.faults.activity.store(fail, Ordering::SeqCst);
    }

    /// Make `send_direct_message` fail until cleared
    pub fn fail_direct_messages(&self, fail: bool) {
        self.faults.direct_messages.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Directory for InMemoryPlatform {
    async fn resolve_category(&self, name: &str) -> PlatformResult<Option<Category>> {
        let categories = self.categories.read().await;
        Ok(categories.iter().find(|c| c.name == name).cloned())
    }

    async fn list_channels(&self, category: &CategoryId) -> PlatformResult<Vec<Channel>> {
        let channels = self.voice_channels.read().await;
        Ok(channels
            .iter()
            .filter(|c| &c.category == category)
            .cloned()
            .collect())
    }

    async fn create_channel(
        &self,
        category: &CategoryId,
        name: &str,
        capacity: u32,
    ) -> PlatformResult<Channel> {
        if self.faults.channel_creation.load(Ordering::SeqCst) {
            return Err(PlatformError::CreationFailed(
                "channel creation disabled by fault injection".to_string(),
            ));
        }

        let channel = self.add_voice_channel(category, name, capacity).await?;
        info!(channel = %channel.id, name = %channel.name, capacity, "Created voice channel");
        Ok(channel)
    }

    async fn create_single_use_invite(&self, channel: &ChannelId) -> PlatformResult<Invite> {
        if self.voice_channel(channel).await.is_none() {
            return Err(PlatformError::ChannelNotFound(*channel));
        }

        let code = Uuid::new_v4().simple().to_string();
        let invite = Invite {
            url: format!("{}/{}", self.invite_base_url, code),
            code: code.clone(),
            channel: *channel,
            max_uses: 1,
            created_at: Utc::now(),
        };

        self.invites.write().await.insert(
            code,
            InviteState {
                invite: invite.clone(),
                uses: 0,
            },
        );
        Ok(invite)
    }
}

#[async_trait]
impl Messenger for InMemoryPlatform {
    async fn send_direct_message(&self, member: &MemberId, text: &str) -> PlatformResult<()> {
        if self.faults.direct_messages.load(Ordering::SeqCst) {
            return Err(PlatformError::Delivery(
                "direct messages disabled by fault injection".to_string(),
            ));
        }

        if !self.members.read().await.iter().any(|m| &m.id == member) {
            return Err(PlatformError::MemberNotFound(*member));
        }

        debug!(member = %member, "Direct message delivered");
        self.direct_messages.write().await.push(DirectMessage {
            member: *member,
            text: text.to_string(),
            sent_at: Utc::now(),
        });
        Ok(())
    }
}

#[async_trait]
impl ActivityFeed for InMemoryPlatform {
    async fn query_recent_activity(
        &self,
        channel: &ChannelId,
        since: Option<MessageId>,
    ) -> PlatformResult<u64> {
        if self.faults.activity.load(Ordering::SeqCst) {
            return Err(PlatformError::History(
                "history disabled by fault injection".to_string(),
            ));
        }

        let text_channels = self.text_channels.read().await;
        let history = text_channels
            .get(channel)
            .ok_or(PlatformError::ChannelNotFound(*channel))?;

        let count = match since {
            Some(after) => history.iter().filter(|m| m.id > after).count(),
            None => history.len(),
        };
        Ok(count as u64)
    }

    async fn send_channel_message(
        &self,
        channel: &ChannelId,
        text: &str,
    ) -> PlatformResult<MessageId> {
        if self.faults.activity.load(Ordering::SeqCst) {
            return Err(PlatformError::Delivery(
                "channel messages disabled by fault injection".to_string(),
            ));
        }

        self.post(channel, None, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_list_channels_keeps_creation_order() {
        let platform = InMemoryPlatform::new();
        let voice = platform.add_category("Voice").await;
        let other = platform.add_category("Other").await;

        let a = platform.add_voice_channel(&voice.id, "a", 5).await.unwrap();
        platform.add_voice_channel(&other.id, "x", 5).await.unwrap();
        let b = platform.add_voice_channel(&voice.id, "b", 5).await.unwrap();

        let listed: Vec<_> = platform
            .list_channels(&voice.id)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(listed, vec![a.id, b.id]);
    }

    #[tokio::test]
    async fn test_zero_capacity_channel_is_rejected() {
        let platform = InMemoryPlatform::new();
        let voice = platform.add_category("Voice").await;

        assert!(matches!(
            platform.add_voice_channel(&voice.id, "a", 0).await,
            Err(PlatformError::CreationFailed(_))
        ));
        assert!(matches!(
            platform.create_channel(&voice.id, "b", 0).await,
            Err(PlatformError::CreationFailed(_))
        ));
        assert!(platform.list_channels(&voice.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ensure_text_channel_at_max_id() {
        let platform = InMemoryPlatform::new();
        let lobby = ChannelId::new(u64::MAX);

        platform.ensure_text_channel(lobby).await;
        assert!(platform.channel_messages(&lobby).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolve_missing_category() {
        let platform = InMemoryPlatform::new();
        platform.add_category("Voice").await;

        assert!(platform.resolve_category("Voice").await.unwrap().is_some());
        assert!(platform.resolve_category("Stage").await.unwrap().is_none());

        assert!(platform.remove_category("Voice").await);
        assert!(platform.resolve_category("Voice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_channel_fault() {
        let platform = InMemoryPlatform::new();
        let voice = platform.add_category("Voice").await;

        platform.fail_channel_creation(true);
        let err = platform.create_channel(&voice.id, "new", 5).await.unwrap_err();
        assert!(matches!(err, PlatformError::CreationFailed(_)));

        platform.fail_channel_creation(false);
        let channel = platform.create_channel(&voice.id, "new", 5).await.unwrap();
        assert_eq!(channel.capacity, 5);
        assert_eq!(channel.category, voice.id);
    }

    #[tokio::test]
    async fn test_invite_is_single_use() {
        let platform = InMemoryPlatform::new();
        let voice = platform.add_category("Voice").await;
        let channel = platform.add_voice_channel(&voice.id, "a", 5).await.unwrap();
        let alice = platform.register_member("alice").await;
        let bob = platform.register_member("bob").await;

        let invite = platform.create_single_use_invite(&channel.id).await.unwrap();
        assert_eq!(invite.max_uses, 1);
        assert!(invite.url.ends_with(&invite.code));

        assert_eq!(
            platform.redeem_invite(&invite.code, &alice.id).await.unwrap(),
            channel.id
        );
        assert!(platform.redeem_invite(&invite.code, &bob.id).await.is_err());

        let seated = platform.voice_channel(&channel.id).await.unwrap();
        assert!(seated.contains(&alice.id));
        assert!(!seated.contains(&bob.id));
    }

    #[tokio::test]
    async fn test_join_honors_participant_limit() {
        let platform = InMemoryPlatform::new();
        let voice = platform.add_category("Voice").await;
        let channel = platform.add_voice_channel(&voice.id, "duo", 1).await.unwrap();
        let alice = platform.register_member("alice").await;
        let bob = platform.register_member("bob").await;

        platform.join(&alice.id, &channel.id).await.unwrap();
        assert!(platform.join(&bob.id, &channel.id).await.is_err());

        assert!(platform.leave(&alice.id).await);
        platform.join(&bob.id, &channel.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_activity_counts_messages_after_watermark() {
        let platform = InMemoryPlatform::new();
        let lobby = platform.add_text_channel().await;
        let alice = platform.register_member("alice").await;

        platform.post(&lobby, Some(alice.id), "hi").await.unwrap();
        let mark = platform.send_channel_message(&lobby, "welcome").await.unwrap();
        platform.post(&lobby, Some(alice.id), "one").await.unwrap();
        platform.post(&lobby, Some(alice.id), "two").await.unwrap();

        assert_eq!(platform.query_recent_activity(&lobby, None).await.unwrap(), 4);
        assert_eq!(
            platform.query_recent_activity(&lobby, Some(mark)).await.unwrap(),
            2
        );
    }

    #[tokio::test]
    async fn test_ensure_text_channel_reserves_id() {
        let platform = InMemoryPlatform::new();
        platform.ensure_text_channel(ChannelId::new(500)).await;

        let next = platform.add_text_channel().await;
        assert!(next.get() > 500);
        assert_eq!(
            platform
                .query_recent_activity(&ChannelId::new(500), None)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_direct_messages_require_known_member() {
        let platform = InMemoryPlatform::new();
        let alice = platform.register_member("alice").await;

        platform.send_direct_message(&alice.id, "hello").await.unwrap();
        assert_eq!(platform.direct_messages_for(&alice.id).await, vec!["hello"]);

        let err = platform
            .send_direct_message(&MemberId::new(9_999), "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, PlatformError::MemberNotFound(_)));

        platform.fail_direct_messages(true);
        assert!(platform.send_direct_message(&alice.id, "again").await.is_err());
    }
}
