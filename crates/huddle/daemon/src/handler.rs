//! `$play` request handling
//!
//! Reads the roster from the platform, asks the allocator for a decision and
//! carries it out: provisioning a channel when told to, minting a single-use
//! invite, and replying to the member by direct message.
//!
//! Requests are not serialized against each other. The roster is read, the
//! decision made and the invite sent before the member actually joins, so
//! two requests racing for the last free slot of a channel may both be sent
//! there; the platform's participant limit turns the late one away.

use std::sync::Arc;

use huddle_allocator::{provisioning_failed, Allocator};
use huddle_platform::{Platform, PlatformResult};
use huddle_types::{Category, ChannelId, ChannelRef, Invite, Member, PlacementDecision};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use crate::error::DaemonResult;
use crate::replies::Replies;

/// A `$play` command as received from chat
#[derive(Debug, Clone)]
pub struct PlayRequest {
    /// Member who issued the command
    pub author: Member,
    /// Member to place instead of the author, if one was named
    pub target: Option<Member>,
    /// Channel the command was posted in
    pub origin: ChannelId,
}

impl PlayRequest {
    pub fn new(author: Member, origin: ChannelId) -> Self {
        Self {
            author,
            target: None,
            origin,
        }
    }

    pub fn for_target(mut self, target: Member) -> Self {
        self.target = Some(target);
        self
    }
}

/// What was done for one request
#[derive(Debug, Clone)]
pub struct Placement {
    /// Member that was placed
    pub member: Member,
    /// Final decision, after any provisioning follow-through
    pub decision: PlacementDecision,
    /// Channel the member was invited to
    pub seat: Option<ChannelRef>,
    /// Invite sent to the member
    pub invite: Option<Invite>,
    /// Direct message sent to the member
    pub reply: String,
}

/// Executes placement decisions against the platform
pub struct PlayHandler {
    allocator: Allocator,
    platform: Arc<dyn Platform>,
    replies: Replies,
}

impl PlayHandler {
    pub fn new(allocator: Allocator, platform: Arc<dyn Platform>, replies: Replies) -> Self {
        Self {
            allocator,
            platform,
            replies,
        }
    }

    /// Handle a request; `None` when it came from a channel we do not
    /// serve
    #[instrument(skip(self, request), fields(author = %request.author.id, origin = %request.origin))]
    pub async fn handle(&self, request: PlayRequest) -> DaemonResult<Option<Placement>> {
        if !self.allocator.config().accepts_origin(request.origin) {
            debug!("Ignoring request from another channel");
            return Ok(None);
        }

        let member = request.target.unwrap_or(request.author);
        self.place(member).await.map(Some)
    }

    /// Place a member and reply to them
    #[instrument(skip(self, member), fields(member = %member.id))]
    pub async fn place(&self, member: Member) -> DaemonResult<Placement> {
        let category = self
            .platform
            .resolve_category(self.allocator.category())
            .await?;

        let decision = match &category {
            Some(category) => {
                let channels = self.platform.list_channels(&category.id).await?;
                self.allocator.place(&member.id, Some(channels.as_slice()))
            }
            None => self.allocator.place(&member.id, None),
        };

        let (decision, seat) = match (decision, category) {
            (PlacementDecision::AssignExisting(channel), _) => {
                let seat = channel.clone();
                (PlacementDecision::AssignExisting(channel), Some(seat))
            }
            (PlacementDecision::AssignNew, Some(category)) => {
                match self.provision(&category).await {
                    Ok(channel) => (PlacementDecision::AssignNew, Some(channel)),
                    Err(e) => {
                        warn!(error = %e, "Unable to create new voice channel");
                        (provisioning_failed(&e), None)
                    }
                }
            }
            (PlacementDecision::ConfigError(reason), _) => {
                error!(
                    category = %self.allocator.category(),
                    reason = %reason,
                    "Category not found; please (re)create it"
                );
                (PlacementDecision::ConfigError(reason), None)
            }
            (decision, _) => (decision, None),
        };

        let (reply, invite) = match (&decision, &seat) {
            (_, Some(channel)) => {
                let invite = self.platform.create_single_use_invite(&channel.id).await?;
                (self.replies.invite(&member.name, &invite.url), Some(invite))
            }
            (PlacementDecision::AlreadyPresent(channel), None) => {
                (self.replies.already_chatting(&member.name, &channel.name), None)
            }
            (PlacementDecision::ConfigError(_), None) => {
                (self.replies.config_problem(&member.name), None)
            }
            (_, None) => (self.replies.all_full(), None),
        };

        self.platform
            .send_direct_message(&member.id, &reply)
            .await?;

        info!(decision = decision.kind(), "Handled placement request");

        Ok(Placement {
            member,
            decision,
            seat,
            invite,
            reply,
        })
    }

    /// Create a fresh, uniquely named channel in `category`. Never retried.
    async fn provision(&self, category: &Category) -> PlatformResult<ChannelRef> {
        let name = Uuid::new_v4().to_string();
        let channel = self
            .platform
            .create_channel(&category.id, &name, self.allocator.capacity())
            .await?;

        info!(channel = %channel.id, "Provisioned voice channel");
        Ok(channel.to_ref())
    }
}
