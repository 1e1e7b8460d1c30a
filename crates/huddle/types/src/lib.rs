//! Huddle core types
//!
//! Shared vocabulary for the placement core:
//! - opaque platform identifiers
//! - members, categories, capacity-limited channels and invites
//! - placement decisions

pub mod channel;
pub mod decision;
pub mod ids;

pub use channel::{Category, Channel, ChannelRef, Invite, Member};
pub use decision::{PlacementDecision, RefusalReason};
pub use ids::{CategoryId, ChannelId, MemberId, MessageId};
