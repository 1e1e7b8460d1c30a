//! Huddle platform capabilities
//!
//! The placement core never talks to a chat platform directly. It consumes
//! the narrow capability traits defined here:
//! - [`Directory`]: categories, channel listing, provisioning and invites
//! - [`Messenger`]: direct messages to members
//! - [`ActivityFeed`]: history counts and posts in text channels
//!
//! [`InMemoryPlatform`] implements all of them for development and tests.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{PlatformError, PlatformResult};
pub use memory::{DirectMessage, InMemoryPlatform, PostedMessage};
pub use traits::{ActivityFeed, Directory, Messenger, Platform};
