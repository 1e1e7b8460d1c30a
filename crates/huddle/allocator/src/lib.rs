//! Huddle allocator
//!
//! Admission control for capacity-limited channels. Given a roster snapshot
//! of one category, decides whether a requester joins an existing channel,
//! gets a freshly provisioned one, is already seated, or is turned away.

pub mod config;
pub mod error;
pub mod policy;

pub use config::PlacementConfig;
pub use error::{AllocatorError, AllocatorResult};
pub use policy::{allocate, provisioning_failed, Allocator};
