//! Huddle announcer
//!
//! Long-lived background task that re-posts onboarding instructions to a
//! shared text channel once enough new activity has accumulated since the
//! previous announcement.
//!
//! The watermark is owned by the running task; nothing else reads or writes
//! it, so no locking is involved.

pub mod announcer;
pub mod config;
pub mod error;
pub mod watermark;

pub use announcer::{Announcer, AnnouncerState, CheckOutcome};
pub use config::{AnnouncementConfig, DEFAULT_ANNOUNCEMENT};
pub use error::{AnnouncerError, AnnouncerResult};
pub use watermark::Watermark;
