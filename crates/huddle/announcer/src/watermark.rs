//! Announcement watermark.

use chrono::{DateTime, Utc};
use huddle_types::MessageId;

/// Position of the last announcement in the target channel.
///
/// Starts with no prior announcement, in which case activity is counted over
/// the whole channel history. Only moves forward.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Watermark {
    last_message: Option<MessageId>,
    advanced_at: Option<DateTime<Utc>>,
    announcements: u64,
}

impl Watermark {
    /// Watermark before any announcement.
    pub fn genesis() -> Self {
        Self::default()
    }

    /// Message activity is counted after.
    pub fn last_message(&self) -> Option<MessageId> {
        self.last_message
    }

    pub fn advanced_at(&self) -> Option<DateTime<Utc>> {
        self.advanced_at
    }

    /// Number of announcements recorded.
    pub fn announcements(&self) -> u64 {
        self.announcements
    }

    /// Move the watermark to `message`. Returns false and leaves the
    /// watermark untouched if `message` is not newer than the current one.
    pub fn advance(&mut self, message: MessageId) -> bool {
        if self.last_message.is_some_and(|last| message <= last) {
            return false;
        }

        self.last_message = Some(message);
        self.advanced_at = Some(Utc::now());
        self.announcements += 1;
        true
    }
}
