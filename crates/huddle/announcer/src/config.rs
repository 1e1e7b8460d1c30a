//! Announcement configuration.

use std::time::Duration;

use huddle_types::ChannelId;
use serde::{Deserialize, Serialize};

use crate::error::{AnnouncerError, AnnouncerResult};

/// Onboarding message posted by default.
pub const DEFAULT_ANNOUNCEMENT: &str = "Welcome to the social channel!\n\
Please use $play to chat with some complete strangers. It will be a lot of fun!\n";

/// Configuration for the periodic announcer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnouncementConfig {
    /// Text channel to announce in.
    #[serde(default)]
    pub channel: Option<ChannelId>,

    /// Message to post.
    #[serde(default = "default_text")]
    pub text: String,

    /// Seconds between activity checks.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// Messages needed since the last announcement before posting again.
    /// Falls back to `interval_secs` when unset.
    #[serde(default)]
    pub threshold: Option<u64>,
}

impl Default for AnnouncementConfig {
    fn default() -> Self {
        Self {
            channel: None,
            text: default_text(),
            interval_secs: default_interval_secs(),
            threshold: None,
        }
    }
}

impl AnnouncementConfig {
    /// Create a config announcing in `channel` with default timing.
    pub fn for_channel(channel: ChannelId) -> Self {
        Self {
            channel: Some(channel),
            ..Default::default()
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_interval_secs(mut self, secs: u64) -> Self {
        self.interval_secs = secs;
        self
    }

    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Time spent idle between checks.
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Activity count that triggers an announcement.
    pub fn effective_threshold(&self) -> u64 {
        self.threshold.unwrap_or(self.interval_secs)
    }

    /// Check the values the announcer relies on.
    pub fn validate(&self) -> AnnouncerResult<()> {
        if self.interval_secs == 0 {
            return Err(AnnouncerError::InvalidConfig(
                "interval_secs must be at least 1".to_string(),
            ));
        }

        if self.effective_threshold() == 0 {
            return Err(AnnouncerError::InvalidConfig(
                "threshold must be at least 1".to_string(),
            ));
        }

        if self.text.trim().is_empty() {
            return Err(AnnouncerError::InvalidConfig(
                "announcement text must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn default_text() -> String {
    DEFAULT_ANNOUNCEMENT.to_string()
}

fn default_interval_secs() -> u64 {
    600
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnnouncementConfig::default();
        assert_eq!(config.interval(), Duration::from_secs(600));
        assert!(config.text.contains("$play"));
        assert!(config.channel.is_none());
    }

    #[test]
    fn test_threshold_falls_back_to_interval() {
        let config = AnnouncementConfig::default().with_interval_secs(120);
        assert_eq!(config.effective_threshold(), 120);

        let config = config.with_threshold(10);
        assert_eq!(config.effective_threshold(), 10);
    }

    #[test]
    fn test_validate() {
        assert!(AnnouncementConfig::default().validate().is_ok());
        assert!(AnnouncementConfig::default()
            .with_interval_secs(0)
            .validate()
            .is_err());
        assert!(AnnouncementConfig::default()
            .with_threshold(0)
            .validate()
            .is_err());
        assert!(AnnouncementConfig::default()
            .with_text(" ")
            .validate()
            .is_err());
    }
}
