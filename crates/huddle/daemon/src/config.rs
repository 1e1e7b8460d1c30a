//! Configuration for huddle-daemon

use huddle_allocator::PlacementConfig;
use huddle_announcer::AnnouncementConfig;
use huddle_types::ChannelId;
use serde::{Deserialize, Serialize};

use crate::error::{DaemonError, DaemonResult};

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Channel placement
    #[serde(default)]
    pub placement: PlacementConfig,

    /// Periodic announcement
    #[serde(default)]
    pub announcement: AnnouncementConfig,

    /// Reply wording
    #[serde(default)]
    pub replies: ReplyConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Reply configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplyConfig {
    /// Who members should contact when the service is misconfigured
    #[serde(default = "default_operator_contact")]
    pub operator_contact: String,
}

impl Default for ReplyConfig {
    fn default() -> Self {
        Self {
            operator_contact: default_operator_contact(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_operator_contact() -> String {
    "@loc".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration: defaults, then an optional file, then
    /// `HUDDLE_`-prefixed environment variables (`__` between sections,
    /// e.g. `HUDDLE_PLACEMENT__CATEGORY`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("HUDDLE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }

    /// Text channel the announcer posts to: the announcement channel if
    /// set, otherwise the request-origin channel
    pub fn announcement_channel(&self) -> Option<ChannelId> {
        self.announcement.channel.or(self.placement.origin_channel)
    }

    /// Announcement config with the effective channel filled in
    pub fn effective_announcement(&self) -> AnnouncementConfig {
        AnnouncementConfig {
            channel: self.announcement_channel(),
            ..self.announcement.clone()
        }
    }

    /// Validate everything the daemon needs before it starts
    pub fn validate(&self) -> DaemonResult<()> {
        self.placement
            .validate()
            .map_err(|e| DaemonError::Config(e.to_string()))?;
        self.announcement
            .validate()
            .map_err(|e| DaemonError::Config(e.to_string()))?;
        Ok(())
    }
}
