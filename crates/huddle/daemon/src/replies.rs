//! Reply texts sent to members

use crate::config::ReplyConfig;

/// Renders the direct messages sent in answer to a placement request
#[derive(Debug, Clone)]
pub struct Replies {
    operator_contact: String,
}

impl Replies {
    pub fn new(config: &ReplyConfig) -> Self {
        Self {
            operator_contact: config.operator_contact.clone(),
        }
    }

    pub fn invite(&self, name: &str, url: &str) -> String {
        format!(
            "Hello {}, follow this invite to start chatting: {}",
            name, url
        )
    }

    pub fn already_chatting(&self, name: &str, channel: &str) -> String {
        format!(
            "Hello {}, it looks like you are already chatting in channel {}.",
            name, channel
        )
    }

    pub fn all_full(&self) -> String {
        "All channels are full. Please try again later".to_string()
    }

    pub fn config_problem(&self, name: &str) -> String {
        format!(
            "Hello {}, we are having problems with the social chat. Please contact {}",
            name, self.operator_contact
        )
    }
}

impl Default for Replies {
    fn default() -> Self {
        Self::new(&ReplyConfig::default())
    }
}
