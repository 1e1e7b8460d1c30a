//! Strongly-typed identifiers for Huddle entities
//!
//! Platform identifiers are opaque 64-bit values (chat platforms hand out
//! snowflake-style ids) wrapped in newtype structs for type safety.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! opaque_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            pub const fn get(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

opaque_id!(
    /// Identifier of a community member
    MemberId,
    "member"
);

opaque_id!(
    /// Identifier of a channel (voice or text)
    ChannelId,
    "channel"
);

opaque_id!(
    /// Identifier of a channel category
    CategoryId,
    "category"
);

opaque_id!(
    /// Identifier of a message posted to a channel.
    ///
    /// Platforms assign message ids in increasing order, so a message id
    /// doubles as a position in the channel's history.
    MessageId,
    "message"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_display_prefix() {
        assert_eq!(MemberId::new(7).to_string(), "member:7");
        assert_eq!(ChannelId::new(42).to_string(), "channel:42");
        assert_eq!(MessageId::from(3).to_string(), "message:3");
    }

    #[test]
    fn test_id_serializes_as_plain_number() {
        let json = serde_json::to_string(&ChannelId::new(1234)).unwrap();
        assert_eq!(json, "1234");

        let back: ChannelId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ChannelId::new(1234));
    }

    #[test]
    fn test_message_ids_order_by_value() {
        assert!(MessageId::new(1) < MessageId::new(2));
    }
}
