//! Topics, push events, and connection-level types.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::auth::domain::Credential;
use crate::chat::domain::{Group, GroupId, Message, UserId};

/// A server-side filter scoping which push events a subscription receives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "topic", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Topic {
    /// Messages created in any of the given groups.
    MessageAdded {
        /// The groups to watch.
        group_ids: Vec<GroupId>,
    },
    /// Groups the given user is added to.
    GroupAdded {
        /// The user whose memberships to watch.
        user_id: UserId,
    },
}

impl Topic {
    /// Returns `true` when `event` falls within this topic's filter.
    #[must_use]
    pub fn matches(&self, event: &PushEvent) -> bool {
        match (self, event) {
            (Self::MessageAdded { group_ids }, PushEvent::MessageAdded { message }) => {
                group_ids.contains(&message.group_id())
            }
            (Self::GroupAdded { user_id }, PushEvent::GroupAdded { user_id: target, .. }) => {
                user_id == target
            }
            _ => false,
        }
    }
}

/// One push notification from the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PushEvent {
    /// A message was created in a subscribed group, possibly by the local
    /// user's own mutation echoing back.
    MessageAdded {
        /// The full confirmed message.
        message: Message,
    },
    /// A user was added to a group.
    GroupAdded {
        /// The user who gained the membership.
        user_id: UserId,
        /// The full group entity.
        group: Group,
    },
}

/// Frames the client sends on a live connection to adjust its topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LinkCommand {
    /// Start receiving events for `topic`.
    Subscribe {
        /// The topic to add.
        topic: Topic,
    },
    /// Stop receiving events for `topic`.
    Unsubscribe {
        /// The topic to drop.
        topic: Topic,
    },
}

/// Connection-level metadata sent on every (re)connection attempt.
///
/// The credential is read from the session at the moment of the attempt;
/// an absent credential still connects (the server may reject or scope the
/// topics to nothing).
#[derive(Debug, Clone)]
pub struct ConnectMetadata {
    /// The credential current at connect time, if signed in.
    pub credential: Option<Credential>,
    /// The full snapshot of topics active at connect time.
    pub topics: Vec<Topic>,
}

/// Observable lifecycle of the shared connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    /// No subscription has been opened yet; no socket exists.
    Idle,
    /// The first connection attempt is in progress.
    Connecting,
    /// The connection is established and delivering events.
    Open,
    /// The connection was lost or refused; a retry is scheduled.
    Reconnecting,
}

/// Identity of one open subscription (the cancellation token's handle).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    /// Creates a fresh handle identity.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
