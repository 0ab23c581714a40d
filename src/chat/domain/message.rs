//! The Message entity.

use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use super::{GroupId, MessageId, User};

/// A single message within a group.
///
/// A message is created locally with a provisional sentinel id and the
/// clock's current time, then superseded by the authoritative entity the
/// server returns (or pushes). Confirmed messages are immutable.
///
/// # Examples
///
/// ```
/// use mockable::DefaultClock;
/// use palaver::chat::domain::{GroupId, Message, MessageId, User, UserId};
///
/// let clock = DefaultClock;
/// let sender = User::new(UserId::new(1), "ada");
/// let message = Message::new(MessageId::new(-1), GroupId::new(3), sender, "hi", &clock);
/// assert!(message.id().is_provisional());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    id: MessageId,
    group_id: GroupId,
    sender: User,
    text: String,
    created_at: DateTime<Utc>,
}

impl Message {
    /// Creates a message stamped with the clock's current time.
    #[must_use]
    pub fn new(
        id: MessageId,
        group_id: GroupId,
        sender: User,
        text: impl Into<String>,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id,
            group_id,
            sender,
            text: text.into(),
            created_at: clock.utc(),
        }
    }

    /// Creates a message with an explicit timestamp.
    #[must_use]
    pub fn with_timestamp(
        id: MessageId,
        group_id: GroupId,
        sender: User,
        text: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            group_id,
            sender,
            text: text.into(),
            created_at,
        }
    }

    /// Returns the message identifier.
    #[must_use]
    pub const fn id(&self) -> MessageId {
        self.id
    }

    /// Returns the group this message belongs to.
    #[must_use]
    pub const fn group_id(&self) -> GroupId {
        self.group_id
    }

    /// Returns the sending user.
    #[must_use]
    pub const fn sender(&self) -> &User {
        &self.sender
    }

    /// Returns the message text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
