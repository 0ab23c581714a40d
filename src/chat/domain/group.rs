//! The Group aggregate.

use serde::{Deserialize, Serialize};

use super::{GroupId, Message, MessageId, User};

/// A chat group: its members and its message history.
///
/// The `messages` list is stored most-recent-first; display ordering is
/// the renderer's concern. The list never contains two entries with the
/// same id, and at most one entry carries a provisional sentinel id per
/// pending optimistic send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    id: GroupId,
    name: String,
    #[serde(default)]
    members: Vec<User>,
    #[serde(default)]
    messages: Vec<Message>,
}

impl Group {
    /// Creates an empty group.
    #[must_use]
    pub fn new(id: GroupId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            members: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Sets the member list.
    #[must_use]
    pub fn with_members(mut self, members: Vec<User>) -> Self {
        self.members = members;
        self
    }

    /// Sets the message history, most recent first.
    #[must_use]
    pub fn with_messages(mut self, messages: Vec<Message>) -> Self {
        self.messages = messages;
        self
    }

    /// Returns the group identifier.
    #[must_use]
    pub const fn id(&self) -> GroupId {
        self.id
    }

    /// Returns the group name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the member list.
    #[must_use]
    pub fn members(&self) -> &[User] {
        &self.members
    }

    /// Returns the message history, most recent first.
    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns `true` if a message with `id` is already in the history.
    #[must_use]
    pub fn contains_message(&self, id: MessageId) -> bool {
        self.messages.iter().any(|message| message.id() == id)
    }

    /// Inserts a message at the head of the history.
    pub fn prepend_message(&mut self, message: Message) {
        self.messages.insert(0, message);
    }

    /// Keeps only the messages for which `keep` returns `true`.
    pub fn retain_messages(&mut self, keep: impl FnMut(&Message) -> bool) {
        self.messages.retain(keep);
    }
}
