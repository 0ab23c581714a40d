//! The User entity.

use serde::{Deserialize, Serialize};

use super::{Group, GroupId, UserId};

/// A chat participant and the groups they belong to.
///
/// Queries return the `groups` list only at the top level of a `user`
/// result; nested senders and members arrive without it, so the field
/// defaults to empty on deserialisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    username: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    email: Option<String>,
    #[serde(default)]
    groups: Vec<Group>,
}

impl User {
    /// Creates a user with no email and no group memberships.
    #[must_use]
    pub fn new(id: UserId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            email: None,
            groups: Vec::new(),
        }
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Sets the group memberships.
    #[must_use]
    pub fn with_groups(mut self, groups: Vec<Group>) -> Self {
        self.groups = groups;
        self
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn id(&self) -> UserId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Returns the email address, if known.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the group memberships.
    #[must_use]
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Returns `true` if a group with `id` is already in the membership
    /// list.
    #[must_use]
    pub fn contains_group(&self, id: GroupId) -> bool {
        self.groups.iter().any(|group| group.id() == id)
    }

    /// Appends a group to the end of the membership list.
    pub fn append_group(&mut self, group: Group) {
        self.groups.push(group);
    }

    /// Removes the group with `id`, if present.
    pub fn remove_group(&mut self, id: GroupId) {
        self.groups.retain(|group| group.id() != id);
    }
}
