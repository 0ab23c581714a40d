//! Pure cache-merge reducers.
//!
//! Each reducer takes the previous result tree and one incoming entity and
//! produces the next tree. The dedup rule is load-bearing: before
//! inserting, check whether an entity with the same identity already
//! exists in the target list, and if so discard the incoming payload
//! entirely. That check is what keeps a mutation response and its own
//! subscription echo from inserting the same entity twice.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::warn;

use crate::chat::domain::{Group, GroupId, Message, MessageId, User};

/// Merges a pushed message into a group's history.
///
/// Discards the message if its id is already present; otherwise prepends
/// it (the history is most-recent-first).
#[must_use]
pub fn apply_message_added(mut group: Group, incoming: &Message) -> Group {
    if group.contains_message(incoming.id()) {
        return group;
    }
    group.prepend_message(incoming.clone());
    group
}

/// Merges a pushed group into a user's membership list.
///
/// Discards the group if its id is already present; otherwise appends it.
/// The pushed entity is inserted as-is; a later authoritative query fills
/// in whatever fields the push omitted.
#[must_use]
pub fn apply_group_added(mut user: User, incoming: &Group) -> User {
    if user.contains_group(incoming.id()) {
        return user;
    }
    user.append_group(incoming.clone());
    user
}

/// Replaces a provisional message with its confirmed counterpart.
///
/// The sentinel is removed *before* the dedup check: if the confirmed
/// entity already arrived over the subscription channel, the mutation
/// response must still clear the sentinel and then be discarded as a
/// duplicate, leaving exactly one entry.
#[must_use]
pub fn confirm_message(mut group: Group, provisional: Option<MessageId>, confirmed: &Message) -> Group {
    if let Some(sentinel) = provisional {
        if sentinel.is_provisional() && sentinel != confirmed.id() {
            group.retain_messages(|message| message.id() != sentinel);
        }
    }
    if group.contains_message(confirmed.id()) {
        return group;
    }
    group.prepend_message(confirmed.clone());
    group
}

/// Adds a confirmed group to a user's membership list, deduplicating
/// against a subscription echo that may have arrived first.
#[must_use]
pub fn confirm_group(user: User, confirmed: &Group) -> User {
    apply_group_added(user, confirmed)
}

/// Removes a group from a user's membership list.
#[must_use]
pub fn remove_group(mut user: User, id: GroupId) -> User {
    user.remove_group(id);
    user
}

fn map_tree<T, F>(tree: Value, f: F) -> Value
where
    T: DeserializeOwned + Serialize,
    F: FnOnce(T) -> T,
{
    match serde_json::from_value::<T>(tree.clone()) {
        Ok(entity) => serde_json::to_value(f(entity)).unwrap_or(tree),
        Err(error) => {
            warn!(%error, "leaving unreadable cache tree unchanged");
            tree
        }
    }
}

/// [`apply_message_added`] over a raw group result tree.
#[must_use]
pub fn merge_pushed_message_tree(tree: Value, incoming: &Message) -> Value {
    map_tree::<Group, _>(tree, |group| apply_message_added(group, incoming))
}

/// [`apply_group_added`] over a raw user result tree.
#[must_use]
pub fn merge_pushed_group_tree(tree: Value, incoming: &Group) -> Value {
    map_tree::<User, _>(tree, |user| apply_group_added(user, incoming))
}

/// [`confirm_message`] over a raw group result tree.
#[must_use]
pub fn confirm_message_tree(tree: Value, provisional: Option<MessageId>, confirmed: &Message) -> Value {
    map_tree::<Group, _>(tree, |group| confirm_message(group, provisional, confirmed))
}

/// [`confirm_group`] over a raw user result tree.
#[must_use]
pub fn confirm_group_tree(tree: Value, confirmed: &Group) -> Value {
    map_tree::<User, _>(tree, |user| confirm_group(user, confirmed))
}

/// [`remove_group`] over a raw user result tree.
#[must_use]
pub fn remove_group_tree(tree: Value, id: GroupId) -> Value {
    map_tree::<User, _>(tree, |user| remove_group(user, id))
}
