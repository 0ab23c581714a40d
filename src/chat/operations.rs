//! Descriptor constructors for the named operation surface.
//!
//! Queries and mutations are identified by operation name plus a variables
//! object; the cache signature for a query is derived from exactly the
//! same pair, so the descriptor built here and the slot it fills can never
//! drift apart.

use serde_json::json;

use crate::cache::domain::QuerySignature;
use crate::chat::domain::{GroupId, UserId};
use crate::transport::wire::WireOperation;

/// Query returning a user with their group memberships.
pub const USER_QUERY: &str = "user";
/// Query returning a group with its members and message history.
pub const GROUP_QUERY: &str = "group";
/// Mutation creating a message; yields the confirmed `Message`.
pub const CREATE_MESSAGE: &str = "createMessage";
/// Mutation creating a group; yields the confirmed `Group`.
pub const CREATE_GROUP: &str = "createGroup";
/// Mutation deleting a group; yields the deleted `Group`.
pub const DELETE_GROUP: &str = "deleteGroup";
/// Mutation removing the signed-in user from a group; yields the `Group`.
pub const LEAVE_GROUP: &str = "leaveGroup";

/// Builds the `user` query for `id`.
#[must_use]
pub fn user_query(id: UserId) -> WireOperation {
    WireOperation::new(USER_QUERY, json!({ "id": id.value() }))
}

/// Returns the cache signature of the `user` query for `id`.
#[must_use]
pub fn user_signature(id: UserId) -> QuerySignature {
    user_query(id).signature()
}

/// Builds the `group` query for `id`.
#[must_use]
pub fn group_query(id: GroupId) -> WireOperation {
    WireOperation::new(GROUP_QUERY, json!({ "groupId": id.value() }))
}

/// Returns the cache signature of the `group` query for `id`.
#[must_use]
pub fn group_signature(id: GroupId) -> QuerySignature {
    group_query(id).signature()
}

/// Builds the `createMessage` mutation.
#[must_use]
pub fn create_message(group_id: GroupId, text: &str) -> WireOperation {
    WireOperation::new(
        CREATE_MESSAGE,
        json!({ "text": text, "groupId": group_id.value() }),
    )
}

/// Builds the `createGroup` mutation.
#[must_use]
pub fn create_group(name: &str, member_ids: &[UserId]) -> WireOperation {
    let user_ids: Vec<i64> = member_ids.iter().map(|id| id.value()).collect();
    WireOperation::new(CREATE_GROUP, json!({ "name": name, "userIds": user_ids }))
}

/// Builds the `deleteGroup` mutation.
#[must_use]
pub fn delete_group(id: GroupId) -> WireOperation {
    WireOperation::new(DELETE_GROUP, json!({ "id": id.value() }))
}

/// Builds the `leaveGroup` mutation.
#[must_use]
pub fn leave_group(id: GroupId) -> WireOperation {
    WireOperation::new(LEAVE_GROUP, json!({ "id": id.value() }))
}
