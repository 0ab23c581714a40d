//! Unit tests for the cache-merge reducers and the dedup rule.

use chrono::{TimeZone, Utc};
use rstest::rstest;
use serde_json::json;

use crate::chat::domain::{Group, GroupId, Message, MessageId, User, UserId};
use crate::sync::merge;

fn message(id: i64, text: &str) -> Message {
    Message::with_timestamp(
        MessageId::new(id),
        GroupId::new(3),
        User::new(UserId::new(1), "ada"),
        text,
        Utc.timestamp_opt(1_700_000_000, 0).single().unwrap_or_default(),
    )
}

fn group_with(ids: &[i64]) -> Group {
    Group::new(GroupId::new(3), "crew")
        .with_messages(ids.iter().map(|id| message(*id, "m")).collect())
}

fn message_ids(group: &Group) -> Vec<i64> {
    group.messages().iter().map(|m| m.id().value()).collect()
}

#[rstest]
fn pushed_message_is_prepended() {
    let merged = merge::apply_message_added(group_with(&[1]), &message(2, "hi"));
    assert_eq!(message_ids(&merged), vec![2, 1]);
}

#[rstest]
fn pushed_duplicate_is_discarded() {
    let merged = merge::apply_message_added(group_with(&[42, 1]), &message(42, "hi"));
    assert_eq!(message_ids(&merged), vec![42, 1]);
}

#[rstest]
fn confirmation_supersedes_the_sentinel() {
    let pending = group_with(&[-1, 7]);
    let merged = merge::confirm_message(pending, Some(MessageId::new(-1)), &message(42, "hi"));
    assert_eq!(message_ids(&merged), vec![42, 7]);
}

#[rstest]
fn confirmation_after_subscription_echo_clears_the_sentinel() {
    // The echo for id 42 arrived first; the late mutation response must
    // still remove the sentinel and be dropped as a duplicate.
    let raced = group_with(&[42, -1, 7]);
    let merged = merge::confirm_message(raced, Some(MessageId::new(-1)), &message(42, "hi"));
    assert_eq!(message_ids(&merged), vec![42, 7]);
}

#[rstest]
fn speculative_application_inserts_the_sentinel_itself() {
    let merged = merge::confirm_message(group_with(&[7]), Some(MessageId::new(-1)), &message(-1, "hi"));
    assert_eq!(message_ids(&merged), vec![-1, 7]);
}

#[rstest]
fn confirmation_ignores_non_provisional_supersession_hint() {
    let merged = merge::confirm_message(group_with(&[7]), Some(MessageId::new(7)), &message(42, "hi"));
    assert_eq!(message_ids(&merged), vec![42, 7]);
}

#[rstest]
fn pushed_group_is_appended() {
    let user = User::new(UserId::new(1), "ada").with_groups(vec![Group::new(GroupId::new(3), "crew")]);
    let merged = merge::apply_group_added(user, &Group::new(GroupId::new(4), "chess"));

    let ids: Vec<i64> = merged.groups().iter().map(|g| g.id().value()).collect();
    assert_eq!(ids, vec![3, 4]);
}

#[rstest]
fn pushed_group_duplicate_is_discarded() {
    let user = User::new(UserId::new(1), "ada").with_groups(vec![Group::new(GroupId::new(3), "crew")]);
    let merged = merge::apply_group_added(user, &Group::new(GroupId::new(3), "crew"));
    assert_eq!(merged.groups().len(), 1);
}

#[rstest]
fn remove_group_drops_the_membership() {
    let user = User::new(UserId::new(1), "ada").with_groups(vec![
        Group::new(GroupId::new(3), "crew"),
        Group::new(GroupId::new(4), "chess"),
    ]);
    let merged = merge::remove_group(user, GroupId::new(3));

    let ids: Vec<i64> = merged.groups().iter().map(|g| g.id().value()).collect();
    assert_eq!(ids, vec![4]);
}

#[rstest]
fn unreadable_tree_is_returned_unchanged() {
    let tree = json!({ "not": "a group" });
    let merged = merge::merge_pushed_message_tree(tree.clone(), &message(42, "hi"));
    assert_eq!(merged, tree);
}

#[rstest]
fn tree_wrapper_round_trips_through_the_reducer() {
    let tree = serde_json::to_value(group_with(&[1])).unwrap_or_default();
    let merged = merge::merge_pushed_message_tree(tree, &message(2, "hi"));

    let group: Group = serde_json::from_value(merged).unwrap_or_else(|_| group_with(&[]));
    assert_eq!(message_ids(&group), vec![2, 1]);
}
