//! Unit tests for channel laziness, multiplexing, reconnection, and
//! cancellation.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{TimeZone, Utc};

use crate::auth::{domain::Credential, session::AuthSession};
use crate::chat::domain::{GroupId, Message, MessageId, User, UserId};
use crate::push::{
    adapters::memory::InMemoryPushLink,
    backoff::BackoffPolicy,
    channel::SubscriptionChannel,
    domain::{LinkCommand, LinkState, PushEvent, Topic},
};

fn test_backoff() -> BackoffPolicy {
    BackoffPolicy::new(Duration::from_millis(1), Duration::from_millis(4))
}

fn message_in(group: i64) -> Message {
    Message::with_timestamp(
        MessageId::new(42),
        GroupId::new(group),
        User::new(UserId::new(1), "ada"),
        "hi",
        Utc.timestamp_opt(1_700_000_000, 0).single().unwrap_or_default(),
    )
}

fn message_topic(groups: &[i64]) -> Topic {
    Topic::MessageAdded {
        group_ids: groups.iter().copied().map(GroupId::new).collect(),
    }
}

fn counting_handler() -> (Arc<AtomicUsize>, impl Fn(PushEvent) + Send + Sync + 'static) {
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    (count, move |_event| {
        seen.fetch_add(1, Ordering::SeqCst);
    })
}

#[tokio::test(start_paused = true)]
async fn no_connection_is_attempted_before_the_first_open() {
    let (link, mut controller) = InMemoryPushLink::new();
    let channel = SubscriptionChannel::new(link, Arc::new(AuthSession::new()), test_backoff());

    assert_eq!(channel.state(), LinkState::Idle);
    tokio::time::sleep(Duration::from_millis(10)).await;
    assert!(controller.try_next_connection().is_none());
}

#[tokio::test(start_paused = true)]
async fn first_open_connects_with_credential_and_topic_snapshot() {
    let (link, mut controller) = InMemoryPushLink::new();
    let session = Arc::new(AuthSession::new());
    session.sign_in(Credential::new("jwt-1"));
    let channel = SubscriptionChannel::new(link, Arc::clone(&session), test_backoff());

    let (_count, handler) = counting_handler();
    let _subscription = channel.open(message_topic(&[3]), handler);
    assert_eq!(channel.state(), LinkState::Connecting);

    let request = controller.next_connection().await.expect("connect attempt");
    let metadata = request.metadata();
    assert_eq!(
        metadata.credential.as_ref().map(Credential::token),
        Some("jwt-1")
    );
    assert_eq!(metadata.topics, vec![message_topic(&[3])]);

    let _connection = request.accept();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(channel.state(), LinkState::Open);
}

#[tokio::test(start_paused = true)]
async fn absent_credential_still_attempts_the_connection() {
    let (link, mut controller) = InMemoryPushLink::new();
    let channel = SubscriptionChannel::new(link, Arc::new(AuthSession::new()), test_backoff());

    let (_count, handler) = counting_handler();
    let _subscription = channel.open(message_topic(&[3]), handler);

    let request = controller.next_connection().await.expect("connect attempt");
    assert!(request.metadata().credential.is_none());
}

#[tokio::test(start_paused = true)]
async fn matching_events_reach_the_handler() {
    let (link, mut controller) = InMemoryPushLink::new();
    let channel = SubscriptionChannel::new(link, Arc::new(AuthSession::new()), test_backoff());

    let (count, handler) = counting_handler();
    let _subscription = channel.open(message_topic(&[3]), handler);
    let connection = controller
        .next_connection()
        .await
        .expect("connect attempt")
        .accept();
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert!(connection.push(PushEvent::MessageAdded {
        message: message_in(3),
    }));
    // An event outside the topic's filter is ignored.
    assert!(connection.push(PushEvent::MessageAdded {
        message: message_in(9),
    }));
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn unsubscribe_drops_already_queued_events() {
    let (link, mut controller) = InMemoryPushLink::new();
    let channel = SubscriptionChannel::new(link, Arc::new(AuthSession::new()), test_backoff());

    let (count, handler) = counting_handler();
    let subscription = channel.open(message_topic(&[3]), handler);
    let connection = controller
        .next_connection()
        .await
        .expect("connect attempt")
        .accept();
    tokio::time::sleep(Duration::from_millis(1)).await;

    // Queue an event, then cancel before the driver gets to run.
    assert!(connection.push(PushEvent::MessageAdded {
        message: message_in(3),
    }));
    subscription.unsubscribe();
    tokio::time::sleep(Duration::from_millis(5)).await;

    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn unsubscribe_is_idempotent() {
    let (link, mut controller) = InMemoryPushLink::new();
    let channel = SubscriptionChannel::new(link, Arc::new(AuthSession::new()), test_backoff());

    let (_count, handler) = counting_handler();
    let subscription = channel.open(message_topic(&[3]), handler);
    let _connection = controller
        .next_connection()
        .await
        .expect("connect attempt")
        .accept();

    subscription.unsubscribe();
    subscription.unsubscribe();
}

#[tokio::test(start_paused = true)]
async fn connection_loss_reconnects_with_current_credential() {
    let (link, mut controller) = InMemoryPushLink::new();
    let session = Arc::new(AuthSession::new());
    session.sign_in(Credential::new("jwt-1"));
    let channel = SubscriptionChannel::new(link, Arc::clone(&session), test_backoff());

    let (_count, handler) = counting_handler();
    let _subscription = channel.open(message_topic(&[3]), handler);
    let connection = controller
        .next_connection()
        .await
        .expect("first attempt")
        .accept();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(channel.state(), LinkState::Open);

    // Credential rotates while connected; the drop forces a reconnect
    // which must present the rotated value.
    session.sign_in(Credential::new("jwt-2"));
    drop(connection);

    let request = controller.next_connection().await.expect("reconnect");
    assert_eq!(
        request.metadata().credential.as_ref().map(Credential::token),
        Some("jwt-2")
    );
    let _connection = request.accept();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(channel.state(), LinkState::Open);
}

#[tokio::test(start_paused = true)]
async fn rejected_connections_are_retried() {
    let (link, mut controller) = InMemoryPushLink::new();
    let channel = SubscriptionChannel::new(link, Arc::new(AuthSession::new()), test_backoff());

    let (count, handler) = counting_handler();
    let _subscription = channel.open(message_topic(&[3]), handler);

    controller
        .next_connection()
        .await
        .expect("first attempt")
        .reject("no credential");
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(channel.state(), LinkState::Reconnecting);

    let connection = controller
        .next_connection()
        .await
        .expect("retry")
        .accept();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(channel.state(), LinkState::Open);

    assert!(connection.push(PushEvent::MessageAdded {
        message: message_in(3),
    }));
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn later_opens_share_the_connection_and_send_subscribe_frames() {
    let (link, mut controller) = InMemoryPushLink::new();
    let channel = SubscriptionChannel::new(link, Arc::new(AuthSession::new()), test_backoff());

    let (_count_a, handler_a) = counting_handler();
    let _first = channel.open(message_topic(&[3]), handler_a);
    let mut connection = controller
        .next_connection()
        .await
        .expect("connect attempt")
        .accept();
    tokio::time::sleep(Duration::from_millis(1)).await;

    let (_count_b, handler_b) = counting_handler();
    let second_topic = Topic::GroupAdded {
        user_id: UserId::new(1),
    };
    let second = channel.open(second_topic.clone(), handler_b);
    tokio::time::sleep(Duration::from_millis(1)).await;

    // No second connection attempt; the topic rides the live socket.
    assert!(controller.try_next_connection().is_none());
    let frame = connection.next_command().await.expect("subscribe frame");
    assert_eq!(
        frame,
        LinkCommand::Subscribe {
            topic: second_topic.clone()
        }
    );

    second.unsubscribe();
    let frame_after_cancel = connection.next_command().await.expect("unsubscribe frame");
    assert_eq!(
        frame_after_cancel,
        LinkCommand::Unsubscribe {
            topic: second_topic
        }
    );
}

#[tokio::test(start_paused = true)]
async fn events_published_while_disconnected_are_lost() {
    let (link, mut controller) = InMemoryPushLink::new();
    let channel = SubscriptionChannel::new(link, Arc::new(AuthSession::new()), test_backoff());

    let (count, handler) = counting_handler();
    let _subscription = channel.open(message_topic(&[3]), handler);
    let connection = controller
        .next_connection()
        .await
        .expect("first attempt")
        .accept();
    tokio::time::sleep(Duration::from_millis(1)).await;

    drop(connection);
    tokio::time::sleep(Duration::from_millis(1)).await;

    // Reconnect delivers only what the server publishes afterwards.
    let replacement = controller.next_connection().await.expect("reconnect").accept();
    tokio::time::sleep(Duration::from_millis(1)).await;
    assert!(replacement.push(PushEvent::MessageAdded {
        message: message_in(3),
    }));
    tokio::time::sleep(Duration::from_millis(1)).await;

    assert_eq!(count.load(Ordering::SeqCst), 1);
}
