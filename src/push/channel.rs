//! The multiplexing subscription channel and its driver task.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, trace, warn};

use crate::auth::session::AuthSession;
use crate::push::{
    backoff::BackoffPolicy,
    domain::{ConnectMetadata, LinkCommand, LinkState, PushEvent, SubscriptionId, Topic},
    ports::PushLink,
};

/// Handler invoked synchronously for each event matching a subscription's
/// topic.
pub type EventHandler = Arc<dyn Fn(PushEvent) + Send + Sync>;

enum DriverCommand {
    TopicOpened(Topic),
    TopicClosed(Topic),
}

struct TopicSubscription {
    topic: Topic,
    handler: EventHandler,
}

/// State shared between the channel handle, subscriptions, and the driver.
struct ChannelShared {
    registry: Mutex<HashMap<SubscriptionId, TopicSubscription>>,
    state: Mutex<LinkState>,
    driver_tx: mpsc::UnboundedSender<DriverCommand>,
    driver_rx: Mutex<Option<mpsc::UnboundedReceiver<DriverCommand>>>,
}

impl ChannelShared {
    fn set_state(&self, next: LinkState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }

    fn state(&self) -> LinkState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn active_topics(&self) -> Vec<Topic> {
        let registry = self.registry.lock().unwrap_or_else(PoisonError::into_inner);
        let mut topics: Vec<Topic> = Vec::new();
        for subscription in registry.values() {
            if !topics.contains(&subscription.topic) {
                topics.push(subscription.topic.clone());
            }
        }
        topics
    }

    fn topic_in_use(&self, topic: &Topic) -> bool {
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .any(|subscription| &subscription.topic == topic)
    }

    fn dispatch(&self, event: &PushEvent) {
        let matched: Vec<(SubscriptionId, EventHandler)> = self
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(_, subscription)| subscription.topic.matches(event))
            .map(|(id, subscription)| (*id, Arc::clone(&subscription.handler)))
            .collect();

        for (id, handler) in matched {
            // Re-check membership so an unsubscribe that raced delivery
            // drops the event instead of invoking a cancelled handler.
            let active = self
                .registry
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .contains_key(&id);
            if active {
                handler(event.clone());
            } else {
                trace!(subscription = %id, "dropping event for cancelled subscription");
            }
        }
    }
}

/// Cancellation token returned by [`SubscriptionChannel::open`].
///
/// Dropping the token does nothing; cancellation is explicit.
pub struct Subscription {
    id: SubscriptionId,
    shared: Arc<ChannelShared>,
}

impl Subscription {
    /// Returns this subscription's identity.
    #[must_use]
    pub const fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Stops event delivery for this subscription.
    ///
    /// Idempotent and immediate: after this returns, no further handler
    /// invocation occurs for this subscription, even for events already in
    /// flight; they are dropped, not queued.
    pub fn unsubscribe(&self) {
        let removed = self
            .shared
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
        let Some(subscription) = removed else {
            return;
        };

        debug!(id = %self.id, "subscription cancelled");
        if !self.shared.topic_in_use(&subscription.topic) {
            let _ = self
                .shared
                .driver_tx
                .send(DriverCommand::TopicClosed(subscription.topic));
        }
    }
}

/// Lazily-connected, reconnecting subscription channel.
///
/// The first [`open`](Self::open) spawns the driver task, which owns the
/// connection lifecycle: `Idle → Connecting → Open ⇄ Reconnecting`. All
/// subscriptions share that one connection, multiplexed by topic. On every
/// (re)connection attempt the driver re-reads the credential from the
/// session and presents the full snapshot of active topics; while
/// disconnected, published events are lost to this client.
pub struct SubscriptionChannel<L> {
    link: Arc<L>,
    session: Arc<AuthSession>,
    backoff: BackoffPolicy,
    shared: Arc<ChannelShared>,
}

impl<L> SubscriptionChannel<L>
where
    L: PushLink + 'static,
{
    /// Creates an idle channel over `link`.
    #[must_use]
    pub fn new(link: L, session: Arc<AuthSession>, backoff: BackoffPolicy) -> Self {
        let (driver_tx, driver_rx) = mpsc::unbounded_channel();
        Self {
            link: Arc::new(link),
            session,
            backoff,
            shared: Arc::new(ChannelShared {
                registry: Mutex::new(HashMap::new()),
                state: Mutex::new(LinkState::Idle),
                driver_tx,
                driver_rx: Mutex::new(Some(driver_rx)),
            }),
        }
    }

    /// Returns the current connection state.
    #[must_use]
    pub fn state(&self) -> LinkState {
        self.shared.state()
    }

    /// Registers a handler for every event matching `topic`.
    ///
    /// Handlers run synchronously on the driver task, in delivery order;
    /// they must not block. The connection is established lazily on the
    /// first call.
    ///
    /// # Panics
    ///
    /// Must be called within a Tokio runtime (the driver is a spawned
    /// task).
    pub fn open(
        &self,
        topic: Topic,
        handler: impl Fn(PushEvent) + Send + Sync + 'static,
    ) -> Subscription {
        let id = SubscriptionId::new();
        self.shared
            .registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id,
                TopicSubscription {
                    topic: topic.clone(),
                    handler: Arc::new(handler),
                },
            );

        let start_driver = {
            let mut state = self
                .shared
                .state
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if *state == LinkState::Idle {
                *state = LinkState::Connecting;
                true
            } else {
                false
            }
        };

        if start_driver {
            debug!("first subscription opened, starting push driver");
            tokio::spawn(run_driver(
                Arc::clone(&self.link),
                Arc::clone(&self.session),
                self.backoff.clone(),
                Arc::clone(&self.shared),
            ));
        } else {
            let _ = self.shared.driver_tx.send(DriverCommand::TopicOpened(topic));
        }

        Subscription {
            id,
            shared: Arc::clone(&self.shared),
        }
    }
}

async fn run_driver<L>(
    link: Arc<L>,
    session: Arc<AuthSession>,
    backoff: BackoffPolicy,
    shared: Arc<ChannelShared>,
) where
    L: PushLink,
{
    let taken = shared
        .driver_rx
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .take();
    let Some(mut commands) = taken else {
        return;
    };

    let mut attempt: u32 = 0;
    loop {
        let metadata = ConnectMetadata {
            credential: session.credential(),
            topics: shared.active_topics(),
        };

        match link.connect(metadata).await {
            Err(error) => {
                warn!(%error, attempt, "push connect attempt failed");
                shared.set_state(LinkState::Reconnecting);
                let delay = backoff.delay(attempt);
                attempt = attempt.saturating_add(1);
                tokio::time::sleep(delay).await;
            }
            Ok(mut socket) => {
                attempt = 0;
                shared.set_state(LinkState::Open);
                debug!("push connection open");

                // Topic changes queued while disconnected are already
                // covered by the snapshot just sent.
                while commands.try_recv().is_ok() {}

                loop {
                    tokio::select! {
                        command = commands.recv() => match command {
                            Some(DriverCommand::TopicOpened(topic)) => {
                                let _ = socket.commands.send(LinkCommand::Subscribe { topic });
                            }
                            Some(DriverCommand::TopicClosed(topic)) => {
                                let _ = socket.commands.send(LinkCommand::Unsubscribe { topic });
                            }
                            None => return,
                        },
                        event = socket.events.recv() => match event {
                            Some(event) => shared.dispatch(&event),
                            None => {
                                warn!("push connection lost, reconnecting");
                                shared.set_state(LinkState::Reconnecting);
                                break;
                            }
                        },
                    }
                }
            }
        }
    }
}
