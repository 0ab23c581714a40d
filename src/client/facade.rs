//! The `ChatClient` facade.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use mockable::Clock;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::auth::session::AuthSession;
use crate::cache::{domain::CacheEntry, store::ResultCache};
use crate::chat::domain::{Group, GroupId, Message, MessageId, User, UserId};
use crate::chat::operations;
use crate::client::config::ClientConfig;
use crate::push::{
    channel::{Subscription, SubscriptionChannel},
    domain::{LinkState, PushEvent, Topic},
    ports::PushLink,
};
use crate::sync::{merge, patch::CachePatchTxn, reconciler::MutationReconciler};
use crate::transport::{
    batching::BatchedTransport, error::OperationError, interceptor::AuthInterceptor,
    ports::BatchSender,
};

/// The composed synchronisation engine.
///
/// Owns one result cache fed from three directions: optimistic writes made
/// before a mutation is sent, authoritative mutation responses, and push
/// events merged by the subscription reducers. The credential context is
/// passed in explicitly and shared with the transport interceptor and the
/// push driver, so a sign-out takes effect on the next network action of
/// either path.
pub struct ChatClient<S, L, K>
where
    S: BatchSender + 'static,
    L: PushLink + 'static,
    K: Clock + Send + Sync,
{
    session: Arc<AuthSession>,
    cache: Arc<ResultCache>,
    transport: BatchedTransport<AuthInterceptor<S>>,
    reconciler: MutationReconciler<AuthInterceptor<S>>,
    channel: SubscriptionChannel<L>,
    clock: Arc<K>,
    provisional_ids: AtomicI64,
}

impl<S, L, K> ChatClient<S, L, K>
where
    S: BatchSender + 'static,
    L: PushLink + 'static,
    K: Clock + Send + Sync,
{
    /// Composes the engine over the two network ports.
    #[must_use]
    pub fn new(
        session: Arc<AuthSession>,
        backend: S,
        link: L,
        clock: Arc<K>,
        config: ClientConfig,
    ) -> Self {
        let cache = Arc::new(ResultCache::new());
        let transport = BatchedTransport::new(
            AuthInterceptor::new(backend, Arc::clone(&session)),
            config.batch_window,
        );
        let reconciler = MutationReconciler::new(transport.clone(), Arc::clone(&cache));
        let channel = SubscriptionChannel::new(link, Arc::clone(&session), config.reconnect);
        Self {
            session,
            cache,
            transport,
            reconciler,
            channel,
            clock,
            provisional_ids: AtomicI64::new(-1),
        }
    }

    /// Returns the shared credential context.
    #[must_use]
    pub const fn session(&self) -> &Arc<AuthSession> {
        &self.session
    }

    /// Returns the shared result cache (the render source).
    #[must_use]
    pub const fn cache(&self) -> &Arc<ResultCache> {
        &self.cache
    }

    /// Returns the push connection state.
    #[must_use]
    pub fn connection_state(&self) -> LinkState {
        self.channel.state()
    }

    /// Fetches a user with their group memberships, filling the cache.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError`] on transport failure, a server-side
    /// rejection, or an unreadable payload.
    pub async fn fetch_user(&self, id: UserId) -> Result<User, OperationError> {
        let operation = operations::user_query(id);
        let signature = operation.signature();
        let value = self.transport.execute(operation).await?;
        self.cache
            .write(signature, CacheEntry::authoritative(value.clone()));
        decode(value)
    }

    /// Fetches a group with its message history, filling the cache.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError`] on transport failure, a server-side
    /// rejection, or an unreadable payload.
    pub async fn fetch_group(&self, id: GroupId) -> Result<Group, OperationError> {
        let operation = operations::group_query(id);
        let signature = operation.signature();
        let value = self.transport.execute(operation).await?;
        self.cache
            .write(signature, CacheEntry::authoritative(value.clone()));
        decode(value)
    }

    /// Returns the cached user result, if present and readable.
    #[must_use]
    pub fn cached_user(&self, id: UserId) -> Option<User> {
        self.cache
            .read(&operations::user_signature(id))
            .and_then(|entry| serde_json::from_value(entry.into_value()).ok())
    }

    /// Returns the cached group result, if present and readable.
    #[must_use]
    pub fn cached_group(&self, id: GroupId) -> Option<Group> {
        self.cache
            .read(&operations::group_signature(id))
            .and_then(|entry| serde_json::from_value(entry.into_value()).ok())
    }

    /// Sends a message optimistically.
    ///
    /// A sentinel-id message from `sender` appears in the group's cached
    /// history immediately; the confirmed entity supersedes it when the
    /// response (or its subscription echo, whichever is first) arrives.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError`] after reverting the optimistic entry.
    pub async fn send_message(
        &self,
        group_id: GroupId,
        sender: User,
        text: &str,
    ) -> Result<Message, OperationError> {
        let provisional = self.next_provisional_id();
        let optimistic = Message::new(provisional, group_id, sender, text, self.clock.as_ref());
        let speculative = serde_json::to_value(&optimistic).ok();
        let signature = operations::group_signature(group_id);

        let patch = move |txn: &mut CachePatchTxn<'_>, result: &Value| {
            match serde_json::from_value::<Message>(result.clone()) {
                Ok(incoming) => txn.modify(&signature, |tree| {
                    tree.map(|t| merge::confirm_message_tree(t, Some(provisional), &incoming))
                }),
                Err(error) => warn!(%error, "ignoring unreadable createMessage result"),
            }
        };

        let value = self
            .reconciler
            .mutate(operations::create_message(group_id, text), speculative, patch)
            .await?;
        decode(value)
    }

    /// Creates a group and appends it to `owner`'s cached memberships.
    ///
    /// No optimistic entry is written; the group appears once confirmed,
    /// deduplicated against a subscription echo.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError`] on failure; the cache is untouched.
    pub async fn create_group(
        &self,
        name: &str,
        member_ids: &[UserId],
        owner: UserId,
    ) -> Result<Group, OperationError> {
        let signature = operations::user_signature(owner);
        let patch = move |txn: &mut CachePatchTxn<'_>, result: &Value| {
            match serde_json::from_value::<Group>(result.clone()) {
                Ok(incoming) => txn.modify(&signature, |tree| {
                    tree.map(|t| merge::confirm_group_tree(t, &incoming))
                }),
                Err(error) => warn!(%error, "ignoring unreadable createGroup result"),
            }
        };

        let value = self
            .reconciler
            .mutate(operations::create_group(name, member_ids), None, patch)
            .await?;
        decode(value)
    }

    /// Deletes a group, dropping it from `user_id`'s cached memberships
    /// and discarding the group's own cache entry.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError`] on failure; the cache is untouched.
    pub async fn delete_group(&self, id: GroupId, user_id: UserId) -> Result<(), OperationError> {
        let request = operations::delete_group(id);
        self.reconciler
            .mutate(request, None, membership_removal_patch(id, user_id))
            .await?;
        Ok(())
    }

    /// Leaves a group; the cache effect mirrors [`Self::delete_group`] for
    /// the leaving user.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError`] on failure; the cache is untouched.
    pub async fn leave_group(&self, id: GroupId, user_id: UserId) -> Result<(), OperationError> {
        let request = operations::leave_group(id);
        self.reconciler
            .mutate(request, None, membership_removal_patch(id, user_id))
            .await?;
        Ok(())
    }

    /// Subscribes to messages created in `group_ids`, merging each pushed
    /// message into the owning group's cached history.
    ///
    /// The reducer deduplicates by message id, so the local user's own
    /// mutation echoing back is discarded. A pushed message for a group
    /// with no cache entry is dropped; a later query fills the slot.
    ///
    /// # Panics
    ///
    /// Must be called within a Tokio runtime (the push driver is a
    /// spawned task).
    pub fn subscribe_to_messages(&self, group_ids: Vec<GroupId>) -> Subscription {
        let cache = Arc::clone(&self.cache);
        self.channel
            .open(Topic::MessageAdded { group_ids }, move |event| {
                if let PushEvent::MessageAdded { message } = event {
                    let signature = operations::group_signature(message.group_id());
                    let prior = cache.update(&signature, |entry| {
                        entry.map(|e| {
                            e.map_value(|tree| merge::merge_pushed_message_tree(tree, &message))
                        })
                    });
                    if prior.is_none() {
                        debug!(group = %message.group_id(), "dropping pushed message for uncached group");
                    }
                }
            })
    }

    /// Subscribes to groups `user_id` is added to, appending each pushed
    /// group to the cached membership list.
    ///
    /// # Panics
    ///
    /// Must be called within a Tokio runtime (the push driver is a
    /// spawned task).
    pub fn subscribe_to_groups(&self, user_id: UserId) -> Subscription {
        let cache = Arc::clone(&self.cache);
        self.channel
            .open(Topic::GroupAdded { user_id }, move |event| {
                if let PushEvent::GroupAdded { group, .. } = event {
                    let signature = operations::user_signature(user_id);
                    let prior = cache.update(&signature, |entry| {
                        entry
                            .map(|e| e.map_value(|tree| merge::merge_pushed_group_tree(tree, &group)))
                    });
                    if prior.is_none() {
                        debug!(user = %user_id, "dropping pushed group for uncached user");
                    }
                }
            })
    }

    fn next_provisional_id(&self) -> MessageId {
        MessageId::new(self.provisional_ids.fetch_sub(1, Ordering::Relaxed))
    }
}

fn membership_removal_patch(
    id: GroupId,
    user_id: UserId,
) -> impl Fn(&mut CachePatchTxn<'_>, &Value) + Send + Sync {
    let user_signature = operations::user_signature(user_id);
    let group_signature = operations::group_signature(id);
    move |txn, _result| {
        txn.modify(&user_signature, |tree| {
            tree.map(|t| merge::remove_group_tree(t, id))
        });
        txn.remove(&group_signature);
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, OperationError> {
    serde_json::from_value(value).map_err(|error| OperationError::Decode(error.to_string()))
}
