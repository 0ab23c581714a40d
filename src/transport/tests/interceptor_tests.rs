//! Unit tests for credential attachment and the sign-out short-circuit.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use crate::auth::{
    domain::{Credential, UNAUTHORIZED_MESSAGE},
    ports::MockSignOutHook,
    session::AuthSession,
};
use crate::transport::{
    adapters::memory::ScriptedBatchSender,
    batching::BatchedTransport,
    error::OperationError,
    interceptor::AuthInterceptor,
    ports::BatchSender,
    wire::{WireOperation, WireResult},
};

fn group_query(id: i64) -> WireOperation {
    WireOperation::new("group", json!({ "groupId": id }))
}

fn signed_in_session() -> Arc<AuthSession> {
    let session = Arc::new(AuthSession::new());
    session.sign_in(Credential::new("jwt-1"));
    session
}

#[tokio::test]
async fn credential_is_attached_to_every_operation() {
    let sender = ScriptedBatchSender::new();
    sender.enqueue(Ok(vec![WireResult::data(json!(1)), WireResult::data(json!(2))]));
    let interceptor = AuthInterceptor::new(sender.clone(), signed_in_session());

    let sent = interceptor
        .send(vec![group_query(1), group_query(2)])
        .await;
    assert!(sent.is_ok());

    let batches = sender.batches();
    let batch = batches.first().map(Vec::as_slice).unwrap_or_default();
    assert_eq!(batch.len(), 2);
    assert!(
        batch
            .iter()
            .all(|operation| operation.authorization() == Some("Bearer jwt-1"))
    );
}

#[tokio::test]
async fn signed_out_batches_carry_no_credential() {
    let sender = ScriptedBatchSender::new();
    sender.enqueue(Ok(vec![WireResult::data(json!(1))]));
    let interceptor = AuthInterceptor::new(sender.clone(), Arc::new(AuthSession::new()));

    let sent = interceptor.send(vec![group_query(1)]).await;
    assert!(sent.is_ok());

    let batches = sender.batches();
    let batch = batches.first().map(Vec::as_slice).unwrap_or_default();
    assert!(batch.iter().all(|operation| operation.authorization().is_none()));
}

#[tokio::test]
async fn credential_is_read_at_send_time() {
    let sender = ScriptedBatchSender::new();
    sender.enqueue(Ok(vec![WireResult::data(json!(1))]));
    sender.enqueue(Ok(vec![WireResult::data(json!(2))]));
    let session = Arc::new(AuthSession::new());
    let interceptor = AuthInterceptor::new(sender.clone(), Arc::clone(&session));

    session.sign_in(Credential::new("jwt-1"));
    let first = interceptor.send(vec![group_query(1)]).await;
    assert!(first.is_ok());

    session.sign_in(Credential::new("jwt-2"));
    let second = interceptor.send(vec![group_query(1)]).await;
    assert!(second.is_ok());

    let batches = sender.batches();
    let tokens: Vec<Option<String>> = batches
        .iter()
        .map(|batch| {
            batch
                .first()
                .and_then(|operation| operation.authorization().map(str::to_owned))
        })
        .collect();
    assert_eq!(
        tokens,
        vec![Some("Bearer jwt-1".to_owned()), Some("Bearer jwt-2".to_owned())]
    );
}

#[tokio::test(start_paused = true)]
async fn unauthorized_result_signs_out_once_and_spares_its_batch_mates() {
    let sender = ScriptedBatchSender::new();
    sender.enqueue(Ok(vec![
        WireResult::data(json!({ "id": 1 })),
        WireResult::error(UNAUTHORIZED_MESSAGE),
        WireResult::data(json!({ "id": 3 })),
    ]));

    let session = signed_in_session();
    let mut hook = MockSignOutHook::new();
    hook.expect_on_sign_out().times(1).return_const(());
    session.register_sign_out_hook(Arc::new(hook));

    let transport = BatchedTransport::new(
        AuthInterceptor::new(sender.clone(), Arc::clone(&session)),
        Duration::from_millis(10),
    );

    let (a, b, c) = tokio::join!(
        transport.execute(group_query(1)),
        transport.execute(group_query(2)),
        transport.execute(group_query(3))
    );

    assert_eq!(a, Ok(json!({ "id": 1 })));
    assert_eq!(c, Ok(json!({ "id": 3 })));
    match b {
        Err(error) => assert!(error.is_unauthorized()),
        Ok(value) => panic!("expected authorisation failure, got {value}"),
    }
    assert!(!session.is_signed_in());
    assert_eq!(sender.batch_count(), 1);
}

#[tokio::test]
async fn several_unauthorized_results_still_sign_out_once() {
    let sender = ScriptedBatchSender::new();
    sender.enqueue(Ok(vec![
        WireResult::error(UNAUTHORIZED_MESSAGE),
        WireResult::error(UNAUTHORIZED_MESSAGE),
    ]));

    let session = signed_in_session();
    let mut hook = MockSignOutHook::new();
    hook.expect_on_sign_out().times(1).return_const(());
    session.register_sign_out_hook(Arc::new(hook));

    let interceptor = AuthInterceptor::new(sender, Arc::clone(&session));
    let sent = interceptor.send(vec![group_query(1), group_query(2)]).await;
    assert!(sent.is_ok());
    assert!(!session.is_signed_in());
}

#[tokio::test]
async fn ordinary_errors_pass_through_without_sign_out() {
    let sender = ScriptedBatchSender::new();
    sender.enqueue(Ok(vec![WireResult::error("text too long")]));

    let session = signed_in_session();
    let mut hook = MockSignOutHook::new();
    hook.expect_on_sign_out().never();
    session.register_sign_out_hook(Arc::new(hook));

    let interceptor = AuthInterceptor::new(sender, Arc::clone(&session));
    let sent = interceptor.send(vec![group_query(1)]).await;

    assert!(sent.is_ok());
    assert!(session.is_signed_in());
}

#[tokio::test]
async fn transport_failures_propagate_unchanged() {
    let sender = ScriptedBatchSender::new();
    // Script exhausted: the sender reports a network failure.
    let session = signed_in_session();
    let interceptor = AuthInterceptor::new(sender, Arc::clone(&session));

    let sent = interceptor.send(vec![group_query(1)]).await;
    assert!(sent.is_err());
    assert!(session.is_signed_in());
}

#[tokio::test]
async fn unauthorized_detection_matches_the_exact_marker() {
    let error = OperationError::Server(UNAUTHORIZED_MESSAGE.to_owned());
    assert!(error.is_unauthorized());

    let other = OperationError::Server("unauthorized access".to_owned());
    assert!(!other.is_unauthorized());
}
