//! Integration tests for the send-message saga.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use contracts::{SendMessageCommand, SendMessageResult};
use envelope::CausationId;
use saga::{
    InMemoryAssetDebiter, InMemoryMessageStore, InMemoryValidator, SagaOrchestrator,
};

type TestOrchestrator =
    SagaOrchestrator<InMemoryValidator, InMemoryMessageStore, InMemoryAssetDebiter>;

struct TestHarness {
    orchestrator: TestOrchestrator,
    validator: InMemoryValidator,
    persistor: InMemoryMessageStore,
    debiter: InMemoryAssetDebiter,
}

impl TestHarness {
    fn new() -> Self {
        let validator = InMemoryValidator::new();
        let persistor = InMemoryMessageStore::new();
        let debiter = InMemoryAssetDebiter::new();

        let orchestrator =
            SagaOrchestrator::new(validator.clone(), persistor.clone(), debiter.clone());

        Self {
            orchestrator,
            validator,
            persistor,
            debiter,
        }
    }

    fn with_timeout(mut self, timeout: Duration) -> Self {
        self.orchestrator = self.orchestrator.with_timeout(timeout);
        self
    }
}

fn command() -> SendMessageCommand {
    SendMessageCommand {
        user_session_token: "sess-42".to_string(),
        character_id: "char-7".to_string(),
        message_type: "GIFT".to_string(),
        message_content: serde_json::json!({ "gift_id": "g001" }),
        idempotency_key: "idem-42".to_string(),
        trace_id: "client-trace-42".to_string(),
    }
}

#[tokio::test]
async fn test_happy_path_completes() {
    let h = TestHarness::new();

    let result = h.orchestrator.execute(command(), "user-42").await;

    assert!(result.payload.is_success());
    assert_eq!(result.payload.status(), "SUCCESS");
    assert_eq!(result.payload.trace_id(), result.correlation_id());

    // All three collaborators were invoked exactly once.
    assert_eq!(h.validator.validation_count(), 1);
    assert_eq!(h.persistor.message_count(), 1);
    assert_eq!(h.debiter.debit_count(), 1);
}

#[tokio::test]
async fn test_validation_failure_skips_downstream_steps() {
    let h = TestHarness::new();
    h.validator.set_reject("INVALID_CONTENT");

    let result = h.orchestrator.execute(command(), "user-42").await;

    assert!(matches!(
        result.payload,
        SendMessageResult::ValidationFailed(_)
    ));
    assert_eq!(result.payload.error_code(), Some("VALIDATION_FAILED"));

    // Neither the persistor nor the debiter was ever invoked.
    assert!(h.persistor.recorded_traces().is_empty());
    assert!(h.debiter.recorded_traces().is_empty());
}

#[tokio::test]
async fn test_insufficient_asset_after_persistence() {
    let h = TestHarness::new();
    h.debiter.set_insufficient(true);

    let result = h.orchestrator.execute(command(), "user-42").await;

    assert!(matches!(
        result.payload,
        SendMessageResult::InsufficientAsset(_)
    ));
    assert_eq!(result.payload.error_code(), Some("INSUFFICIENT_ASSET"));

    // The message was recorded before the debit was refused.
    assert_eq!(h.persistor.message_count(), 1);
    assert_eq!(h.debiter.debit_count(), 0);
}

#[tokio::test]
async fn test_persistor_fault_is_internal_error_and_debiter_never_called() {
    let h = TestHarness::new();
    h.persistor.set_fail_on_save(true);

    let result = h.orchestrator.execute(command(), "user-42").await;

    let SendMessageResult::InternalError(data) = &result.payload else {
        panic!("expected InternalError, got {:?}", result.payload);
    };
    assert!(!data.message.is_empty());

    // Step A's failure short-circuits Step B.
    assert!(h.debiter.recorded_traces().is_empty());
}

#[tokio::test]
async fn test_validator_fault_is_internal_error() {
    let h = TestHarness::new();
    h.validator.set_fail_on_validate(true);

    let result = h.orchestrator.execute(command(), "user-42").await;

    let SendMessageResult::InternalError(data) = &result.payload else {
        panic!("expected InternalError, got {:?}", result.payload);
    };
    assert!(data.message.contains("validation service"));
    assert!(h.persistor.recorded_traces().is_empty());
}

#[tokio::test]
async fn test_debiter_fault_is_internal_error() {
    let h = TestHarness::new();
    h.debiter.set_fail_on_consume(true);

    let result = h.orchestrator.execute(command(), "user-42").await;

    assert!(matches!(result.payload, SendMessageResult::InternalError(_)));
    // The message was persisted before the debit faulted.
    assert_eq!(h.persistor.message_count(), 1);
}

#[tokio::test]
async fn test_hung_collaborator_resolves_at_the_timeout_bound() {
    let h = TestHarness::new().with_timeout(Duration::from_millis(200));
    h.debiter.set_hang_on_consume(true);

    let started = Instant::now();
    let result = h.orchestrator.execute(command(), "user-42").await;
    let elapsed = started.elapsed();

    let SendMessageResult::InternalError(data) = &result.payload else {
        panic!("expected InternalError, got {:?}", result.payload);
    };
    assert!(data.message.contains("timed out"));

    // Resolved at approximately the configured bound, not indefinitely.
    assert!(elapsed >= Duration::from_millis(200));
    assert!(elapsed < Duration::from_secs(2));

    // The hung call was reached: persistence completed, the debit did not.
    assert_eq!(h.persistor.message_count(), 1);
    assert_eq!(h.debiter.debit_count(), 0);
}

#[tokio::test]
async fn test_causal_chain_is_rooted_and_acyclic() {
    let h = TestHarness::new();

    let result = h.orchestrator.execute(command(), "user-42").await;
    let correlation = result.correlation_id();

    let traces: Vec<_> = h
        .validator
        .recorded_traces()
        .into_iter()
        .chain(h.persistor.recorded_traces())
        .chain(h.debiter.recorded_traces())
        .collect();
    assert_eq!(traces.len(), 3);

    // Every envelope carries the root's correlation id, and every
    // causation id points at the single root command envelope.
    let mut causes = HashSet::new();
    for trace in &traces {
        assert_eq!(trace.correlation_id, correlation);
        let cause = trace.causation_id.as_event().expect("non-root envelope");
        causes.insert(cause);
    }
    assert_eq!(causes.len(), 1);

    // The result envelope chains from the same root event.
    assert_eq!(
        result.trace.causation_id.as_event(),
        causes.iter().next().copied()
    );
    assert!(!matches!(result.trace.causation_id, CausationId::Root));
}

#[tokio::test]
async fn test_concurrent_sagas_are_independent() {
    let h = TestHarness::new();

    let (r1, r2) = tokio::join!(
        h.orchestrator.execute(command(), "user-a"),
        h.orchestrator.execute(command(), "user-b"),
    );

    assert!(r1.payload.is_success());
    assert!(r2.payload.is_success());
    assert_ne!(r1.correlation_id(), r2.correlation_id());

    assert_eq!(h.validator.validation_count(), 2);
    assert_eq!(h.persistor.message_count(), 2);
    assert_eq!(h.debiter.debit_count(), 2);
}

#[tokio::test]
async fn test_one_saga_fails_other_succeeds() {
    let good = TestHarness::new();
    let bad = TestHarness::new();
    bad.debiter.set_insufficient(true);

    let r1 = good.orchestrator.execute(command(), "user-a").await;
    let r2 = bad.orchestrator.execute(command(), "user-b").await;

    assert!(r1.payload.is_success());
    assert!(matches!(r2.payload, SendMessageResult::InsufficientAsset(_)));
    assert_eq!(good.debiter.debit_count(), 1);
    assert_eq!(bad.debiter.debit_count(), 0);
}

#[tokio::test]
async fn test_every_outcome_carries_the_actor_identity() {
    let h = TestHarness::new();
    h.validator.set_reject("INVALID_CONTENT");

    let result = h.orchestrator.execute(command(), "user-42").await;

    // Governance metadata survives from root to terminal result.
    assert_eq!(result.actor_id(), "user-42");
}
