//! Tests for src/scanner/session.rs
//! Testing library/framework: Rust built-in test framework with Tokio async runtime (#[tokio::test]).
//! Sessions are driven with the scripted mock decoder and an in-memory
//! order store shared through Arc, so both sides of the flow can be
//! inspected after the session consumes them.

use std::sync::Arc;

use brewpass::scanner::mocks::MockDecoder;
use brewpass::store::mocks::InMemoryOrderStore;
use brewpass::{
    DecodeEvent, DecodedPayload, OrderRecord, OrderStatus, ScanError, ScanSession, ScanState,
    ScanTurn, ScannerConfig, ValidationWorkflow,
};

fn pending_order(id: &str, coffee_type: &str) -> OrderRecord {
    OrderRecord {
        id: id.to_string(),
        is_scanned: false,
        status: OrderStatus::Pending,
        coffee_type: coffee_type.to_string(),
    }
}

fn decoded(data: &str) -> DecodeEvent {
    DecodeEvent::Decoded(DecodedPayload::new(data))
}

fn session_with(
    decoder: MockDecoder,
    store: &Arc<InMemoryOrderStore>,
    config: ScannerConfig,
) -> ScanSession<Arc<InMemoryOrderStore>> {
    ScanSession::new(
        Box::new(decoder),
        ValidationWorkflow::new(Arc::clone(store)),
        config,
    )
}

fn auto_config() -> ScannerConfig {
    ScannerConfig {
        confirm_before_validate: false,
        continuous_scan: false,
    }
}

fn confirm_config() -> ScannerConfig {
    ScannerConfig {
        confirm_before_validate: true,
        continuous_scan: false,
    }
}

#[tokio::test]
async fn start_without_camera_fails_and_stays_idle() {
    let (decoder, _handle) = MockDecoder::new();
    let store = Arc::new(InMemoryOrderStore::new());
    let mut session = session_with(decoder.without_camera(), &store, auto_config());

    let err = session.start().await.expect_err("should fail");
    assert!(matches!(err, ScanError::NoCamera));
    assert_eq!(session.state(), ScanState::Idle {});
}

#[tokio::test]
async fn start_with_unopenable_camera_fails_and_stays_idle() {
    let (decoder, _handle) = MockDecoder::new();
    let store = Arc::new(InMemoryOrderStore::new());
    let mut session = session_with(decoder.failing_open("device busy"), &store, auto_config());

    let err = session.start().await.expect_err("should fail");
    assert!(matches!(err, ScanError::CameraAccess(_)));
    assert_eq!(session.state(), ScanState::Idle {});
}

#[tokio::test]
async fn auto_mode_validates_one_payload_then_stops() {
    let (decoder, handle) = MockDecoder::new();
    let store = Arc::new(InMemoryOrderStore::new().with_order(pending_order("abc123", "Latte")));
    let mut session = session_with(
        decoder.with_events(vec![decoded("abc123")]),
        &store,
        auto_config(),
    );

    session.start().await.expect("start");
    assert_eq!(session.state(), ScanState::Scanning {});

    match session.next_turn().await {
        ScanTurn::Validated(Ok(validated)) => {
            assert_eq!(validated.order.id, "abc123");
            assert_eq!(validated.order.coffee_type, "Latte");
        }
        other => panic!("expected a validation, got {other:?}"),
    }

    // Single-shot: the session stopped itself after one decode.
    assert_eq!(session.state(), ScanState::Idle {});
    assert_eq!(handle.close_count(), 1);
    assert!(store.get("abc123").expect("row present").is_scanned);

    // Further turns report the session as closed.
    assert!(matches!(session.next_turn().await, ScanTurn::Closed));
}

#[tokio::test]
async fn continuous_mode_keeps_scanning_between_validations() {
    let (decoder, _handle) = MockDecoder::new();
    let store = Arc::new(
        InMemoryOrderStore::new()
            .with_order(pending_order("a1", "Latte"))
            .with_order(pending_order("b2", "Mocha")),
    );
    let config = ScannerConfig {
        confirm_before_validate: false,
        continuous_scan: true,
    };
    let mut session = session_with(
        decoder.with_events(vec![decoded("a1"), decoded("b2")]),
        &store,
        config,
    );

    session.start().await.expect("start");
    assert!(matches!(session.next_turn().await, ScanTurn::Validated(Ok(_))));
    assert_eq!(session.state(), ScanState::Scanning {});
    assert!(matches!(session.next_turn().await, ScanTurn::Validated(Ok(_))));
    assert_eq!(session.state(), ScanState::Scanning {});

    assert!(store.get("a1").expect("row").is_scanned);
    assert!(store.get("b2").expect("row").is_scanned);
}

#[tokio::test]
async fn decode_errors_are_skipped_without_ending_the_session() {
    let (decoder, _handle) = MockDecoder::new();
    let store = Arc::new(InMemoryOrderStore::new().with_order(pending_order("abc123", "Latte")));
    let mut session = session_with(
        decoder.with_events(vec![
            DecodeEvent::DecodeError("blurry frame".to_string()),
            DecodeEvent::DecodeError("partial code".to_string()),
            decoded("abc123"),
        ]),
        &store,
        auto_config(),
    );

    session.start().await.expect("start");
    assert!(matches!(session.next_turn().await, ScanTurn::Validated(Ok(_))));
}

#[tokio::test]
async fn confirmation_pauses_the_decoder_until_the_operator_decides() {
    let (decoder, handle) = MockDecoder::new();
    let store = Arc::new(InMemoryOrderStore::new().with_order(pending_order("abc123", "Latte")));
    let mut session = session_with(
        decoder.with_events(vec![decoded("abc123")]),
        &store,
        confirm_config(),
    );

    session.start().await.expect("start");
    match session.next_turn().await {
        ScanTurn::NeedsConfirmation(payload) => assert_eq!(payload, "abc123"),
        other => panic!("expected confirmation request, got {other:?}"),
    }
    assert_eq!(session.state(), ScanState::AwaitingConfirmation {});
    assert_eq!(session.pending_payload(), Some("abc123"));
    assert_eq!(handle.pause_count(), 1);

    // Nothing reached the workflow yet.
    assert_eq!(store.update_call_count(), 0);

    let result = session.confirm().await.expect("pending payload");
    assert!(result.is_ok());
    assert!(store.get("abc123").expect("row").is_scanned);
    // Single-shot variant returns to idle after the confirmed validation.
    assert_eq!(session.state(), ScanState::Idle {});
}

#[tokio::test]
async fn declined_payloads_never_reach_the_workflow() {
    let (decoder, handle) = MockDecoder::new();
    let store = Arc::new(InMemoryOrderStore::new().with_order(pending_order("abc123", "Latte")));
    let mut session = session_with(
        decoder.with_events(vec![decoded("abc123")]),
        &store,
        confirm_config(),
    );

    session.start().await.expect("start");
    assert!(matches!(
        session.next_turn().await,
        ScanTurn::NeedsConfirmation(_)
    ));

    session.decline().await;
    assert_eq!(session.state(), ScanState::Scanning {});
    assert_eq!(session.pending_payload(), None);
    assert_eq!(handle.resume_count(), 1);

    // The store never saw the declined payload.
    assert!(store.issued_calls().is_empty());
    assert!(!store.get("abc123").expect("row").is_scanned);
}

#[tokio::test]
async fn confirmed_payload_in_continuous_mode_returns_to_scanning() {
    let (decoder, handle) = MockDecoder::new();
    let store = Arc::new(InMemoryOrderStore::new().with_order(pending_order("abc123", "Latte")));
    let config = ScannerConfig {
        confirm_before_validate: true,
        continuous_scan: true,
    };
    let mut session = session_with(
        decoder.with_events(vec![decoded("abc123")]),
        &store,
        config,
    );

    session.start().await.expect("start");
    assert!(matches!(
        session.next_turn().await,
        ScanTurn::NeedsConfirmation(_)
    ));
    let result = session.confirm().await.expect("pending payload");
    assert!(result.is_ok());
    assert_eq!(session.state(), ScanState::Scanning {});
    assert_eq!(handle.resume_count(), 1);
}

#[tokio::test]
async fn stop_is_safe_when_idle_and_dispose_is_idempotent() {
    let (decoder, handle) = MockDecoder::new();
    let store = Arc::new(InMemoryOrderStore::new());
    let mut session = session_with(decoder, &store, auto_config());

    // stop() before start is a no-op.
    session.stop().await;
    assert_eq!(session.state(), ScanState::Idle {});

    session.start().await.expect("start");
    session.stop().await;
    assert_eq!(handle.close_count(), 1);

    session.dispose();
    session.dispose();
    session.dispose();
    assert_eq!(handle.dispose_count(), 1);

    // A disposed session cannot be restarted.
    assert!(matches!(
        session.start().await,
        Err(ScanError::Disposed)
    ));
}

#[tokio::test]
async fn dropping_a_session_releases_the_decoder() {
    let (decoder, handle) = MockDecoder::new();
    let store = Arc::new(InMemoryOrderStore::new());
    let mut session = session_with(decoder, &store, auto_config());
    session.start().await.expect("start");
    drop(session);
    assert_eq!(handle.dispose_count(), 1);
}

#[tokio::test]
async fn closed_decoder_channel_ends_the_session() {
    let (decoder, handle) = MockDecoder::new();
    let store = Arc::new(InMemoryOrderStore::new());
    let mut session = session_with(decoder, &store, auto_config());

    session.start().await.expect("start");
    handle.close_channel();
    assert!(matches!(session.next_turn().await, ScanTurn::Closed));
    assert_eq!(session.state(), ScanState::Idle {});
}

#[tokio::test]
async fn payloads_pushed_mid_session_are_consumed_one_at_a_time() {
    let (decoder, handle) = MockDecoder::new();
    let store = Arc::new(
        InMemoryOrderStore::new()
            .with_order(pending_order("a1", "Latte"))
            .with_order(pending_order("b2", "Flat White")),
    );
    let config = ScannerConfig {
        confirm_before_validate: false,
        continuous_scan: true,
    };
    let mut session = session_with(decoder, &store, config);
    session.start().await.expect("start");

    handle.push(decoded("a1")).await;
    handle.push(decoded("b2")).await;

    assert!(matches!(session.next_turn().await, ScanTurn::Validated(Ok(_))));
    assert!(store.get("a1").expect("row").is_scanned);
    // The second payload sat in the channel until we asked for it.
    assert!(!store.get("b2").expect("row").is_scanned);
    assert!(matches!(session.next_turn().await, ScanTurn::Validated(Ok(_))));
    assert!(store.get("b2").expect("row").is_scanned);
}
