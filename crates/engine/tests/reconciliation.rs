//! Integration tests for the reconciliation engine.

use std::time::Duration;

use chrono::{TimeZone, Utc};
use common::CorrelationId;
use domain::{
    Amount, CampaignSettings, ContributionStatus, PaymentConfirmation, PhoneNumber,
    RESULT_CANCELLED_BY_USER, RESULT_PENDING, RESULT_SUCCESS,
};
use engine::{EngineError, InitiateRequest, ReconcileAck, Reconciler};
use gateway::{GatewayError, InMemoryGateway, StatusResponse};
use store::{ContributionStore, InMemoryContributionStore};

fn settings() -> CampaignSettings {
    CampaignSettings {
        target_amount: Amount::from_kes(2_300_000),
        event_start: Utc.with_ymd_and_hms(2026, 12, 5, 8, 0, 0).unwrap(),
        event_end: Utc.with_ymd_and_hms(2026, 12, 7, 18, 0, 0).unwrap(),
        account_reference: "Camp2025".to_string(),
        max_contribution: Amount::from_kes(1_000_000),
        is_active: true,
    }
}

fn reconciler(
    store: InMemoryContributionStore,
    gateway: InMemoryGateway,
) -> Reconciler<InMemoryContributionStore, InMemoryGateway> {
    Reconciler::new(store, gateway, settings(), Duration::from_secs(5))
}

fn jane() -> InitiateRequest {
    InitiateRequest {
        full_name: "Jane Doe".to_string(),
        phone: "0712345678".to_string(),
        email: "jane@x.com".to_string(),
        amount_kes: 500.0,
    }
}

fn success_confirmation() -> PaymentConfirmation {
    PaymentConfirmation {
        amount: Some(Amount::from_kes(500)),
        receipt: Some("QAX123".to_string()),
        phone: Some(PhoneNumber::parse("0712345678").unwrap()),
    }
}

/// Initiates a contribution and returns its correlation ID.
async fn initiated(
    engine: &Reconciler<InMemoryContributionStore, InMemoryGateway>,
) -> CorrelationId {
    engine.initiate(jane()).await.unwrap().correlation_id
}

#[tokio::test]
async fn test_initiate_creates_pending_record_with_correlation_id() {
    let store = InMemoryContributionStore::new();
    let gateway = InMemoryGateway::default();
    let engine = reconciler(store.clone(), gateway.clone());

    let receipt = engine.initiate(jane()).await.unwrap();
    assert_eq!(receipt.correlation_id, CorrelationId::new("ws_CO_0001"));

    let record = store
        .find_by_correlation_id(&receipt.correlation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.id, receipt.contribution_id);
    assert_eq!(record.status, ContributionStatus::Pending);
    assert!(!record.is_verified);
    assert_eq!(record.phone.as_str(), "254712345678");
    assert_eq!(record.amount, Amount::from_kes(500));

    // The push carried the normalized phone and account reference.
    let push = gateway.push(&receipt.correlation_id).unwrap();
    assert_eq!(push.phone.as_str(), "254712345678");
    assert_eq!(push.reference, "Camp2025");
}

#[tokio::test]
async fn test_initiate_rejects_invalid_phone_before_any_write() {
    let store = InMemoryContributionStore::new();
    let engine = reconciler(store.clone(), InMemoryGateway::default());

    let result = engine
        .initiate(InitiateRequest {
            phone: "12345".to_string(),
            ..jane()
        })
        .await;

    assert!(matches!(result, Err(EngineError::Invalid(_))));
    assert_eq!(store.count().await, 0);
}

#[tokio::test]
async fn test_initiate_rejects_amount_above_max() {
    let store = InMemoryContributionStore::new();
    let engine = reconciler(store.clone(), InMemoryGateway::default());

    let result = engine
        .initiate(InitiateRequest {
            amount_kes: 1_500_000.0,
            ..jane()
        })
        .await;

    assert!(matches!(result, Err(EngineError::Invalid(_))));
    assert_eq!(store.count().await, 0);
}

#[tokio::test]
async fn test_initiate_rejects_missing_name_and_email() {
    let engine = reconciler(InMemoryContributionStore::new(), InMemoryGateway::default());

    for request in [
        InitiateRequest {
            full_name: "  ".to_string(),
            ..jane()
        },
        InitiateRequest {
            email: String::new(),
            ..jane()
        },
    ] {
        assert!(matches!(
            engine.initiate(request).await,
            Err(EngineError::Invalid(_))
        ));
    }
}

#[tokio::test]
async fn test_initiate_rejects_inactive_campaign() {
    let store = InMemoryContributionStore::new();
    let mut inactive = settings();
    inactive.is_active = false;
    let engine = Reconciler::new(
        store.clone(),
        InMemoryGateway::default(),
        inactive,
        Duration::from_secs(5),
    );

    assert!(matches!(
        engine.initiate(jane()).await,
        Err(EngineError::Invalid(_))
    ));
    assert_eq!(store.count().await, 0);
}

#[tokio::test]
async fn test_rejected_push_marks_record_failed_for_audit() {
    let store = InMemoryContributionStore::new();
    let gateway = InMemoryGateway::default();
    gateway.set_reject_push("1", "Unable to process request");
    let engine = reconciler(store.clone(), gateway);

    let result = engine.initiate(jane()).await;
    assert!(matches!(
        result,
        Err(EngineError::Gateway(GatewayError::Rejected { .. }))
    ));

    // The pending record still exists, terminally failed, with no
    // correlation ID.
    assert_eq!(store.count().await, 1);
    let record = store.list_verified(10).await.unwrap();
    assert!(record.is_empty());
}

#[tokio::test]
async fn test_network_failure_marks_record_failed() {
    let store = InMemoryContributionStore::new();
    let gateway = InMemoryGateway::default();
    gateway.set_network_failure();
    let engine = reconciler(store.clone(), gateway);

    let result = engine.initiate(jane()).await;
    assert!(matches!(
        result,
        Err(EngineError::Gateway(GatewayError::Network(_)))
    ));
    assert_eq!(store.count().await, 1);
}

#[tokio::test]
async fn test_successful_callback_completes_and_verifies() {
    let store = InMemoryContributionStore::new();
    let engine = reconciler(store.clone(), InMemoryGateway::default());
    let correlation_id = initiated(&engine).await;

    let ack = engine
        .apply_callback(&correlation_id, RESULT_SUCCESS, "Success", success_confirmation())
        .await
        .unwrap();
    assert_eq!(
        ack,
        ReconcileAck::Applied {
            status: ContributionStatus::Completed
        }
    );

    let record = store
        .find_by_correlation_id(&correlation_id)
        .await
        .unwrap()
        .unwrap();
    assert!(record.is_verified);
    assert_eq!(record.status, ContributionStatus::Completed);
    assert_eq!(record.receipt.as_deref(), Some("QAX123"));
}

#[tokio::test]
async fn test_redelivered_callback_is_idempotent() {
    let store = InMemoryContributionStore::new();
    let engine = reconciler(store.clone(), InMemoryGateway::default());
    let correlation_id = initiated(&engine).await;

    engine
        .apply_callback(&correlation_id, RESULT_SUCCESS, "Success", success_confirmation())
        .await
        .unwrap();
    let frozen = store
        .find_by_correlation_id(&correlation_id)
        .await
        .unwrap()
        .unwrap();

    let ack = engine
        .apply_callback(&correlation_id, RESULT_SUCCESS, "Success", success_confirmation())
        .await
        .unwrap();
    assert!(ack.is_already_processed());

    let after = store
        .find_by_correlation_id(&correlation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after, frozen);
}

#[tokio::test]
async fn test_cancel_callback_marks_cancelled_without_verifying() {
    let store = InMemoryContributionStore::new();
    let engine = reconciler(store.clone(), InMemoryGateway::default());
    let correlation_id = initiated(&engine).await;

    let ack = engine
        .apply_callback(
            &correlation_id,
            RESULT_CANCELLED_BY_USER,
            "Request cancelled by user",
            PaymentConfirmation::default(),
        )
        .await
        .unwrap();
    assert_eq!(
        ack,
        ReconcileAck::Applied {
            status: ContributionStatus::Cancelled
        }
    );

    let record = store
        .find_by_correlation_id(&correlation_id)
        .await
        .unwrap()
        .unwrap();
    assert!(!record.is_verified);
}

#[tokio::test]
async fn test_callback_for_unknown_correlation_id_is_not_found() {
    let engine = reconciler(InMemoryContributionStore::new(), InMemoryGateway::default());

    let result = engine
        .apply_callback(
            &CorrelationId::new("ws_unknown"),
            RESULT_SUCCESS,
            "Success",
            PaymentConfirmation::default(),
        )
        .await;

    assert!(matches!(result, Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn test_concurrent_success_callbacks_apply_exactly_once() {
    let store = InMemoryContributionStore::new();
    let engine = reconciler(store.clone(), InMemoryGateway::default());
    let correlation_id = initiated(&engine).await;
    let before = store
        .find_by_correlation_id(&correlation_id)
        .await
        .unwrap()
        .unwrap();

    let (a, b) = tokio::join!(
        engine.apply_callback(&correlation_id, RESULT_SUCCESS, "Success", success_confirmation()),
        engine.apply_callback(&correlation_id, RESULT_SUCCESS, "Success", success_confirmation()),
    );
    let (a, b) = (a.unwrap(), b.unwrap());

    // Exactly one of the two applied; the other hit the guard.
    let applied = [&a, &b]
        .iter()
        .filter(|ack| matches!(ack, ReconcileAck::Applied { .. }))
        .count();
    assert_eq!(applied, 1, "acks were {a:?} and {b:?}");

    let record = store
        .find_by_correlation_id(&correlation_id)
        .await
        .unwrap()
        .unwrap();
    assert!(record.is_verified);
    assert_eq!(record.receipt.as_deref(), Some("QAX123"));
    // One version bump for the settlement, no double write.
    assert_eq!(record.version, before.version.next());
}

#[tokio::test]
async fn test_poll_pending_leaves_record_untouched() {
    let store = InMemoryContributionStore::new();
    let engine = reconciler(store.clone(), InMemoryGateway::default());
    let correlation_id = initiated(&engine).await;
    let before = store
        .find_by_correlation_id(&correlation_id)
        .await
        .unwrap()
        .unwrap();

    let snapshot = engine.poll(&correlation_id).await.unwrap();
    assert_eq!(snapshot.result_code, RESULT_PENDING);
    assert_eq!(snapshot.status, ContributionStatus::Pending);
    assert!(snapshot.receipt.is_none());

    let after = store
        .find_by_correlation_id(&correlation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_poll_resolved_success_completes_and_verifies() {
    let store = InMemoryContributionStore::new();
    let gateway = InMemoryGateway::default();
    let engine = reconciler(store.clone(), gateway.clone());
    let correlation_id = initiated(&engine).await;

    gateway.set_status(
        correlation_id.as_str(),
        StatusResponse::Resolved {
            result_code: 0,
            result_desc: "The service request is processed successfully.".to_string(),
            receipt: Some("QAX123".to_string()),
        },
    );

    let snapshot = engine.poll(&correlation_id).await.unwrap();
    assert_eq!(snapshot.result_code, 0);
    assert_eq!(snapshot.status, ContributionStatus::Completed);
    assert_eq!(snapshot.receipt.as_deref(), Some("QAX123"));

    let record = store
        .find_by_correlation_id(&correlation_id)
        .await
        .unwrap()
        .unwrap();
    assert!(record.is_verified);
}

#[tokio::test]
async fn test_late_successful_poll_overrides_failed_classification() {
    let store = InMemoryContributionStore::new();
    let gateway = InMemoryGateway::default();
    let engine = reconciler(store.clone(), gateway.clone());
    let correlation_id = initiated(&engine).await;

    // A premature failure lands first.
    engine
        .apply_callback(
            &correlation_id,
            1037,
            "DS timeout user cannot be reached",
            PaymentConfirmation::default(),
        )
        .await
        .unwrap();

    gateway.set_status(
        correlation_id.as_str(),
        StatusResponse::Resolved {
            result_code: 0,
            result_desc: "Success".to_string(),
            receipt: Some("QAX777".to_string()),
        },
    );

    let snapshot = engine.poll(&correlation_id).await.unwrap();
    assert_eq!(snapshot.status, ContributionStatus::Completed);

    let record = store
        .find_by_correlation_id(&correlation_id)
        .await
        .unwrap()
        .unwrap();
    assert!(record.is_verified);
    assert_eq!(record.receipt.as_deref(), Some("QAX777"));
}

#[tokio::test]
async fn test_poll_after_verification_is_a_no_op() {
    let store = InMemoryContributionStore::new();
    let gateway = InMemoryGateway::default();
    let engine = reconciler(store.clone(), gateway.clone());
    let correlation_id = initiated(&engine).await;

    engine
        .apply_callback(&correlation_id, RESULT_SUCCESS, "Success", success_confirmation())
        .await
        .unwrap();
    let frozen = store
        .find_by_correlation_id(&correlation_id)
        .await
        .unwrap()
        .unwrap();

    // A later poll reporting cancellation must not regress the record.
    gateway.set_status(
        correlation_id.as_str(),
        StatusResponse::Resolved {
            result_code: 1032,
            result_desc: "Request cancelled by user".to_string(),
            receipt: None,
        },
    );

    let snapshot = engine.poll(&correlation_id).await.unwrap();
    assert_eq!(snapshot.status, ContributionStatus::Completed);
    assert_eq!(snapshot.receipt.as_deref(), Some("QAX123"));

    let after = store
        .find_by_correlation_id(&correlation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after, frozen);
}

#[tokio::test]
async fn test_poll_unknown_correlation_id_is_not_found() {
    let engine = reconciler(InMemoryContributionStore::new(), InMemoryGateway::default());

    let result = engine.poll(&CorrelationId::new("ws_unknown")).await;
    assert!(matches!(result, Err(EngineError::NotFound(_))));
}

#[tokio::test]
async fn test_poll_unrecognized_response_leaves_record_unmodified() {
    let store = InMemoryContributionStore::new();
    let gateway = InMemoryGateway::default();
    let engine = reconciler(store.clone(), gateway.clone());
    let correlation_id = initiated(&engine).await;
    let before = store
        .find_by_correlation_id(&correlation_id)
        .await
        .unwrap()
        .unwrap();

    gateway.set_status(
        correlation_id.as_str(),
        StatusResponse::Unrecognized(serde_json::json!({ "errorCode": "404.001.03" })),
    );

    let result = engine.poll(&correlation_id).await;
    assert!(matches!(result, Err(EngineError::UnknownResponse { .. })));

    let after = store
        .find_by_correlation_id(&correlation_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after, before);
}

#[tokio::test]
async fn test_local_status_reads_without_gateway() {
    let store = InMemoryContributionStore::new();
    let gateway = InMemoryGateway::default();
    let engine = reconciler(store.clone(), gateway.clone());
    let correlation_id = initiated(&engine).await;

    // Scripted to fail so any gateway call would error out.
    gateway.set_network_failure();

    let view = engine.local_status(&correlation_id).await.unwrap();
    assert_eq!(view.status, ContributionStatus::Pending);
    assert!(!view.is_verified);
    assert_eq!(view.amount_kes, 500.0);

    assert!(matches!(
        engine.local_status(&CorrelationId::new("ws_unknown")).await,
        Err(EngineError::NotFound(_))
    ));
}
