//! The payment reconciliation engine.
//!
//! Three independent channels race to resolve a contribution: the
//! synchronous initiation response, the provider's webhook callback,
//! and client-driven status polls. The reconciler funnels all three
//! through the same settlement path so a record advances to its
//! terminal state exactly once.

use std::time::{Duration, Instant};

use common::{ContributionId, CorrelationId};
use domain::{
    Amount, CampaignSettings, Contribution, ContributionError, ContributionStatus,
    ContributionUpdate, PaymentConfirmation, PaymentOutcome, PhoneNumber, Settlement,
};
use gateway::{GatewayClient, GatewayError, StatusResponse};
use store::{ContributionStore, StoreError};

use crate::error::{EngineError, Result};
use crate::snapshot::{ContributionView, StatusSnapshot};

/// Upper bound on settle retries after version conflicts. Each retry
/// re-reads the record and re-runs the idempotency check, so a handful
/// is plenty even under a callback/poll race.
const MAX_SETTLE_ATTEMPTS: usize = 3;

/// A request to start a new contribution payment.
#[derive(Debug, Clone)]
pub struct InitiateRequest {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub amount_kes: f64,
}

/// What the caller gets back from a successful initiation.
#[derive(Debug, Clone)]
pub struct InitiateReceipt {
    pub contribution_id: ContributionId,
    pub correlation_id: CorrelationId,
    pub customer_message: Option<String>,
}

/// Acknowledgment of a callback or poll result.
#[derive(Debug, Clone, PartialEq)]
pub enum ReconcileAck {
    /// The result advanced the record to `status`.
    Applied { status: ContributionStatus },

    /// The record was already verified; nothing changed.
    AlreadyProcessed { status: ContributionStatus },

    /// The transition was not permitted from the current status; the
    /// signal was acknowledged without changing the record.
    Skipped { status: ContributionStatus },
}

impl ReconcileAck {
    /// The record's status after the acknowledgment.
    pub fn status(&self) -> ContributionStatus {
        match self {
            ReconcileAck::Applied { status }
            | ReconcileAck::AlreadyProcessed { status }
            | ReconcileAck::Skipped { status } => *status,
        }
    }

    /// True if the record was already verified before this call.
    pub fn is_already_processed(&self) -> bool {
        matches!(self, ReconcileAck::AlreadyProcessed { .. })
    }
}

/// The reconciliation engine.
///
/// Purely reactive: every operation is caller-driven, holds no
/// resources across calls, and bounds its gateway calls with a
/// timeout. Concurrent settlements of the same record are serialized
/// by version-conditioned store updates with a bounded retry loop.
pub struct Reconciler<S, G>
where
    S: ContributionStore,
    G: GatewayClient,
{
    store: S,
    gateway: G,
    settings: CampaignSettings,
    gateway_timeout: Duration,
}

impl<S, G> Reconciler<S, G>
where
    S: ContributionStore,
    G: GatewayClient,
{
    /// Creates a new reconciler.
    pub fn new(store: S, gateway: G, settings: CampaignSettings, gateway_timeout: Duration) -> Self {
        Self {
            store,
            gateway,
            settings,
            gateway_timeout,
        }
    }

    /// The campaign settings this engine validates against.
    pub fn settings(&self) -> &CampaignSettings {
        &self.settings
    }

    /// Validates the request, creates a pending record, and pushes the
    /// payment to the payer's device.
    ///
    /// This is the only writer of `correlation_id`. On any gateway
    /// failure the pending record is kept for audit and marked failed
    /// before the error surfaces.
    #[tracing::instrument(skip(self, request), fields(phone = %request.phone, amount = request.amount_kes))]
    pub async fn initiate(&self, request: InitiateRequest) -> Result<InitiateReceipt> {
        self.settings.ensure_active()?;
        let full_name = non_empty(&request.full_name, "full_name")?;
        let email = non_empty(&request.email, "email")?;
        let phone = PhoneNumber::parse(&request.phone)?;
        let amount = Amount::from_kes_f64(request.amount_kes);
        self.settings.validate_amount(amount)?;

        let contribution =
            Contribution::pending(full_name, phone.clone(), Some(email.to_string()), amount);
        self.store.insert(&contribution).await?;
        metrics::counter!("contribution_initiations_total").increment(1);

        let push_started = Instant::now();
        let push = tokio::time::timeout(
            self.gateway_timeout,
            self.gateway
                .initiate_payment(&phone, amount, &self.settings.account_reference),
        )
        .await;
        metrics::histogram!("gateway_push_duration_seconds")
            .record(push_started.elapsed().as_secs_f64());

        let response = match push {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                self.mark_initiation_failed(&contribution).await;
                return Err(e.into());
            }
            Err(_) => {
                self.mark_initiation_failed(&contribution).await;
                return Err(GatewayError::Timeout.into());
            }
        };

        let correlation_id = match response.checkout_request_id {
            Some(id) if response.is_accepted() => CorrelationId::new(id),
            _ => {
                self.mark_initiation_failed(&contribution).await;
                return Err(GatewayError::Rejected {
                    code: response.response_code,
                    description: response.response_description,
                }
                .into());
            }
        };

        self.store
            .update(
                contribution.id,
                contribution.version,
                &ContributionUpdate::correlation(correlation_id.clone()),
            )
            .await?;

        tracing::info!(
            contribution_id = %contribution.id,
            correlation_id = %correlation_id,
            "payment push accepted"
        );

        Ok(InitiateReceipt {
            contribution_id: contribution.id,
            correlation_id,
            customer_message: response.customer_message,
        })
    }

    /// Applies a provider callback result.
    ///
    /// Safe under redelivery: a verified record acknowledges without
    /// reapplying, and concurrent deliveries are serialized by the
    /// version-conditioned update.
    #[tracing::instrument(skip(self, confirmation), fields(correlation_id = %correlation_id))]
    pub async fn apply_callback(
        &self,
        correlation_id: &CorrelationId,
        result_code: i64,
        result_desc: &str,
        confirmation: PaymentConfirmation,
    ) -> Result<ReconcileAck> {
        let outcome = PaymentOutcome::from_result(result_code, confirmation);
        let (_, ack) = self.settle(correlation_id, &outcome).await?;

        match &ack {
            ReconcileAck::Applied { status } => {
                metrics::counter!("payment_callbacks_applied_total").increment(1);
                tracing::info!(result_code, result_desc, status = %status, "callback applied");
            }
            ReconcileAck::AlreadyProcessed { .. } | ReconcileAck::Skipped { .. } => {
                metrics::counter!("payment_callbacks_skipped_total").increment(1);
                tracing::info!(result_code, result_desc, "callback skipped");
            }
        }
        Ok(ack)
    }

    /// Queries the provider for the current payment result and applies
    /// it under the same settlement rules as callbacks.
    #[tracing::instrument(skip(self), fields(correlation_id = %correlation_id))]
    pub async fn poll(&self, correlation_id: &CorrelationId) -> Result<StatusSnapshot> {
        let record = self
            .store
            .find_by_correlation_id(correlation_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(correlation_id.clone()))?;

        let query_started = Instant::now();
        let status = tokio::time::timeout(
            self.gateway_timeout,
            self.gateway.query_status(correlation_id),
        )
        .await
        .map_err(|_| GatewayError::Timeout)??;
        metrics::histogram!("gateway_query_duration_seconds")
            .record(query_started.elapsed().as_secs_f64());

        match status {
            StatusResponse::NotYetAnswered => {
                metrics::counter!("payment_polls_pending_total").increment(1);
                Ok(StatusSnapshot::pending(record.status))
            }
            StatusResponse::Resolved {
                result_code,
                result_desc,
                receipt,
            } => {
                let outcome = PaymentOutcome::from_result(
                    result_code,
                    PaymentConfirmation {
                        receipt,
                        ..Default::default()
                    },
                );
                let (record, ack) = self.settle(correlation_id, &outcome).await?;
                metrics::counter!("payment_polls_resolved_total").increment(1);
                tracing::info!(result_code, status = %ack.status(), "poll resolved");

                Ok(StatusSnapshot {
                    result_code,
                    result_description: result_desc,
                    status: record.status,
                    receipt: record.receipt,
                })
            }
            StatusResponse::Unrecognized(raw) => {
                metrics::counter!("payment_polls_unrecognized_total").increment(1);
                tracing::error!(raw = %raw, "unrecognized provider status response");
                Err(EngineError::UnknownResponse {
                    correlation_id: correlation_id.clone(),
                })
            }
        }
    }

    /// Returns the stored record's view without touching the gateway.
    pub async fn local_status(&self, correlation_id: &CorrelationId) -> Result<ContributionView> {
        let record = self
            .store
            .find_by_correlation_id(correlation_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(correlation_id.clone()))?;
        Ok(ContributionView::from(&record))
    }

    /// The settlement path shared by callbacks and polls.
    ///
    /// Read, decide, version-conditioned write; on a conflict the
    /// record is re-read and the decision re-run, so a result that
    /// lost the race to a concurrent success lands on the idempotency
    /// guard instead of double-writing.
    async fn settle(
        &self,
        correlation_id: &CorrelationId,
        outcome: &PaymentOutcome,
    ) -> Result<(Contribution, ReconcileAck)> {
        let mut record = self
            .store
            .find_by_correlation_id(correlation_id)
            .await?
            .ok_or_else(|| EngineError::NotFound(correlation_id.clone()))?;

        let mut last_conflict = None;
        for _ in 0..MAX_SETTLE_ATTEMPTS {
            let update = match record.settle(outcome) {
                Settlement::AlreadyProcessed => {
                    let status = record.status;
                    return Ok((record, ReconcileAck::AlreadyProcessed { status }));
                }
                Settlement::Skipped { current } => {
                    return Ok((record, ReconcileAck::Skipped { status: current }));
                }
                Settlement::Apply(update) => update,
            };

            match self.store.update(record.id, record.version, &update).await {
                Ok(updated) => {
                    let status = updated.status;
                    return Ok((updated, ReconcileAck::Applied { status }));
                }
                Err(conflict @ StoreError::VersionConflict { .. }) => {
                    metrics::counter!("reconcile_version_conflicts_total").increment(1);
                    record = self
                        .store
                        .find_by_correlation_id(correlation_id)
                        .await?
                        .ok_or_else(|| EngineError::NotFound(correlation_id.clone()))?;
                    last_conflict = Some(conflict);
                }
                Err(e) => return Err(e.into()),
            }
        }

        // Only reachable when every attempt lost its race.
        Err(EngineError::Store(last_conflict.unwrap_or(
            StoreError::NotFound(record.id),
        )))
    }

    async fn mark_initiation_failed(&self, contribution: &Contribution) {
        metrics::counter!("contribution_initiation_failures_total").increment(1);
        if let Err(e) = self
            .store
            .update(
                contribution.id,
                contribution.version,
                &ContributionUpdate::status(ContributionStatus::Failed),
            )
            .await
        {
            tracing::error!(
                contribution_id = %contribution.id,
                error = %e,
                "could not mark contribution failed after gateway error"
            );
        }
    }
}

fn non_empty<'a>(value: &'a str, field: &'static str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ContributionError::MissingField { field }.into());
    }
    Ok(trimmed)
}
