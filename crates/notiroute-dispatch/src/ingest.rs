//! Queue-facing consumer.
//!
//! The transport delivers a message body with its id and receive count and waits
//! for an acknowledgement. Withholding it lets the transport redeliver after its
//! own visibility window; the consumer never retries on its own.

use serde::{Deserialize, Serialize};

use crate::dispatcher::Dispatcher;
use crate::envelope::{Envelope, EnvelopeKind};
use crate::report::DispatchReport;

/// Acknowledgement policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    /// Acknowledge requests rejected for an unknown capability instead of
    /// leaving them for redelivery.
    pub acknowledge_rejected: bool,
    /// Receive count at which a message is acknowledged no matter what. Zero
    /// disables the cut-off.
    pub max_receive_count: u32,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            acknowledge_rejected: false,
            max_receive_count: 5,
        }
    }
}

/// Transport metadata for one delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryMeta {
    pub message_id: String,
    #[serde(default = "first_receive")]
    pub receive_count: u32,
}

fn first_receive() -> u32 {
    1
}

impl DeliveryMeta {
    pub fn new(message_id: impl Into<String>, receive_count: u32) -> Self {
        Self {
            message_id: message_id.into(),
            receive_count,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckDecision {
    Acknowledge,
    Withhold,
}

/// What the consumer did with one delivery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IngestOutcome {
    pub message_id: String,
    pub decision: AckDecision,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<DispatchReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IngestOutcome {
    pub fn should_acknowledge(&self) -> bool {
        self.decision == AckDecision::Acknowledge
    }
}

/// Decodes envelopes, dispatches notifications and decides acknowledgement.
#[derive(Debug, Clone)]
pub struct Consumer {
    dispatcher: Dispatcher,
    config: IngestConfig,
}

impl Consumer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self::with_config(dispatcher, IngestConfig::default())
    }

    pub fn with_config(dispatcher: Dispatcher, config: IngestConfig) -> Self {
        Self { dispatcher, config }
    }

    pub fn config(&self) -> &IngestConfig {
        &self.config
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Handle one delivery and decide whether it should be acknowledged.
    pub fn handle(&self, body: &str, meta: &DeliveryMeta) -> IngestOutcome {
        let span = tracing::info_span!(
            "ingest",
            message_id = %meta.message_id,
            receive_count = meta.receive_count
        );
        let _entered = span.enter();

        let mut outcome = IngestOutcome {
            message_id: meta.message_id.clone(),
            decision: AckDecision::Withhold,
            kind: None,
            report: None,
            error: None,
        };

        let envelope = match Envelope::from_json(body) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(error = %err, "could not decode envelope");
                outcome.error = Some(err.to_string());
                return self.apply_cutoff(outcome, meta);
            }
        };

        let kind = envelope.kind();
        outcome.kind = Some(kind.to_string());

        match kind {
            EnvelopeKind::Notification => {
                let request = match envelope.notification_request() {
                    Ok(request) => request,
                    Err(err) => {
                        tracing::warn!(error = %err, "could not decode notification request");
                        outcome.error = Some(err.to_string());
                        return self.apply_cutoff(outcome, meta);
                    }
                };

                let report = self.dispatcher.send(&request);
                outcome.decision = if report.is_rejected() && !self.config.acknowledge_rejected {
                    AckDecision::Withhold
                } else {
                    AckDecision::Acknowledge
                };
                if let Some(rejection) = &report.rejection {
                    outcome.error = Some(rejection.to_string());
                }
                outcome.report = Some(report);
            }
            EnvelopeKind::Order => {
                tracing::info!(envelope_id = ?envelope.id, "order received");
                outcome.decision = AckDecision::Acknowledge;
            }
            EnvelopeKind::Other(other) => {
                tracing::warn!(kind = %other, "no handler for message type, acknowledging");
                outcome.error = Some(format!("no handler for message type: {other}"));
                outcome.decision = AckDecision::Acknowledge;
            }
        }

        self.apply_cutoff(outcome, meta)
    }

    fn apply_cutoff(&self, mut outcome: IngestOutcome, meta: &DeliveryMeta) -> IngestOutcome {
        let limit = self.config.max_receive_count;
        if outcome.decision == AckDecision::Withhold && limit > 0 && meta.receive_count >= limit {
            tracing::error!(
                receive_count = meta.receive_count,
                max_receive_count = limit,
                "giving up on message after repeated deliveries"
            );
            outcome.decision = AckDecision::Acknowledge;
        }
        outcome
    }
}
