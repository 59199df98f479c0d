use std::sync::Arc;

use notiroute_registry::Capability;
use notiroute_schema::PayloadValidator;

use crate::catalog::{Catalog, SharedCatalog};
use crate::delivery::{render, DeliveryChannel, LogDelivery};
use crate::report::{
    DispatchReport, PayloadFailure, PayloadOutcome, PayloadReport, PayloadStage, RequestFailure,
};
use crate::request::{NotificationPayload, NotificationRequest};

/// Runs notification requests through capability, route and schema gates.
///
/// Each `send` reads one catalog snapshot from start to finish and builds its own
/// report, so a `Dispatcher` can be cloned into worker threads freely.
#[derive(Clone)]
pub struct Dispatcher {
    catalog: SharedCatalog,
    delivery: Arc<dyn DeliveryChannel>,
}

impl Dispatcher {
    /// Dispatcher over a fixed catalog, delivering through [`LogDelivery`].
    pub fn new(catalog: Catalog) -> Self {
        Self::from_shared(SharedCatalog::new(catalog))
    }

    /// Dispatcher over a catalog that may be republished while running.
    pub fn from_shared(catalog: SharedCatalog) -> Self {
        Self {
            catalog,
            delivery: Arc::new(LogDelivery),
        }
    }

    pub fn with_delivery(mut self, delivery: Arc<dyn DeliveryChannel>) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn catalog(&self) -> &SharedCatalog {
        &self.catalog
    }

    /// Dispatch every payload of `request`.
    ///
    /// Only an unknown capability rejects the whole request. Every other failure is
    /// recorded against its payload and the remaining payloads still run.
    pub fn send(&self, request: &NotificationRequest) -> DispatchReport {
        let span = tracing::info_span!(
            "send",
            capability_id = %request.capability_id,
            payloads = request.payloads.len()
        );
        let _entered = span.enter();

        let catalog = self.catalog.snapshot();

        let Some(capability) = catalog.registry().capability(&request.capability_id) else {
            tracing::warn!(
                capability_id = %request.capability_id,
                "rejecting request for unknown capability"
            );
            return DispatchReport::rejected(
                &request.capability_id,
                &request.recipients,
                RequestFailure::UnknownCapability {
                    capability_id: request.capability_id.clone(),
                },
            );
        };

        let payloads = request
            .payloads
            .iter()
            .enumerate()
            .map(|(index, payload)| {
                let report = self.dispatch_payload(&catalog, capability, request, index, payload);
                match &report.outcome {
                    PayloadOutcome::Delivered { domain_id, .. } => tracing::info!(
                        index,
                        route_id = %report.route_id,
                        domain_id = %domain_id,
                        "payload delivered"
                    ),
                    PayloadOutcome::Failed { failure } => tracing::warn!(
                        index,
                        route_id = %report.route_id,
                        stage = ?report.stage,
                        %failure,
                        "payload failed"
                    ),
                }
                report
            })
            .collect();

        let report = DispatchReport {
            capability_id: request.capability_id.clone(),
            recipients: request.recipients.clone(),
            rejection: None,
            payloads,
        };
        tracing::info!(
            delivered = report.delivered_count(),
            failed = report.failed_count(),
            "dispatch complete"
        );
        report
    }

    fn dispatch_payload(
        &self,
        catalog: &Catalog,
        capability: &Capability,
        request: &NotificationRequest,
        index: usize,
        payload: &NotificationPayload,
    ) -> PayloadReport {
        let mut tracker = StageTracker::new(index, &payload.route_id);

        let Some(route) = catalog.registry().route(&payload.route_id) else {
            return tracker.fail(PayloadFailure::UnknownRoute {
                route_id: payload.route_id.clone(),
            });
        };
        tracker.advance(PayloadStage::RouteResolved);

        if !capability.supports_route(&payload.route_id) {
            return tracker.fail(PayloadFailure::RouteNotAuthorized {
                route_id: payload.route_id.clone(),
                capability_id: capability.id.clone(),
            });
        }
        tracker.advance(PayloadStage::Authorized);

        if !catalog.schemas().contains(&route.schema_id) {
            return tracker.fail(PayloadFailure::SchemaNotFound {
                schema_id: route.schema_id.clone(),
            });
        }
        tracker.advance(PayloadStage::SchemaResolved);

        let result = catalog.schemas().validate(&route.schema_id, &payload.message);
        if !result.is_valid() {
            return tracker.fail(PayloadFailure::ValidationViolation {
                schema_id: route.schema_id.clone(),
                errors: result.errors,
            });
        }
        tracker.advance(PayloadStage::Validated);

        let Some(domain) = catalog.registry().domain(&route.domain_id) else {
            return tracker.fail(PayloadFailure::UnknownDomain {
                domain_id: route.domain_id.clone(),
            });
        };

        let rendered = render(&route.id, &request.recipients, &payload.message);
        tracing::debug!(channel = self.delivery.name(), domain_id = %domain.id, "handing off payload");
        self.delivery.deliver(domain, &rendered);
        tracker.advance(PayloadStage::Delivered);

        tracker.finish(PayloadOutcome::Delivered {
            domain_id: domain.id.clone(),
            platform_type: domain.platform_type.clone(),
        })
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("catalog", &self.catalog)
            .field("delivery", &self.delivery.name())
            .finish()
    }
}

/// Per-payload state machine. Stages only move forward.
struct StageTracker {
    index: usize,
    route_id: String,
    stage: PayloadStage,
}

impl StageTracker {
    fn new(index: usize, route_id: &str) -> Self {
        Self {
            index,
            route_id: route_id.to_string(),
            stage: PayloadStage::Pending,
        }
    }

    fn advance(&mut self, next: PayloadStage) {
        debug_assert!(next > self.stage, "stage moved from {:?} to {next:?}", self.stage);
        self.stage = next;
    }

    fn fail(self, failure: PayloadFailure) -> PayloadReport {
        self.finish(PayloadOutcome::Failed { failure })
    }

    fn finish(self, outcome: PayloadOutcome) -> PayloadReport {
        PayloadReport {
            index: self.index,
            route_id: self.route_id,
            stage: self.stage,
            outcome,
        }
    }
}
