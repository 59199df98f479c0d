use serde::Serialize;

/// Whole-request failure. Only an unknown capability aborts a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RequestFailure {
    #[error("unknown capability: {capability_id}")]
    UnknownCapability { capability_id: String },
}

/// Why a single payload was not delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PayloadFailure {
    #[error("unknown route: {route_id}")]
    UnknownRoute { route_id: String },

    #[error("route {route_id} not authorized for capability {capability_id}")]
    RouteNotAuthorized {
        route_id: String,
        capability_id: String,
    },

    #[error("schema not found: {schema_id}")]
    SchemaNotFound { schema_id: String },

    #[error("validation failed against {schema_id}: {}", .errors.join("; "))]
    ValidationViolation {
        schema_id: String,
        errors: Vec<String>,
    },

    #[error("unknown domain: {domain_id}")]
    UnknownDomain { domain_id: String },
}

/// Furthest gate a payload passed. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PayloadStage {
    Pending,
    RouteResolved,
    Authorized,
    SchemaResolved,
    Validated,
    Delivered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PayloadOutcome {
    Delivered {
        domain_id: String,
        platform_type: String,
    },
    Failed {
        failure: PayloadFailure,
    },
}

/// Result for one payload, in request order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadReport {
    pub index: usize,
    pub route_id: String,
    pub stage: PayloadStage,
    pub outcome: PayloadOutcome,
}

impl PayloadReport {
    pub fn is_delivered(&self) -> bool {
        matches!(self.outcome, PayloadOutcome::Delivered { .. })
    }

    pub fn failure(&self) -> Option<&PayloadFailure> {
        match &self.outcome {
            PayloadOutcome::Failed { failure } => Some(failure),
            PayloadOutcome::Delivered { .. } => None,
        }
    }
}

/// Aggregate outcome of one `send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    pub capability_id: String,
    pub recipients: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection: Option<RequestFailure>,
    pub payloads: Vec<PayloadReport>,
}

impl DispatchReport {
    pub(crate) fn rejected(
        capability_id: &str,
        recipients: &[String],
        failure: RequestFailure,
    ) -> Self {
        Self {
            capability_id: capability_id.to_string(),
            recipients: recipients.to_vec(),
            rejection: Some(failure),
            payloads: Vec::new(),
        }
    }

    /// True when the whole request was refused before any payload ran.
    pub fn is_rejected(&self) -> bool {
        self.rejection.is_some()
    }

    pub fn delivered_count(&self) -> usize {
        self.payloads.iter().filter(|p| p.is_delivered()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.payloads.len() - self.delivered_count()
    }

    /// True when the request was accepted and every payload was delivered.
    pub fn all_delivered(&self) -> bool {
        !self.is_rejected() && self.payloads.iter().all(PayloadReport::is_delivered)
    }
}
