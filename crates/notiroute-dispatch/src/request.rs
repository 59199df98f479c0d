use notiroute_schema::{Message, Value};
use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};

/// A multi-channel notification for one capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRequest {
    #[serde(alias = "capability", alias = "capabilityId")]
    pub capability_id: String,
    #[serde(default)]
    pub recipients: Vec<String>,
    #[serde(default)]
    pub payloads: Vec<NotificationPayload>,
}

/// One channel-targeted message within a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationPayload {
    #[serde(alias = "route", alias = "routeId")]
    pub route_id: String,
    #[serde(default)]
    pub message: Message,
}

impl NotificationRequest {
    pub fn new(capability_id: impl Into<String>) -> Self {
        Self {
            capability_id: capability_id.into(),
            recipients: Vec::new(),
            payloads: Vec::new(),
        }
    }

    pub fn with_recipient(mut self, recipient: impl Into<String>) -> Self {
        self.recipients.push(recipient.into());
        self
    }

    pub fn with_payload(mut self, route_id: impl Into<String>, message: Message) -> Self {
        self.payloads.push(NotificationPayload::new(route_id, message));
        self
    }

    /// Decode a request from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(DispatchError::InvalidRequest)
    }

    /// Decode a request from an already-parsed JSON document.
    pub fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(DispatchError::InvalidRequest)
    }
}

impl NotificationPayload {
    pub fn new(route_id: impl Into<String>, message: Message) -> Self {
        Self {
            route_id: route_id.into(),
            message,
        }
    }

    /// Convenience accessor for a string field of the message.
    pub fn text(&self, field: &str) -> Option<&str> {
        self.message.get(field).and_then(Value::as_str)
    }
}
