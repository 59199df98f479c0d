use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{DispatchError, Result};
use crate::request::NotificationRequest;

/// Generic transport envelope. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    /// Business payload, either embedded JSON or a JSON document in a string.
    #[serde(default)]
    pub content: Option<serde_json::Value>,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Dispatch hint taken from the envelope `type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeKind {
    Notification,
    Order,
    Other(String),
}

impl EnvelopeKind {
    pub fn parse(kind: &str) -> Self {
        if kind.eq_ignore_ascii_case("notification") {
            EnvelopeKind::Notification
        } else if kind.eq_ignore_ascii_case("order") {
            EnvelopeKind::Order
        } else {
            EnvelopeKind::Other(kind.to_string())
        }
    }
}

impl fmt::Display for EnvelopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeKind::Notification => f.write_str("NOTIFICATION"),
            EnvelopeKind::Order => f.write_str("ORDER"),
            EnvelopeKind::Other(kind) => f.write_str(kind),
        }
    }
}

impl Envelope {
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(DispatchError::InvalidEnvelope)
    }

    pub fn kind(&self) -> EnvelopeKind {
        EnvelopeKind::parse(&self.kind)
    }

    /// Decode the content as a notification request.
    pub fn notification_request(&self) -> Result<NotificationRequest> {
        match &self.content {
            None | Some(serde_json::Value::Null) => Err(DispatchError::MissingContent {
                envelope_id: self.id.clone(),
            }),
            Some(serde_json::Value::String(text)) => NotificationRequest::from_json(text),
            Some(value) => NotificationRequest::from_value(value.clone()),
        }
    }
}
