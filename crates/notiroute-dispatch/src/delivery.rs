//! Delivery hand-off.
//!
//! The dispatcher hands every validated, authorized payload to a
//! [`DeliveryChannel`] and does not wait for an acknowledgement. Real platform
//! gateways live outside this crate; [`LogDelivery`] simulates delivery through
//! tracing and [`RecordingDelivery`] keeps hand-offs in memory.

use std::fmt;

use notiroute_registry::Domain;
use notiroute_schema::Message;
use parking_lot::Mutex;
use serde::Serialize;

/// Receives validated payloads for transmission.
pub trait DeliveryChannel: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Hand off one payload. Fire-and-forget.
    fn deliver(&self, domain: &Domain, notification: &RenderedNotification);
}

/// A payload rendered for its channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedNotification {
    pub route_id: String,
    pub recipients: Vec<String>,
    /// Display label, e.g. "Mobile Notification".
    pub heading: &'static str,
    /// Labelled lines in display order.
    pub lines: Vec<(String, String)>,
    pub message: Message,
}

impl fmt::Display for RenderedNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.heading)?;
        for (label, text) in &self.lines {
            write!(f, "\n  {label}: {text}")?;
        }
        Ok(())
    }
}

/// Render a message for its route.
///
/// `mobile*` routes show title, body and action; `desktop*` routes show header,
/// title, body and footer. Other routes list every string field in message order.
pub fn render(route_id: &str, recipients: &[String], message: &Message) -> RenderedNotification {
    let (heading, fields): (&'static str, &[(&str, &str, bool)]) = if route_id.starts_with("mobile")
    {
        (
            "Mobile Notification",
            &[
                ("Title", "title", true),
                ("Body", "body", true),
                ("Action", "action_url", false),
            ],
        )
    } else if route_id.starts_with("desktop") {
        (
            "Desktop Notification",
            &[
                ("Header", "header", false),
                ("Title", "title", true),
                ("Body", "body", true),
                ("Footer", "footer", false),
            ],
        )
    } else {
        ("Notification", &[])
    };

    let lines = if fields.is_empty() {
        message
            .iter()
            .filter_map(|(key, value)| value.as_str().map(|text| (key.to_string(), text.to_string())))
            .collect()
    } else {
        fields
            .iter()
            .filter_map(|(label, key, always)| match message.get(key) {
                Some(value) => Some((label.to_string(), value.to_string())),
                None if *always => Some((label.to_string(), String::new())),
                None => None,
            })
            .collect()
    };

    RenderedNotification {
        route_id: route_id.to_string(),
        recipients: recipients.to_vec(),
        heading,
        lines,
        message: message.clone(),
    }
}

/// Simulated delivery that only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogDelivery;

impl DeliveryChannel for LogDelivery {
    fn name(&self) -> &'static str {
        "log"
    }

    fn deliver(&self, domain: &Domain, notification: &RenderedNotification) {
        tracing::info!(
            domain_id = %domain.id,
            platform = %domain.platform_type,
            owner_team = %domain.owner_team,
            route_id = %notification.route_id,
            recipients = notification.recipients.len(),
            "delivering notification"
        );
        tracing::debug!(rendered = %notification, "rendered notification");
    }
}

/// One recorded hand-off.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Handoff {
    pub domain: Domain,
    pub notification: RenderedNotification,
}

/// Keeps every hand-off in memory, in delivery order.
#[derive(Debug, Default)]
pub struct RecordingDelivery {
    handoffs: Mutex<Vec<Handoff>>,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handoffs(&self) -> Vec<Handoff> {
        self.handoffs.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.handoffs.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.handoffs.lock().is_empty()
    }
}

impl DeliveryChannel for RecordingDelivery {
    fn name(&self) -> &'static str {
        "recording"
    }

    fn deliver(&self, domain: &Domain, notification: &RenderedNotification) {
        self.handoffs.lock().push(Handoff {
            domain: domain.clone(),
            notification: notification.clone(),
        });
    }
}
