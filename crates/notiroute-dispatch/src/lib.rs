//! Capability-scoped notification dispatch with per-payload validation.
//!
//! A [`NotificationRequest`] names a capability and carries one payload per
//! channel. The [`Dispatcher`] resolves the capability once, then walks every
//! payload through route lookup, authorization, schema resolution and
//! validation before handing it to a [`DeliveryChannel`]. Payload failures are
//! recorded in the [`DispatchReport`] and never stop sibling payloads.
//!
//! The registry and schema store are read through an immutable [`Catalog`]
//! snapshot. [`SharedCatalog`] publishes replacement snapshots for hot reload.

pub mod catalog;
pub mod delivery;
pub mod dispatcher;
pub mod envelope;
pub mod error;
pub mod ingest;
pub mod report;
pub mod request;
pub mod setup;

#[cfg(test)]
mod testing;

pub use catalog::{Catalog, Finding, SharedCatalog};
pub use delivery::{
    render, DeliveryChannel, Handoff, LogDelivery, RecordingDelivery, RenderedNotification,
};
pub use dispatcher::Dispatcher;
pub use envelope::{Envelope, EnvelopeKind};
pub use error::{DispatchError, Result};
pub use ingest::{AckDecision, Consumer, DeliveryMeta, IngestConfig, IngestOutcome};
pub use report::{
    DispatchReport, PayloadFailure, PayloadOutcome, PayloadReport, PayloadStage, RequestFailure,
};
pub use request::{NotificationPayload, NotificationRequest};
pub use setup::{SchemaEntry, Setup};
