//! Capability-scoped notification routing with schema-validated payloads.
//!
//! A capability names a business action and the routes it may use. Each route
//! binds a channel to a delivery domain and a message schema. Requests are
//! dispatched payload by payload, and every payload is validated before it is
//! handed to delivery.
//!
//! # Crate Structure
//!
//! - [`schema`]: Schema compilation, the schema store and payload validation
//! - [`registry`]: Domains, routes and capabilities
//! - [`dispatch`]: Dispatch pipeline, setup loading and queue ingestion

/// Re-export schema types.
pub mod schema {
    pub use notiroute_schema::*;
}

/// Re-export registry types.
pub mod registry {
    pub use notiroute_registry::*;
}

/// Re-export dispatch types.
pub mod dispatch {
    pub use notiroute_dispatch::*;
}
