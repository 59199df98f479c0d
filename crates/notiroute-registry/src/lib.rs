//! Domains, routes and capabilities for notification routing.
//!
//! The registry answers two questions during dispatch: "what is this id?" and
//! "may this capability use this route?". Registration never checks that a route's
//! domain or schema exists; those references are resolved when a payload is sent.

pub mod model;
pub mod registry;

pub use model::{Capability, Domain, Route};
pub use registry::Registry;
