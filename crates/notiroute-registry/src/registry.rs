use std::collections::HashMap;

use crate::model::{Capability, Domain, Route};

/// Id-keyed domains, routes and capabilities.
///
/// Every `register_*` call inserts or replaces. Nothing is removed.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    domains: HashMap<String, Domain>,
    routes: HashMap<String, Route>,
    capabilities: HashMap<String, Capability>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_domain(&mut self, domain: Domain) {
        tracing::debug!(domain_id = %domain.id, platform = %domain.platform_type, "registered domain");
        self.domains.insert(domain.id.clone(), domain);
    }

    pub fn register_route(&mut self, route: Route) {
        tracing::debug!(
            route_id = %route.id,
            domain_id = %route.domain_id,
            schema_id = %route.schema_id,
            "registered route"
        );
        self.routes.insert(route.id.clone(), route);
    }

    pub fn register_capability(&mut self, capability: Capability) {
        tracing::debug!(
            capability_id = %capability.id,
            routes = capability.routes().count(),
            "registered capability"
        );
        self.capabilities.insert(capability.id.clone(), capability);
    }

    pub fn domain(&self, id: &str) -> Option<&Domain> {
        self.domains.get(id)
    }

    pub fn route(&self, id: &str) -> Option<&Route> {
        self.routes.get(id)
    }

    pub fn capability(&self, id: &str) -> Option<&Capability> {
        self.capabilities.get(id)
    }

    /// Domains sorted by id.
    pub fn domains(&self) -> Vec<&Domain> {
        let mut domains: Vec<&Domain> = self.domains.values().collect();
        domains.sort_unstable_by(|a, b| a.id.cmp(&b.id));
        domains
    }

    /// Routes sorted by id.
    pub fn routes(&self) -> Vec<&Route> {
        let mut routes: Vec<&Route> = self.routes.values().collect();
        routes.sort_unstable_by(|a, b| a.id.cmp(&b.id));
        routes
    }

    /// Capabilities sorted by id.
    pub fn capabilities(&self) -> Vec<&Capability> {
        let mut capabilities: Vec<&Capability> = self.capabilities.values().collect();
        capabilities.sort_unstable_by(|a, b| a.id.cmp(&b.id));
        capabilities
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded() -> Registry {
        let mut registry = Registry::new();
        registry.register_domain(Domain::new("mobile.push.jpmc", "Mobile Platform Team", "FCM"));
        registry.register_domain(Domain::new("desktop.rich.jpmc", "Desktop Platform Team", "WNS"));
        registry.register_route(Route::new("mobile.myworkspace", "mobile.push.jpmc", "mobile.push.v1"));
        registry.register_route(Route::new("desktop.myworkspace", "desktop.rich.jpmc", "desktop.rich.v1"));
        registry.register_capability(
            Capability::new("book_a_seat", "Workspace reservation")
                .with_route("mobile.myworkspace")
                .with_route("desktop.myworkspace"),
        );
        registry
    }

    #[test]
    fn lookups_resolve_registered_entities() {
        let registry = seeded();
        assert_eq!(
            registry.domain("mobile.push.jpmc").map(|d| d.platform_type.as_str()),
            Some("FCM")
        );
        assert_eq!(
            registry.route("desktop.myworkspace").map(|r| r.schema_id.as_str()),
            Some("desktop.rich.v1")
        );
        assert!(registry
            .capability("book_a_seat")
            .is_some_and(|c| c.supports_route("mobile.myworkspace")));
    }

    #[test]
    fn unknown_ids_resolve_to_none() {
        let registry = seeded();
        assert!(registry.domain("sms.jpmc").is_none());
        assert!(registry.route("sms.myworkspace").is_none());
        assert!(registry.capability("cancel_seat").is_none());
    }

    #[test]
    fn registration_replaces_existing_entries() {
        let mut registry = seeded();
        registry.register_capability(Capability::new("book_a_seat", "Narrowed"));

        let capability = registry.capability("book_a_seat").unwrap();
        assert_eq!(capability.description, "Narrowed");
        assert!(!capability.supports_route("mobile.myworkspace"));
        assert_eq!(registry.capabilities().len(), 1);
    }

    #[test]
    fn dangling_references_are_accepted_at_registration() {
        let mut registry = Registry::new();
        registry.register_route(Route::new("r", "missing.domain", "missing.schema"));
        registry.register_capability(Capability::new("c", "").with_route("missing.route"));

        assert!(registry.route("r").is_some());
        assert!(registry.capability("c").is_some());
    }

    #[test]
    fn listings_are_sorted() {
        let registry = seeded();
        let ids: Vec<&str> = registry.routes().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["desktop.myworkspace", "mobile.myworkspace"]);
        let ids: Vec<&str> = registry.domains().iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["desktop.rich.jpmc", "mobile.push.jpmc"]);
    }
}
