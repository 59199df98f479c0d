use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A delivery channel, its owning team and transport label (e.g. `FCM`, `WNS`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub id: String,
    #[serde(alias = "ownerTeam")]
    pub owner_team: String,
    #[serde(alias = "platformType")]
    pub platform_type: String,
}

impl Domain {
    pub fn new(
        id: impl Into<String>,
        owner_team: impl Into<String>,
        platform_type: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            owner_team: owner_team.into(),
            platform_type: platform_type.into(),
        }
    }
}

/// Binds a logical channel name to a domain and the schema its messages must satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    #[serde(alias = "domainId", alias = "domain")]
    pub domain_id: String,
    #[serde(alias = "schemaId", alias = "schema")]
    pub schema_id: String,
}

impl Route {
    pub fn new(
        id: impl Into<String>,
        domain_id: impl Into<String>,
        schema_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            domain_id: domain_id.into(),
            schema_id: schema_id.into(),
        }
    }
}

/// A business action restricted to an explicit set of routes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, alias = "allowedRouteIds", alias = "routes")]
    allowed_route_ids: BTreeSet<String>,
}

impl Capability {
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            allowed_route_ids: BTreeSet::new(),
        }
    }

    /// Authorize a route. Adding the same route twice is a no-op.
    pub fn add_route(&mut self, route_id: impl Into<String>) {
        self.allowed_route_ids.insert(route_id.into());
    }

    /// Builder-style [`Capability::add_route`].
    pub fn with_route(mut self, route_id: impl Into<String>) -> Self {
        self.add_route(route_id);
        self
    }

    pub fn supports_route(&self, route_id: &str) -> bool {
        self.allowed_route_ids.contains(route_id)
    }

    /// Authorized route ids, sorted.
    pub fn routes(&self) -> impl Iterator<Item = &str> {
        self.allowed_route_ids.iter().map(String::as_str)
    }
}
