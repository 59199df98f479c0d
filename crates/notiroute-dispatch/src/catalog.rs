use std::fmt;
use std::sync::Arc;

use notiroute_registry::Registry;
use notiroute_schema::SchemaStore;
use parking_lot::RwLock;
use serde::Serialize;

/// Registry and schema store, read together as one snapshot.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    registry: Registry,
    schemas: SchemaStore,
}

impl Catalog {
    pub fn new(registry: Registry, schemas: SchemaStore) -> Self {
        Self { registry, schemas }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn schemas(&self) -> &SchemaStore {
        &self.schemas
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn schemas_mut(&mut self) -> &mut SchemaStore {
        &mut self.schemas
    }

    /// List references that will not resolve at dispatch time.
    ///
    /// Registration accepts dangling ids, so this pass only runs on request.
    pub fn audit(&self) -> Vec<Finding> {
        let mut findings = Vec::new();

        for route in self.registry.routes() {
            if self.registry.domain(&route.domain_id).is_none() {
                findings.push(Finding::RouteDomainMissing {
                    route_id: route.id.clone(),
                    domain_id: route.domain_id.clone(),
                });
            }
            if !self.schemas.contains(&route.schema_id) {
                findings.push(Finding::RouteSchemaMissing {
                    route_id: route.id.clone(),
                    schema_id: route.schema_id.clone(),
                });
            }
        }

        for capability in self.registry.capabilities() {
            for route_id in capability.routes() {
                if self.registry.route(route_id).is_none() {
                    findings.push(Finding::CapabilityRouteMissing {
                        capability_id: capability.id.clone(),
                        route_id: route_id.to_string(),
                    });
                }
            }
        }

        for schema_id in self.schemas.ids() {
            let Some(spec) = self.schemas.get(schema_id) else {
                continue;
            };
            for field in spec.undeclared_required() {
                findings.push(Finding::RequiredNotDeclared {
                    schema_id: schema_id.to_string(),
                    field: field.to_string(),
                });
            }
        }

        findings
    }
}

/// A reference problem reported by [`Catalog::audit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Finding {
    RouteDomainMissing { route_id: String, domain_id: String },
    RouteSchemaMissing { route_id: String, schema_id: String },
    CapabilityRouteMissing { capability_id: String, route_id: String },
    RequiredNotDeclared { schema_id: String, field: String },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::RouteDomainMissing { route_id, domain_id } => {
                write!(f, "route '{route_id}' references unknown domain '{domain_id}'")
            }
            Finding::RouteSchemaMissing { route_id, schema_id } => {
                write!(f, "route '{route_id}' references unknown schema '{schema_id}'")
            }
            Finding::CapabilityRouteMissing {
                capability_id,
                route_id,
            } => write!(
                f,
                "capability '{capability_id}' allows unknown route '{route_id}'"
            ),
            Finding::RequiredNotDeclared { schema_id, field } => write!(
                f,
                "schema '{schema_id}' requires '{field}' but does not declare it"
            ),
        }
    }
}

/// Publishes immutable catalog snapshots to concurrent readers.
///
/// Readers take the current `Arc<Catalog>` under a short read lock and keep it for
/// the whole dispatch; writers build a new catalog and swap it in.
#[derive(Debug, Clone)]
pub struct SharedCatalog {
    current: Arc<RwLock<Arc<Catalog>>>,
}

impl SharedCatalog {
    pub fn new(catalog: Catalog) -> Self {
        Self {
            current: Arc::new(RwLock::new(Arc::new(catalog))),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<Catalog> {
        Arc::clone(&self.current.read())
    }

    /// Replace the current snapshot, returning the previous one.
    pub fn publish(&self, catalog: Catalog) -> Arc<Catalog> {
        let next = Arc::new(catalog);
        tracing::info!(
            routes = next.registry().routes().len(),
            schemas = next.schemas().len(),
            "published catalog snapshot"
        );
        std::mem::replace(&mut *self.current.write(), next)
    }

    /// Apply an edit to a copy of the current catalog and publish it on success.
    ///
    /// Writers are serialized; a failed edit leaves the current snapshot untouched.
    pub fn try_update<E>(&self, edit: impl FnOnce(&mut Catalog) -> Result<(), E>) -> Result<(), E> {
        let mut guard = self.current.write();
        let mut next = Catalog::clone(&guard);
        edit(&mut next)?;
        *guard = Arc::new(next);
        tracing::info!("updated catalog snapshot");
        Ok(())
    }
}

impl From<Catalog> for SharedCatalog {
    fn from(catalog: Catalog) -> Self {
        Self::new(catalog)
    }
}
