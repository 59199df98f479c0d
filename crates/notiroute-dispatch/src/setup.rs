use std::path::{Path, PathBuf};

use notiroute_registry::{Capability, Domain, Registry, Route};
use notiroute_schema::{SchemaStore, StoreConfig};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{DispatchError, Result};
use crate::ingest::IngestConfig;

/// Declarative registration document.
///
/// ```json
/// {
///   "schema_dir": "schemas",
///   "schemas": [{ "id": "mobile.push.v1", "schema": { "required": ["title"] } }],
///   "domains": [{ "id": "mobile.push.jpmc", "owner_team": "Mobile", "platform_type": "FCM" }],
///   "routes": [{ "id": "mobile.myworkspace", "domain_id": "mobile.push.jpmc", "schema_id": "mobile.push.v1" }],
///   "capabilities": [{ "id": "book_a_seat", "allowed_route_ids": ["mobile.myworkspace"] }]
/// }
/// ```
///
/// References between entries are not checked here; use [`Catalog::audit`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Setup {
    /// Directory of `<id>.schema.json` files, relative to the setup file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_dir: Option<PathBuf>,
    #[serde(default)]
    pub schemas: Vec<SchemaEntry>,
    #[serde(default)]
    pub domains: Vec<Domain>,
    #[serde(default)]
    pub routes: Vec<Route>,
    #[serde(default)]
    pub capabilities: Vec<Capability>,
    #[serde(default)]
    pub ingest: IngestConfig,
}

/// Inline schema: a JSON object, or schema text as a string.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaEntry {
    pub id: String,
    pub schema: serde_json::Value,
}

impl Setup {
    /// Read a setup file. A relative `schema_dir` is resolved against the file's directory.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|source| DispatchError::SetupRead {
            path: path.to_path_buf(),
            source,
        })?;
        let mut setup = Self::from_json(&text)?;
        if let Some(dir) = setup.schema_dir.take() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            setup.schema_dir = Some(if dir.is_relative() { base.join(dir) } else { dir });
        }
        Ok(setup)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(DispatchError::InvalidSetup)
    }

    /// Compile schemas and register every entity.
    ///
    /// Directory schemas load first, so an inline schema with the same id wins.
    /// Any schema error aborts the build.
    pub fn build(&self, config: StoreConfig) -> Result<Catalog> {
        let mut schemas = SchemaStore::with_config(config);
        if let Some(dir) = &self.schema_dir {
            let loaded = schemas.load_directory(dir)?;
            tracing::debug!(dir = %dir.display(), loaded, "loaded schema directory");
        }
        for entry in &self.schemas {
            match &entry.schema {
                serde_json::Value::String(text) => schemas.compile(entry.id.as_str(), text)?,
                other => schemas.compile_value(entry.id.as_str(), other)?,
            }
        }

        let mut registry = Registry::new();
        for domain in &self.domains {
            registry.register_domain(domain.clone());
        }
        for route in &self.routes {
            registry.register_route(route.clone());
        }
        for capability in &self.capabilities {
            registry.register_capability(capability.clone());
        }

        tracing::info!(
            schemas = schemas.len(),
            domains = self.domains.len(),
            routes = self.routes.len(),
            capabilities = self.capabilities.len(),
            "setup applied"
        );
        Ok(Catalog::new(registry, schemas))
    }
}

#[cfg(test)]
mod tests {
    use notiroute_schema::SchemaError;

    use super::*;
    use crate::testing::{DESKTOP_SCHEMA, MOBILE_SCHEMA};

    fn make_temp_dir(label: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "notiroute-setup-{label}-{}",
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn builds_catalog_from_inline_document() {
        let text = format!(
            r#"{{
                "schemas": [
                    {{ "id": "mobile.push.v1", "schema": {MOBILE_SCHEMA} }},
                    {{ "id": "desktop.rich.v1", "schema": {desktop} }}
                ],
                "domains": [{{ "id": "mobile.push.jpmc", "ownerTeam": "Mobile Platform Team", "platformType": "FCM" }}],
                "routes": [{{ "id": "mobile.myworkspace", "domainId": "mobile.push.jpmc", "schemaId": "mobile.push.v1" }}],
                "capabilities": [{{ "id": "book_a_seat", "allowedRouteIds": ["mobile.myworkspace"] }}]
            }}"#,
            desktop = serde_json::to_string(DESKTOP_SCHEMA).unwrap(),
        );

        let catalog = Setup::from_json(&text).unwrap().build(StoreConfig::default()).unwrap();

        assert_eq!(catalog.schemas().ids(), vec!["desktop.rich.v1", "mobile.push.v1"]);
        assert_eq!(
            catalog.registry().domain("mobile.push.jpmc").map(|d| d.platform_type.as_str()),
            Some("FCM")
        );
        assert!(catalog
            .registry()
            .capability("book_a_seat")
            .is_some_and(|c| c.supports_route("mobile.myworkspace")));
        assert!(catalog.audit().is_empty());
    }

    #[test]
    fn bad_schema_aborts_build() {
        let setup = Setup::from_json(r#"{"schemas":[{"id":"broken","schema":"{ nope"}]}"#).unwrap();
        assert!(matches!(
            setup.build(StoreConfig::default()),
            Err(DispatchError::Schema(SchemaError::Parse(_)))
        ));

        let setup = Setup::from_json(r#"{"schemas":[{"id":"list","schema":[1]}]}"#).unwrap();
        assert!(matches!(
            setup.build(StoreConfig::default()),
            Err(DispatchError::Schema(SchemaError::NotAnObject { .. }))
        ));
    }

    #[test]
    fn malformed_document_is_invalid_setup() {
        assert!(matches!(
            Setup::from_json(r#"{"domains": {}}"#),
            Err(DispatchError::InvalidSetup(_))
        ));
    }

    #[test]
    fn schema_dir_resolves_relative_to_setup_file() {
        let dir = make_temp_dir("relative");
        std::fs::create_dir_all(dir.join("schemas")).unwrap();
        std::fs::write(dir.join("schemas/mobile.push.v1.schema.json"), MOBILE_SCHEMA).unwrap();
        std::fs::write(
            dir.join("setup.json"),
            r#"{
                "schema_dir": "schemas",
                "schemas": [{ "id": "mobile.push.v1", "schema": { "required": ["title"] } }],
                "ingest": { "max_receive_count": 2 }
            }"#,
        )
        .unwrap();

        let setup = Setup::from_file(&dir.join("setup.json")).unwrap();
        assert_eq!(setup.schema_dir.as_deref(), Some(dir.join("schemas").as_path()));
        assert_eq!(setup.ingest.max_receive_count, 2);
        assert!(!setup.ingest.acknowledge_rejected);

        let catalog = setup.build(StoreConfig::default()).unwrap();
        let spec = catalog.schemas().get("mobile.push.v1").unwrap();
        assert!(spec.properties.is_empty(), "inline schema should replace the file");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_setup_file_reports_path() {
        let path = std::env::temp_dir().join(format!("notiroute-no-setup-{}.json", std::process::id()));
        match Setup::from_file(&path) {
            Err(DispatchError::SetupRead { path: reported, .. }) => assert_eq!(reported, path),
            other => panic!("expected SetupRead, got {other:?}"),
        }
    }
}
