use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use crate::config::StoreConfig;
use crate::error::{Result, SchemaError};
use crate::spec::SchemaSpec;
use crate::validator::{validate_spec, PayloadValidator, ValidationResult};
use crate::value::Message;

const SCHEMA_SUFFIX: &str = ".schema.json";

/// Id-keyed store of compiled schemas.
#[derive(Debug, Clone)]
pub struct SchemaStore {
    schemas: HashMap<String, SchemaSpec>,
    config: StoreConfig,
}

impl SchemaStore {
    /// Create an empty store with default config.
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    /// Create an empty store with explicit config.
    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            schemas: HashMap::new(),
            config,
        }
    }

    /// Compile schema text and store it under `schema_id`, replacing any previous entry.
    pub fn compile(&mut self, schema_id: impl Into<String>, schema_json: &str) -> Result<()> {
        let spec = SchemaSpec::parse(schema_json, &self.config)?;
        self.insert(schema_id.into(), spec);
        Ok(())
    }

    /// Compile an already-parsed schema document.
    pub fn compile_value(
        &mut self,
        schema_id: impl Into<String>,
        schema: &serde_json::Value,
    ) -> Result<()> {
        let spec = SchemaSpec::from_value(schema, &self.config)?;
        self.insert(schema_id.into(), spec);
        Ok(())
    }

    fn insert(&mut self, schema_id: String, spec: SchemaSpec) {
        tracing::debug!(
            schema_id = %schema_id,
            properties = spec.properties.len(),
            required = spec.required.len(),
            additional_properties = spec.additional_properties,
            "compiled schema"
        );
        if self.schemas.insert(schema_id.clone(), spec).is_some() {
            tracing::debug!(schema_id = %schema_id, "replaced existing schema");
        }
    }

    /// Load `<schema_id>.schema.json` files from a directory.
    pub fn from_directory(path: &Path) -> Result<Self> {
        Self::from_directory_with_config(path, StoreConfig::default())
    }

    /// Load schemas from a directory with explicit config.
    pub fn from_directory_with_config(path: &Path, config: StoreConfig) -> Result<Self> {
        let mut store = Self::with_config(config);
        store.load_directory(path)?;
        Ok(store)
    }

    /// Compile every schema file in `path` into this store.
    pub fn load_directory(&mut self, path: &Path) -> Result<usize> {
        let mut loaded_schema_count = 0usize;

        let entries = std::fs::read_dir(path)
            .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;

        for entry in entries {
            let entry = entry.map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            let is_schema_file = file_name.ends_with(SCHEMA_SUFFIX);
            let entry_path = entry.path();
            let path_metadata = std::fs::symlink_metadata(&entry_path)
                .map_err(|err| SchemaError::LoadFailed(err.to_string()))?;
            let file_type = path_metadata.file_type();

            if file_type.is_symlink() {
                if is_schema_file {
                    return Err(SchemaError::LoadFailed(format!(
                        "refusing to load schema symlink: {file_name}"
                    )));
                }
                continue;
            }
            if !file_type.is_file() || !is_schema_file {
                continue;
            }

            let schema_id = match schema_id_from_file_name(&file_name) {
                Some(id) => id.to_string(),
                None => {
                    return Err(SchemaError::LoadFailed(format!(
                        "unrecognized schema filename: {file_name}"
                    )));
                }
            };

            loaded_schema_count = loaded_schema_count.saturating_add(1);
            if loaded_schema_count > self.config.max_schemas_from_directory {
                return Err(SchemaError::LoadFailed(format!(
                    "schema count exceeds configured max ({}): {}",
                    self.config.max_schemas_from_directory, loaded_schema_count
                )));
            }

            let content = read_bounded(&entry_path, &path_metadata, &self.config)?;
            self.compile(schema_id, &content)?;
        }

        tracing::debug!(
            dir = %path.display(),
            count = loaded_schema_count,
            "loaded schema directory"
        );
        Ok(loaded_schema_count)
    }

    /// Load from embedded schema strings.
    pub fn from_embedded(schemas: &[(&str, &str)]) -> Result<Self> {
        let mut store = Self::new();
        for (schema_id, schema) in schemas {
            store.compile(*schema_id, schema)?;
        }
        Ok(store)
    }

    pub fn get(&self, schema_id: &str) -> Option<&SchemaSpec> {
        self.schemas.get(schema_id)
    }

    pub fn contains(&self, schema_id: &str) -> bool {
        self.schemas.contains_key(schema_id)
    }

    /// Registered schema ids, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl Default for SchemaStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PayloadValidator for SchemaStore {
    fn validate(&self, schema_id: &str, message: &Message) -> ValidationResult {
        match self.schemas.get(schema_id) {
            Some(spec) => validate_spec(spec, message),
            None => ValidationResult::schema_not_found(schema_id),
        }
    }
}

fn schema_id_from_file_name(file_name: &str) -> Option<&str> {
    let id = file_name.strip_suffix(SCHEMA_SUFFIX)?;
    if id.is_empty() || id.starts_with('.') {
        return None;
    }
    Some(id)
}

fn read_bounded(
    entry_path: &Path,
    path_metadata: &std::fs::Metadata,
    config: &StoreConfig,
) -> Result<String> {
    let display_name = entry_path.display();
    let file = std::fs::File::open(entry_path).map_err(|err| {
        SchemaError::LoadFailed(format!("failed opening schema {display_name}: {err}"))
    })?;
    let opened_metadata = file
        .metadata()
        .map_err(|err| SchemaError::LoadFailed(err.to_string()))?;

    #[cfg(unix)]
    {
        if !same_file_identity(path_metadata, &opened_metadata) {
            return Err(SchemaError::LoadFailed(format!(
                "schema file changed during load: {display_name}"
            )));
        }
    }
    #[cfg(not(unix))]
    let _ = path_metadata;

    if opened_metadata.len() > config.max_schema_file_size as u64 {
        return Err(SchemaError::LoadFailed(format!(
            "schema file too large ({} bytes): {display_name}",
            opened_metadata.len()
        )));
    }

    let max_bytes = config.max_schema_file_size;
    let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
    let mut content = String::new();
    file.take(read_limit)
        .read_to_string(&mut content)
        .map_err(|err| {
            SchemaError::LoadFailed(format!("failed reading schema {display_name}: {err}"))
        })?;
    if content.len() > max_bytes {
        return Err(SchemaError::LoadFailed(format!(
            "schema file too large while reading: {display_name}"
        )));
    }

    Ok(content)
}

#[cfg(unix)]
fn same_file_identity(
    path_metadata: &std::fs::Metadata,
    opened_metadata: &std::fs::Metadata,
) -> bool {
    use std::os::unix::fs::MetadataExt;
    path_metadata.dev() == opened_metadata.dev() && path_metadata.ino() == opened_metadata.ino()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    const DESKTOP_SCHEMA: &str = r#"{
        "type": "object",
        "properties": {
            "title": { "type": "string", "maxLength": 100 },
            "body": { "type": "string", "maxLength": 300 },
            "icon": { "type": "string", "enum": ["info", "warning", "success", "calendar", "task"] }
        },
        "required": ["title", "body"],
        "additionalProperties": false
    }"#;

    #[test]
    fn compile_and_validate() {
        let mut store = SchemaStore::new();
        store.compile("desktop.rich.v1", DESKTOP_SCHEMA).unwrap();

        let ok = Message::new()
            .with("title", "Workspace Reservation Confirmed")
            .with("body", "Your desk reservation has been confirmed")
            .with("icon", "calendar");
        assert!(store.validate("desktop.rich.v1", &ok).valid);

        let bad = Message::new().with("title", 7).with("body", "b");
        let result = store.validate("desktop.rich.v1", &bad);
        assert_eq!(
            result.errors,
            vec!["Field 'title' has wrong type. Expected: string"]
        );
    }

    #[test]
    fn unknown_schema_fails_closed() {
        let store = SchemaStore::new();
        let result = store.validate("nope", &Message::new());
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["Schema not found: nope"]);
    }

    #[test]
    fn recompiling_replaces_rather_than_merges() {
        let mut store = SchemaStore::new();
        store
            .compile("s", r#"{"properties":{"a":{}},"required":["a"]}"#)
            .unwrap();
        store
            .compile("s", r#"{"properties":{"b":{}},"additionalProperties":false}"#)
            .unwrap();

        let spec = store.get("s").unwrap();
        assert!(spec.required.is_empty());
        assert!(spec.property("a").is_none());
        assert_eq!(store.len(), 1);

        let result = store.validate("s", &Message::new().with("a", 1));
        assert_eq!(result.errors, vec!["Additional property not allowed: a"]);
    }

    #[test]
    fn failed_compile_keeps_previous_entry() {
        let mut store = SchemaStore::new();
        store.compile("s", DESKTOP_SCHEMA).unwrap();
        assert!(matches!(
            store.compile("s", "{ broken"),
            Err(SchemaError::Parse(_))
        ));
        assert!(store.get("s").is_some_and(|spec| spec.properties.len() == 3));
    }

    #[test]
    fn validation_has_no_side_effects() {
        let mut store = SchemaStore::new();
        store.compile("desktop.rich.v1", DESKTOP_SCHEMA).unwrap();
        let before = store.get("desktop.rich.v1").cloned();
        let message = Message::new().with("icon", "bell");
        let first = store.validate("desktop.rich.v1", &message);
        let second = store.validate("desktop.rich.v1", &message);
        assert_eq!(first, second);
        assert_eq!(store.get("desktop.rich.v1").cloned(), before);
    }

    #[test]
    fn from_embedded_loads_schemas() {
        let store = SchemaStore::from_embedded(&[
            ("desktop.rich.v1", DESKTOP_SCHEMA),
            ("mobile.push.v1", r#"{"properties":{"title":{"type":"string"}}}"#),
        ])
        .unwrap();

        assert!(store.contains("desktop.rich.v1"));
        assert!(store.contains("mobile.push.v1"));
        assert_eq!(store.ids(), vec!["desktop.rich.v1", "mobile.push.v1"]);
    }

    #[test]
    fn strict_store_applies_config_to_compiled_schemas() {
        let mut strict = SchemaStore::with_config(StoreConfig {
            strict_mode: true,
            ..StoreConfig::default()
        });
        strict
            .compile("s", r#"{"properties":{"id":{"type":"integer"}}}"#)
            .unwrap();
        let result = strict.validate("s", &Message::new().with("id", 1).with("extra", true));
        assert_eq!(result.errors, vec!["Additional property not allowed: extra"]);
    }

    #[test]
    fn from_directory_loads_and_validates() {
        let dir = make_temp_schema_dir("from-directory");
        write_schema(&dir, "desktop.rich.v1.schema.json", DESKTOP_SCHEMA);
        write_schema(
            &dir,
            "mobile.push.v1.schema.json",
            r#"{"properties":{"title":{"type":"string","maxLength":5}}}"#,
        );

        let store = SchemaStore::from_directory(&dir).unwrap();
        assert_eq!(store.ids(), vec!["desktop.rich.v1", "mobile.push.v1"]);
        assert!(
            !store
                .validate("mobile.push.v1", &Message::new().with("title", "too long"))
                .valid
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn only_schema_files_are_loaded() {
        let dir = make_temp_schema_dir("extensions");
        write_schema(&dir, "desktop.rich.v1.schema.json", DESKTOP_SCHEMA);
        write_schema(&dir, "ignored.json", DESKTOP_SCHEMA);
        write_schema(&dir, "README.md", "not a schema");

        let store = SchemaStore::from_directory(&dir).unwrap();
        assert_eq!(store.ids(), vec!["desktop.rich.v1"]);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn nameless_schema_file_is_rejected() {
        let dir = make_temp_schema_dir("nameless");
        write_schema(&dir, ".schema.json", DESKTOP_SCHEMA);

        let result = SchemaStore::from_directory(&dir);
        assert!(matches!(result, Err(SchemaError::LoadFailed(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_schema_file_fails_load() {
        let dir = make_temp_schema_dir("malformed");
        write_schema(&dir, "broken.schema.json", "{ nope");

        let result = SchemaStore::from_directory(&dir);
        assert!(matches!(result, Err(SchemaError::Parse(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directory_fails_load() {
        let dir = std::env::temp_dir().join(format!(
            "notiroute-schema-missing-{}",
            std::process::id()
        ));
        assert!(matches!(
            SchemaStore::from_directory(&dir),
            Err(SchemaError::LoadFailed(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_schema_is_rejected() {
        let dir = make_temp_schema_dir("symlink-schema");
        let target = dir.join("target.json");
        std::fs::write(&target, DESKTOP_SCHEMA.as_bytes()).unwrap();
        let link = dir.join("desktop.rich.v1.schema.json");
        std::os::unix::fs::symlink(&target, &link).unwrap();

        let result = SchemaStore::from_directory(&dir);
        assert!(matches!(result, Err(SchemaError::LoadFailed(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn schema_count_limit_is_enforced() {
        let dir = make_temp_schema_dir("schema-count-limit");
        write_schema(&dir, "a.schema.json", DESKTOP_SCHEMA);
        write_schema(&dir, "b.schema.json", DESKTOP_SCHEMA);

        let config = StoreConfig {
            max_schemas_from_directory: 1,
            ..StoreConfig::default()
        };
        let result = SchemaStore::from_directory_with_config(&dir, config);
        assert!(matches!(result, Err(SchemaError::LoadFailed(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn schema_file_size_limit_is_enforced() {
        let dir = make_temp_schema_dir("schema-size-limit");
        write_schema(&dir, "a.schema.json", DESKTOP_SCHEMA);

        let config = StoreConfig {
            max_schema_file_size: 8,
            ..StoreConfig::default()
        };
        let result = SchemaStore::from_directory_with_config(&dir, config);
        assert!(matches!(result, Err(SchemaError::LoadFailed(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn schema_ids_come_from_file_names() {
        assert_eq!(
            schema_id_from_file_name("mobile.push.v1.schema.json"),
            Some("mobile.push.v1")
        );
        assert_eq!(schema_id_from_file_name(".schema.json"), None);
        assert_eq!(schema_id_from_file_name(".hidden.schema.json"), None);
        assert_eq!(schema_id_from_file_name("mobile.json"), None);
    }

    #[cfg(unix)]
    #[test]
    fn same_file_identity_distinguishes_replaced_file() {
        let dir = make_temp_schema_dir("identity-check");
        let first = dir.join("first.json");
        let second = dir.join("second.json");
        std::fs::write(&first, DESKTOP_SCHEMA).unwrap();
        std::fs::write(&second, DESKTOP_SCHEMA).unwrap();

        let first_meta = std::fs::symlink_metadata(&first).unwrap();
        let opened_first_meta = std::fs::File::open(&first).unwrap().metadata().unwrap();
        let opened_second_meta = std::fs::File::open(&second).unwrap().metadata().unwrap();

        assert!(same_file_identity(&first_meta, &opened_first_meta));
        assert!(!same_file_identity(&first_meta, &opened_second_meta));

        let _ = std::fs::remove_dir_all(&dir);
    }

    fn make_temp_schema_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "notiroute-schema-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_schema(dir: &Path, file_name: &str, contents: &str) {
        let path = dir.join(file_name);
        std::fs::write(path, contents.as_bytes()).unwrap();
    }
}
