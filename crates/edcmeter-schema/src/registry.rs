use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use jsonschema::Validator;
use serde_json::{Map, Value};

use crate::boundary::Boundary;
use crate::config::RegistryConfig;
use crate::error::{Result, SchemaError};
use crate::validator::validate_value;

/// Boundary-keyed registry of compiled JSON Schema validators.
pub struct SchemaRegistry {
    validators: HashMap<Boundary, Validator>,
    config: RegistryConfig,
}

impl SchemaRegistry {
    /// Create an empty registry with default config.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create an empty registry with explicit config.
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            validators: HashMap::new(),
            config,
        }
    }

    /// Registry holding the schemas shipped with the crate.
    pub fn builtin(config: RegistryConfig) -> Result<Self> {
        let mut registry = Self::with_config(config);
        for boundary in Boundary::ALL {
            registry.register(boundary, boundary.embedded_schema())?;
        }
        Ok(registry)
    }

    /// Register a schema for a boundary from a JSON string.
    pub fn register(&mut self, boundary: Boundary, schema_json: &str) -> Result<()> {
        let schema: Value = serde_json::from_str(schema_json)?;
        self.register_value(boundary, &schema)
    }

    /// Register a schema for a boundary from JSON value.
    pub fn register_value(&mut self, boundary: Boundary, schema: &Value) -> Result<()> {
        let mut schema_to_compile = schema.clone();
        if self.config.strict_mode {
            apply_strict_mode(&mut schema_to_compile);
        }

        let compiled = jsonschema::validator_for(&schema_to_compile)
            .map_err(|err| SchemaError::CompileFailed(err.to_string()))?;

        self.validators.insert(boundary, compiled);
        Ok(())
    }

    /// Start from the built-in schemas and replace any that have an
    /// override file (`uplink.schema.json`, `downlink.schema.json`) in `path`.
    pub fn from_directory(path: &Path, config: RegistryConfig) -> Result<Self> {
        let mut registry = Self::builtin(config)?;

        if !path.is_dir() {
            return Err(SchemaError::LoadFailed(format!(
                "{}: not a directory",
                path.display()
            )));
        }

        for boundary in Boundary::ALL {
            let file_path = path.join(boundary.file_name());
            let metadata = match std::fs::symlink_metadata(&file_path) {
                Ok(metadata) => metadata,
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => continue,
                Err(err) => {
                    return Err(SchemaError::LoadFailed(format!(
                        "{}: {err}",
                        file_path.display()
                    )))
                }
            };

            if metadata.file_type().is_symlink() {
                return Err(SchemaError::LoadFailed(format!(
                    "refusing to load schema symlink: {}",
                    file_path.display()
                )));
            }
            if !metadata.is_file() {
                continue;
            }

            let content = read_limited(&file_path, registry.config.max_schema_file_size)?;
            registry.register(boundary, &content)?;
            tracing::debug!(%boundary, path = %file_path.display(), "loaded schema override");
        }

        Ok(registry)
    }

    /// Validate a raw JSON envelope.
    pub fn validate(&self, boundary: Boundary, payload: &[u8]) -> Result<()> {
        let value: Value = serde_json::from_slice(payload)?;
        self.validate_value(boundary, &value)
    }

    /// Validate an already parsed JSON envelope.
    pub fn validate_value(&self, boundary: Boundary, value: &Value) -> Result<()> {
        match self.validators.get(&boundary) {
            Some(validator) => validate_value(boundary, value, validator),
            None if self.config.fail_on_missing_schema => Err(SchemaError::NoSchema(boundary)),
            None => Ok(()),
        }
    }

    /// Check if a boundary has a registered schema.
    pub fn has_schema(&self, boundary: Boundary) -> bool {
        self.validators.contains_key(&boundary)
    }

    /// Get registry configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn read_limited(path: &Path, max: usize) -> Result<String> {
    let file = std::fs::File::open(path)
        .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;

    let mut content = String::new();
    file.take(max as u64 + 1)
        .read_to_string(&mut content)
        .map_err(|err| SchemaError::LoadFailed(format!("{}: {err}", path.display())))?;

    if content.len() > max {
        return Err(SchemaError::LoadFailed(format!(
            "{} exceeds configured max size ({max} bytes)",
            path.display()
        )));
    }
    Ok(content)
}

fn apply_strict_mode(value: &mut Value) {
    match value {
        Value::Object(map) => {
            if is_object_schema(map) && !map.contains_key("additionalProperties") {
                map.insert("additionalProperties".to_string(), Value::Bool(false));
            }

            for key in ["properties", "$defs"] {
                if let Some(Value::Object(children)) = map.get_mut(key) {
                    for child in children.values_mut() {
                        apply_strict_mode(child);
                    }
                }
            }
            for key in ["items", "not"] {
                if let Some(child) = map.get_mut(key) {
                    apply_strict_mode(child);
                }
            }
            for key in ["allOf", "anyOf", "oneOf"] {
                if let Some(Value::Array(children)) = map.get_mut(key) {
                    for child in children {
                        apply_strict_mode(child);
                    }
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                apply_strict_mode(item);
            }
        }
        _ => {}
    }
}

fn is_object_schema(map: &Map<String, Value>) -> bool {
    match map.get("type") {
        Some(Value::String(kind)) => kind == "object",
        Some(Value::Array(items)) => items
            .iter()
            .any(|item| matches!(item, Value::String(kind) if kind == "object")),
        _ => map.contains_key("properties") || map.contains_key("required"),
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn unique_temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "edcmeter-schema-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .expect("time should be after epoch")
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).expect("temp dir should be creatable");
        dir
    }

    #[test]
    fn builtin_uplink_schema() {
        let registry = SchemaRegistry::builtin(RegistryConfig::default()).unwrap();

        assert!(registry
            .validate(Boundary::Uplink, br#"{"bytes":[2,100],"fPort":1}"#)
            .is_ok());
        assert!(registry
            .validate(Boundary::Uplink, br#"{"bytes":[2,100],"fPort":1,"recvTime":"x"}"#)
            .is_ok());
        assert!(matches!(
            registry.validate(Boundary::Uplink, br#"{"bytes":[2,256],"fPort":1}"#),
            Err(SchemaError::ValidationFailed {
                boundary: Boundary::Uplink,
                ..
            })
        ));
        assert!(registry
            .validate(Boundary::Uplink, br#"{"bytes":[2,100]}"#)
            .is_err());
    }

    #[test]
    fn builtin_downlink_schema() {
        let registry = SchemaRegistry::builtin(RegistryConfig::default()).unwrap();

        assert!(registry
            .validate(
                Boundary::Downlink,
                br#"{"data":{"command":"set_reporting_interval","interval_seconds":300}}"#
            )
            .is_ok());
        assert!(registry
            .validate(Boundary::Downlink, br#"{"data":{"command":"unknown_cmd"}}"#)
            .is_ok());
        assert!(registry
            .validate(
                Boundary::Downlink,
                br#"{"data":{"command":"reset","interval_seconds":-1}}"#
            )
            .is_err());
        assert!(registry
            .validate(Boundary::Downlink, br#"{"command":"reset"}"#)
            .is_err());
    }

    #[test]
    fn invalid_json_is_reported() {
        let registry = SchemaRegistry::builtin(RegistryConfig::default()).unwrap();
        assert!(matches!(
            registry.validate(Boundary::Uplink, b"{not json"),
            Err(SchemaError::InvalidJson(_))
        ));
    }

    #[test]
    fn strict_mode_rejects_additional_properties() {
        let strict = SchemaRegistry::builtin(RegistryConfig {
            strict_mode: true,
            ..RegistryConfig::default()
        })
        .unwrap();

        assert!(strict
            .validate(Boundary::Uplink, br#"{"bytes":[],"fPort":1}"#)
            .is_ok());
        assert!(strict
            .validate(Boundary::Uplink, br#"{"bytes":[],"fPort":1,"recvTime":"x"}"#)
            .is_err());
        assert!(strict
            .validate(Boundary::Downlink, br#"{"data":{"command":"reset","extra":1}}"#)
            .is_err());
    }

    #[test]
    fn missing_schema_policy() {
        let permissive = SchemaRegistry::new();
        assert!(permissive.validate(Boundary::Uplink, br#"{}"#).is_ok());
        assert!(!permissive.has_schema(Boundary::Uplink));

        let strict = SchemaRegistry::with_config(RegistryConfig {
            fail_on_missing_schema: true,
            ..RegistryConfig::default()
        });
        assert!(matches!(
            strict.validate(Boundary::Downlink, br#"{}"#),
            Err(SchemaError::NoSchema(Boundary::Downlink))
        ));
    }

    #[test]
    fn directory_override_replaces_builtin() {
        let dir = unique_temp_dir("override");
        std::fs::write(
            dir.join("downlink.schema.json"),
            r#"{
                "type": "object",
                "properties": {
                    "data": {
                        "type": "object",
                        "properties": {
                            "command": { "enum": ["reset", "factory_reset", "set_reporting_interval"] }
                        },
                        "required": ["command"]
                    }
                },
                "required": ["data"]
            }"#,
        )
        .unwrap();

        let registry = SchemaRegistry::from_directory(&dir, RegistryConfig::default()).unwrap();
        assert!(registry
            .validate(Boundary::Downlink, br#"{"data":{"command":"reset"}}"#)
            .is_ok());
        assert!(registry
            .validate(Boundary::Downlink, br#"{"data":{"command":"unknown_cmd"}}"#)
            .is_err());
        assert!(registry.has_schema(Boundary::Uplink));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn directory_override_size_limit() {
        let dir = unique_temp_dir("too-big");
        std::fs::write(dir.join("uplink.schema.json"), " ".repeat(128) + "{}").unwrap();

        let result = SchemaRegistry::from_directory(
            &dir,
            RegistryConfig {
                max_schema_file_size: 64,
                ..RegistryConfig::default()
            },
        );
        assert!(matches!(result, Err(SchemaError::LoadFailed(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directory_fails() {
        let dir = std::env::temp_dir().join("edcmeter-schema-does-not-exist-7f3a");
        assert!(matches!(
            SchemaRegistry::from_directory(&dir, RegistryConfig::default()),
            Err(SchemaError::LoadFailed(_))
        ));
    }
}
