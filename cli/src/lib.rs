//! Configuration and document helpers for the `entitize` binary.

use anyhow::{Context, Result};
use entitize_model::{Entity, EntityTypeDescriptor, FieldMapping, Registry, RegistrySettings};
use entitize_transport::TransportConfig;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Environment variable overriding `transport.base_url`.
pub const BASE_URL_ENV: &str = "ENTITIZE_BASE_URL";

/// Contents of the JSON file passed with `--config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub registry: RegistrySettings,
    pub transport: TransportConfig,
}

impl Config {
    /// Overrides the base URL when `base_url` is set and non-empty.
    pub fn apply_base_url_override(&mut self, base_url: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.is_empty()) {
            self.transport.base_url = Some(url);
        }
    }

    pub fn build_registry(&self) -> Result<Registry> {
        Registry::from_settings(self.registry.clone()).context("invalid registry settings")
    }
}

/// Reads a config file, then applies the environment override.
pub fn load_config(path: &Path) -> Result<Config> {
    let mut config: Config = read_json(path)?;
    config.apply_base_url_override(std::env::var(BASE_URL_ENV).ok());
    Ok(config)
}

/// Reads any JSON document from disk.
pub fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

/// Reads the document at `path` and materializes it as `entity_type`.
pub fn load_entity(registry: &Registry, path: &Path, entity_type: &str) -> Result<Entity> {
    let document: Value = read_json(path)?;
    registry
        .materialize(&document, entity_type)
        .with_context(|| format!("failed to materialize {} as {}", path.display(), entity_type))
}

/// One line per registered type: name, endpoint, mapping count.
pub fn describe_types(registry: &Registry) -> Vec<String> {
    registry
        .type_names()
        .into_iter()
        .filter_map(|name| {
            let d = registry.descriptor(name).ok()?;
            Some(format!(
                "{}\t{}\t{} mappings",
                name,
                d.update_endpoint.as_deref().unwrap_or("-"),
                d.mappings.len()
            ))
        })
        .collect()
}

/// The Table / Column / Filter schema, as a starting point for new configs.
pub fn sample_config() -> Config {
    let filter = EntityTypeDescriptor::new(
        "Filter",
        vec![
            FieldMapping::scalar("ID").with_prop_type("int"),
            FieldMapping::scalar("RowVersion").with_prop_type("string"),
            FieldMapping::scalar("FilterQuery").with_prop_type("string"),
        ],
    )
    .with_update_endpoint("/Tables/UpdateFilter");

    let column = EntityTypeDescriptor::new(
        "Column",
        vec![
            FieldMapping::scalar("ID").with_prop_type("int"),
            FieldMapping::scalar("RowVersion").with_prop_type("string"),
            FieldMapping::scalar("QuestionId").with_prop_type("string"),
            FieldMapping::scalar("ColumnName").with_prop_type("string"),
            FieldMapping::one_to_one("Filter", "Filter"),
            FieldMapping::scalar("Position").with_prop_type("int"),
            FieldMapping::scalar("TableId").with_prop_type("int"),
            FieldMapping::scalar("Table").with_prop_type("Table"),
        ],
    )
    .with_update_endpoint("/Tables/UpdateColumn");

    let table = EntityTypeDescriptor::new(
        "Table",
        vec![
            FieldMapping::scalar("ID").with_prop_type("int"),
            FieldMapping::scalar("RowVersion").with_prop_type("string"),
            FieldMapping::scalar("TableName").with_prop_type("string"),
            FieldMapping::one_to_many("Columns", "Column"),
            FieldMapping::one_to_one("SplitBy", "Column"),
            FieldMapping::one_to_one("SortBy", "Column"),
            FieldMapping::one_to_one("GroupBy", "Column"),
            FieldMapping::scalar("SortOrder").with_prop_type("bool"),
        ],
    )
    .with_update_endpoint("/Tables/UpdateTable");

    Config {
        registry: RegistrySettings {
            types: vec![table, column, filter],
            mappings: BTreeMap::new(),
        },
        transport: TransportConfig::with_base_url("http://localhost:5000"),
    }
}
