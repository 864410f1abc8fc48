use serde::Deserialize;

/// Deserialization shape for the optional YAML config file. Every field is
/// optional; absent fields fall back to `RegistryConfig`'s defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RawConfig {
    pub backend: Option<String>,
    pub postgres_url: Option<String>,
    pub log_level: Option<String>,
    pub max_string_bytes: Option<usize>,
    pub max_map_keys: Option<usize>,
    pub max_array_elements: Option<usize>,
    pub max_depth: Option<usize>,
}
